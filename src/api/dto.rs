//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::views::{ChartView, MapView, TableView};

// ============================================
// DASHBOARD DTOs
// ============================================

/// Dashboard query parameters
#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// Street to filter on; absent or "All" means unfiltered
    #[serde(default)]
    pub street: Option<String>,
}

/// One full dashboard render: every view over the same filtered snapshot
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Selector options: "All" followed by the distinct streets of the
    /// unfiltered set, first-seen order
    pub streets: Vec<String>,
    /// The filter this render applied
    pub street: String,
    /// Traffic table, verbatim
    pub table: TableView,
    /// Marker map; omitted when the filtered set is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapView>,
    /// Top 10 busiest streets by mean ADT
    pub top_streets: ChartView,
    /// Mean ADT over count dates
    pub volume_over_time: ChartView,
    /// External report embed
    pub report: ReportEmbed,
    /// Render metadata
    pub meta: DashboardMeta,
}

/// Render metadata
#[derive(Debug, Serialize)]
pub struct DashboardMeta {
    /// Rows in the filtered set
    pub row_count: usize,
    /// Wall time spent fetching and building views
    pub execution_time_ms: u64,
}

// ============================================
// REPORT EMBED
// ============================================

/// Fixed external report address
pub const LOOKER_STUDIO_EMBED_URL: &str =
    "https://lookerstudio.google.com/embed/reporting/14d0f77c-e681-4a0f-ba3f-b7051d514f34/page/NdI4E";

/// Embedded frame dimensions
pub const EMBED_WIDTH: u32 = 900;
pub const EMBED_HEIGHT: u32 = 600;

/// A fixed external report rendered in a sized frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEmbed {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ReportEmbed {
    /// The Looker Studio dashboard embed
    pub fn looker_studio() -> Self {
        Self {
            url: LOOKER_STUDIO_EMBED_URL.to_string(),
            width: EMBED_WIDTH,
            height: EMBED_HEIGHT,
        }
    }
}

// ============================================
// PREDICTION DTOs
// ============================================

/// Prediction response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// "ok" when a score came back, "empty" when the model returned no rows
    pub status: String,
    /// The predicted ADT, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_adt: Option<f64>,
    /// User-facing outcome message
    pub message: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
