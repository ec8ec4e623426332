//! Dashboard Route
//!
//! One endpoint produces the entire page's data in a single pass:
//! fetch → filter → every view over the same filtered snapshot.
//!
//! - GET /api/v1/dashboard?street=<name|All>

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::{DashboardMeta, DashboardParams, DashboardResponse, ReportEmbed};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::traffic::{fetch_traffic, StreetFilter, ALL_STREETS};
use crate::views::{charts, map, table};

/// GET /api/v1/dashboard
///
/// Fetch the traffic table, apply the street filter, and build all view
/// models. Each render re-derives everything from a fresh fetch; nothing
/// is cached across renders.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> ApiResult<Json<DashboardResponse>> {
    let started = Instant::now();

    let unfiltered = fetch_traffic(state.service.as_ref()).await?;

    // Selector options are derived from the unfiltered set so the user
    // can always switch away from the current street.
    let mut streets = vec![ALL_STREETS.to_string()];
    streets.extend(unfiltered.distinct_streets());

    let filter = StreetFilter::from_param(params.street.as_deref());
    let filtered = unfiltered.filtered(&filter);

    let response = DashboardResponse {
        streets,
        street: filter.to_string(),
        table: table::build(&filtered),
        map: map::build(&filtered),
        top_streets: charts::top_streets(&filtered),
        volume_over_time: charts::volume_over_time(&filtered),
        report: ReportEmbed::looker_studio(),
        meta: DashboardMeta {
            row_count: filtered.len(),
            execution_time_ms: started.elapsed().as_millis() as u64,
        },
    };

    Ok(Json(response))
}
