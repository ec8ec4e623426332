//! # Traffic Dashboard
//!
//! San Jose Traffic Dashboard - a BigQuery-backed dashboard serving
//! traffic counts as a table, a marker map, aggregate charts, an embedded
//! external report, and on-demand ML traffic predictions.
//!
//! The dashboard owns no storage and no algorithms of note; it is a thin,
//! explicitly-wired pipeline over managed services. Data flows one way
//! per render:
//!
//! ```text
//! credentials -> BigQueryClient -> fetch -> filter -> {table, map, charts}
//! ```
//!
//! with prediction as an independent, user-triggered branch against the
//! hosted model.
//!
//! ## Modules
//!
//! - [`bigquery`]: Credentials, token exchange, and the REST query client
//! - [`traffic`]: Typed records, the street filter, and the fixed fetch
//! - [`views`]: Pure view-model builders (table, map, charts)
//! - [`predict`]: The ML scoring requester
//! - [`api`]: HTTP server, routes, and the dashboard page

pub mod api;
pub mod bigquery;
pub mod config;
pub mod predict;
pub mod traffic;
pub mod views;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use bigquery::{
    BigQueryClient, CredentialsError, QueryError, QueryParameter, QueryResults, QueryService,
    ServiceAccountKey,
};

pub use config::{Config, ConfigError};

pub use predict::{PredictionInput, PredictionOutcome, Predictor};

pub use traffic::{fetch_traffic, FetchError, StreetFilter, TrafficRecord, TrafficSet};

pub use views::{ChartView, MapView, TableView};
