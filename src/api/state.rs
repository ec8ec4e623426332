//! Application State
//!
//! Shared state accessible by all API handlers. The query-service handle
//! and the predictor are passed in explicitly at startup and shared via
//! Arc; handlers never reach for ambient globals.

use std::sync::Arc;
use std::time::Instant;

use crate::bigquery::QueryService;
use crate::predict::Predictor;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authenticated query-service handle, bound to the fixed project
    pub service: Arc<dyn QueryService>,
    /// Prediction requester for the ML scoring endpoint
    pub predictor: Arc<Predictor>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an already-constructed query-service handle
    pub fn new(service: Arc<dyn QueryService>, config: ApiConfig) -> Self {
        let predictor = Arc::new(Predictor::new(Arc::clone(&service)));
        Self {
            service,
            predictor,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8088,
            request_timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
