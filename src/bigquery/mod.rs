//! BigQuery Access Layer
//!
//! Everything needed to talk to the hosted query service: service account
//! credential parsing, OAuth2 token exchange, and the REST client itself.
//!
//! The [`QueryService`] trait is the seam between the dashboard and the
//! network; views and the predictor only ever see the trait, which keeps
//! them testable against canned results.

mod auth;
mod client;
mod credentials;

pub use auth::{AuthError, TokenProvider};
pub use client::{
    BigQueryClient, ParameterValue, QueryError, QueryParameter, QueryResults,
};
pub use credentials::{CredentialsError, ServiceAccountKey};

use async_trait::async_trait;

/// Executes SQL against the bound project and returns a tabular result.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Run a query with optional named parameters. Blocks (asynchronously)
    /// until the result set is complete; there is no streaming of partial
    /// rows.
    async fn query(
        &self,
        sql: &str,
        params: &[QueryParameter],
    ) -> Result<QueryResults, QueryError>;
}
