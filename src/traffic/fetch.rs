//! Traffic Data Fetch
//!
//! Issues the one fixed query the dashboard is built on and decodes the
//! result. The whole render is gated on this call completing.

use thiserror::Error;

use crate::bigquery::{QueryError, QueryService};

use super::records::{TrafficError, TrafficSet};

/// Project everything lives under
pub const PROJECT_ID: &str = "averagetraffic";

/// Source table of cleaned traffic counts
pub const TRAFFIC_TABLE: &str = "Traffic_Data.Cleaned_SJ_Traffic";

/// The fixed, parameterless table query
const TRAFFIC_QUERY: &str =
    "SELECT * FROM `averagetraffic.Traffic_Data.Cleaned_SJ_Traffic`";

/// Fetch the full traffic table as a decoded [`TrafficSet`].
pub async fn fetch_traffic(service: &dyn QueryService) -> Result<TrafficSet, FetchError> {
    let results = service.query(TRAFFIC_QUERY, &[]).await?;
    tracing::debug!(rows = results.rows.len(), "Fetched traffic table");
    Ok(TrafficSet::from_results(results)?)
}

/// Errors fetching or decoding the traffic table
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Decode(#[from] TrafficError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_names_the_fixed_table() {
        assert!(TRAFFIC_QUERY.contains(PROJECT_ID));
        assert!(TRAFFIC_QUERY.contains(TRAFFIC_TABLE));
        assert!(TRAFFIC_QUERY.starts_with("SELECT *"));
    }
}
