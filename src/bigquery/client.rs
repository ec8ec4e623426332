//! BigQuery REST API Client
//!
//! HTTP client for the BigQuery `jobs.query` endpoint. Executes SQL
//! (including `ML.PREDICT` scoring queries) against the project the
//! service account is bound to and returns a flat tabular result.
//!
//! User-supplied values are always sent as named query parameters, never
//! interpolated into the SQL text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::auth::{AuthError, TokenProvider};
use super::credentials::ServiceAccountKey;
use super::QueryService;

/// BigQuery REST API base URL
const BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Server-side wait for query completion, in milliseconds
const QUERY_TIMEOUT_MS: u64 = 30_000;

/// HTTP request timeout, slightly above the server-side wait
const HTTP_TIMEOUT_MS: u64 = 35_000;

/// Authenticated BigQuery client bound to a single project.
pub struct BigQueryClient {
    http: reqwest::Client,
    project_id: String,
    auth: TokenProvider,
}

impl BigQueryClient {
    /// Create a client bound to the key's project.
    ///
    /// Construction is purely local; no network call is made until the
    /// first query is issued.
    pub fn new(key: ServiceAccountKey) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(HTTP_TIMEOUT_MS))
            .build()
            .expect("Failed to create HTTP client");

        let project_id = key.project_id.clone();
        let auth = TokenProvider::new(http.clone(), key);

        Self {
            http,
            project_id,
            auth,
        }
    }

    /// Project this client is bound to
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn query_url(&self) -> String {
        format!("{}/projects/{}/queries", BIGQUERY_ENDPOINT, self.project_id)
    }
}

#[async_trait]
impl QueryService for BigQueryClient {
    async fn query(
        &self,
        sql: &str,
        params: &[QueryParameter],
    ) -> Result<QueryResults, QueryError> {
        let token = self.auth.bearer_token().await?;

        let body = QueryRequestBody {
            query: sql,
            use_legacy_sql: false,
            parameter_mode: (!params.is_empty()).then_some("NAMED"),
            query_parameters: params.iter().map(WireParameter::from).collect(),
            timeout_ms: QUERY_TIMEOUT_MS,
        };

        tracing::debug!(project = %self.project_id, "Issuing BigQuery query");

        let response = self
            .http
            .post(self.query_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::Timeout
                } else if e.is_connect() {
                    QueryError::Unavailable
                } else {
                    QueryError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(QueryError::Api { status, message });
        }

        let body: QueryResponseBody = response
            .json()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        if !body.job_complete {
            return Err(QueryError::Incomplete);
        }

        let columns = body
            .schema
            .map(|s| s.fields.into_iter().map(|f| f.name).collect())
            .unwrap_or_default();

        let rows = body
            .rows
            .into_iter()
            .map(|row| row.f.into_iter().map(cell_value).collect())
            .collect();

        Ok(QueryResults { columns, rows })
    }
}

/// Flatten a result cell to its textual value.
///
/// BigQuery's JSON wire format carries every scalar as a string; anything
/// nested is kept as raw JSON.
fn cell_value(cell: TableCell) -> Option<String> {
    match cell.v {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    }
}

// ============================================
// Result and parameter types
// ============================================

/// Tabular result of a query: column names in schema order, rows of
/// textual cell values in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResults {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResults {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }
}

/// A named query parameter bound server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    pub name: String,
    pub value: ParameterValue,
}

/// Supported parameter types
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Float64(f64),
    Int64(i64),
    String(String),
}

impl QueryParameter {
    pub fn float64(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: ParameterValue::Float64(value),
        }
    }

    pub fn int64(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value: ParameterValue::Int64(value),
        }
    }

    pub fn string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: ParameterValue::String(value.to_string()),
        }
    }
}

// ============================================
// Wire DTOs
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequestBody<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    query_parameters: Vec<WireParameter>,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireParameter {
    name: String,
    parameter_type: WireParameterType,
    parameter_value: WireParameterValue,
}

#[derive(Debug, Serialize)]
struct WireParameterType {
    #[serde(rename = "type")]
    param_type: &'static str,
}

#[derive(Debug, Serialize)]
struct WireParameterValue {
    value: String,
}

impl From<&QueryParameter> for WireParameter {
    fn from(param: &QueryParameter) -> Self {
        let (param_type, value) = match &param.value {
            ParameterValue::Float64(v) => ("FLOAT64", v.to_string()),
            ParameterValue::Int64(v) => ("INT64", v.to_string()),
            ParameterValue::String(v) => ("STRING", v.clone()),
        };

        Self {
            name: param.name.clone(),
            parameter_type: WireParameterType { param_type },
            parameter_value: WireParameterValue { value },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponseBody {
    #[serde(default)]
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    #[serde(default)]
    job_complete: bool,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Deserialize)]
struct TableFieldSchema {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

// ============================================
// Errors
// ============================================

/// Errors from query execution
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query service unavailable")]
    Unavailable,

    #[error("Query timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Query rejected ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Query did not complete within the wait window")]
    Incomplete,

    #[error("Malformed query response: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response_json() -> &'static str {
        r#"{
            "kind": "bigquery#queryResponse",
            "schema": {
                "fields": [
                    {"name": "STREETONE", "type": "STRING"},
                    {"name": "ADT", "type": "FLOAT"}
                ]
            },
            "jobComplete": true,
            "totalRows": "2",
            "rows": [
                {"f": [{"v": "MONTEREY HY"}, {"v": "34500.0"}]},
                {"f": [{"v": null}, {"v": "120"}]}
            ]
        }"#
    }

    #[test]
    fn test_decode_query_response() {
        let body: QueryResponseBody = serde_json::from_str(sample_response_json()).unwrap();
        assert!(body.job_complete);

        let columns: Vec<String> = body
            .schema
            .unwrap()
            .fields
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(columns, vec!["STREETONE", "ADT"]);

        let rows: Vec<Vec<Option<String>>> = body
            .rows
            .into_iter()
            .map(|row| row.f.into_iter().map(cell_value).collect())
            .collect();
        assert_eq!(rows[0][0].as_deref(), Some("MONTEREY HY"));
        assert_eq!(rows[1][0], None);
        assert_eq!(rows[1][1].as_deref(), Some("120"));
    }

    #[test]
    fn test_results_lookup() {
        let results = QueryResults {
            columns: vec!["predicted_ADT".to_string()],
            rows: vec![vec![Some("1234.5".to_string())]],
        };
        assert_eq!(results.column_index("predicted_ADT"), Some(0));
        assert_eq!(results.value(0, "predicted_ADT"), Some("1234.5"));
        assert_eq!(results.value(0, "missing"), None);
        assert_eq!(results.value(1, "predicted_ADT"), None);
    }

    #[test]
    fn test_parameter_wire_format() {
        let wire = WireParameter::from(&QueryParameter::float64("latitude", 37.3382));
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["name"], "latitude");
        assert_eq!(json["parameterType"]["type"], "FLOAT64");
        assert_eq!(json["parameterValue"]["value"], "37.3382");

        let wire = WireParameter::from(&QueryParameter::int64("intid", 6789));
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["parameterType"]["type"], "INT64");
        assert_eq!(json["parameterValue"]["value"], "6789");
    }

    #[test]
    fn test_request_body_omits_empty_parameters() {
        let body = QueryRequestBody {
            query: "SELECT 1",
            use_legacy_sql: false,
            parameter_mode: None,
            query_parameters: vec![],
            timeout_ms: QUERY_TIMEOUT_MS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("parameterMode").is_none());
        assert!(json.get("queryParameters").is_none());
        assert_eq!(json["useLegacySql"], false);
    }

    #[test]
    fn test_google_error_message_extraction() {
        let text = r#"{"error": {"code": 403, "message": "Access Denied", "status": "PERMISSION_DENIED"}}"#;
        let body: GoogleErrorBody = serde_json::from_str(text).unwrap();
        assert_eq!(body.error.message, "Access Denied");
    }
}
