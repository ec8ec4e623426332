//! Traffic Volume Prediction
//!
//! On-demand scoring against the hosted BigQuery ML model. Each trigger
//! issues exactly one scoring query; there is no retry, caching, or rate
//! limiting. The four user-entered inputs travel as named bound query
//! parameters, never interpolated into the SQL text.

use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bigquery::{QueryError, QueryParameter, QueryService};

/// Hosted prediction model reference
pub const PREDICTION_MODEL: &str = "Traffic_Data.traffic_prediction_model";

/// Output column of the scoring query
pub const PREDICTED_COLUMN: &str = "predicted_ADT";

/// Scoring query template; the model expects the four feature columns by
/// their table names.
const SCORING_QUERY: &str = "\
SELECT predicted_ADT
FROM ML.PREDICT(
    MODEL `averagetraffic.Traffic_Data.traffic_prediction_model`,
    (SELECT @latitude AS LATITUDE, @longitude AS LONGITUDE,
            @facility_id AS FACILITYID, @intid AS INTID)
)";

fn default_latitude() -> f64 {
    37.3382
}

fn default_longitude() -> f64 {
    -121.8863
}

fn default_facility_id() -> i64 {
    12345
}

fn default_intid() -> i64 {
    6789
}

/// The four scoring inputs. Each field independently falls back to its
/// documented default when absent from the request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PredictionInput {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_facility_id")]
    pub facility_id: i64,
    #[serde(default = "default_intid")]
    pub intid: i64,
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            facility_id: default_facility_id(),
            intid: default_intid(),
        }
    }
}

/// Result of one scoring request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionOutcome {
    /// The model returned a score
    Predicted(f64),
    /// The scoring query returned zero rows
    Unavailable,
}

impl PredictionOutcome {
    /// User-facing message for this outcome
    pub fn message(&self) -> String {
        match self {
            PredictionOutcome::Predicted(adt) => {
                format!("Predicted ADT Traffic Volume: {:.2}", adt)
            }
            PredictionOutcome::Unavailable => {
                "No prediction available. Check input values!".to_string()
            }
        }
    }
}

/// Runs scoring requests against the bound query service.
///
/// The requester is Idle until triggered, Requesting while the scoring
/// query is in flight, and back to Idle after completion or failure.
pub struct Predictor {
    service: Arc<dyn QueryService>,
    in_flight: AtomicBool,
}

impl Predictor {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self {
            service,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether no scoring request is currently in flight
    pub fn is_idle(&self) -> bool {
        !self.in_flight.load(Ordering::SeqCst)
    }

    /// Issue one scoring query for the given inputs.
    ///
    /// A non-empty result yields the first row's score (only the first is
    /// used if the service ever returns more); an empty result is the
    /// explicit no-prediction outcome, not an error.
    pub async fn predict(&self, input: PredictionInput) -> Result<PredictionOutcome, QueryError> {
        let _guard = RequestGuard::begin(&self.in_flight);

        let params = [
            QueryParameter::float64("latitude", input.latitude),
            QueryParameter::float64("longitude", input.longitude),
            QueryParameter::int64("facility_id", input.facility_id),
            QueryParameter::int64("intid", input.intid),
        ];

        tracing::info!(
            latitude = input.latitude,
            longitude = input.longitude,
            facility_id = input.facility_id,
            intid = input.intid,
            "Running traffic prediction"
        );

        let results = self.service.query(SCORING_QUERY, &params).await?;

        if results.is_empty() {
            return Ok(PredictionOutcome::Unavailable);
        }

        let raw = results.value(0, PREDICTED_COLUMN).ok_or_else(|| {
            QueryError::Decode(format!("scoring result is missing {}", PREDICTED_COLUMN))
        })?;
        let adt: f64 = raw.parse().map_err(|_| {
            QueryError::Decode(format!("scoring result {:?} is not numeric", raw))
        })?;

        Ok(PredictionOutcome::Predicted(adt))
    }
}

/// Marks the requester busy for the duration of one request, restoring
/// Idle on every exit path.
struct RequestGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RequestGuard<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigquery::QueryResults;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scoring service returning a canned response, recording the last
    /// query it saw.
    struct ScoringStub {
        response: Mutex<Option<Result<QueryResults, QueryError>>>,
        last_query: Mutex<Option<(String, Vec<QueryParameter>)>>,
    }

    impl ScoringStub {
        fn returning(response: Result<QueryResults, QueryError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                last_query: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl QueryService for ScoringStub {
        async fn query(
            &self,
            sql: &str,
            params: &[QueryParameter],
        ) -> Result<QueryResults, QueryError> {
            *self.last_query.lock().unwrap() = Some((sql.to_string(), params.to_vec()));
            self.response.lock().unwrap().take().unwrap()
        }
    }

    fn score_rows(values: &[&str]) -> QueryResults {
        QueryResults {
            columns: vec![PREDICTED_COLUMN.to_string()],
            rows: values.iter().map(|v| vec![Some(v.to_string())]).collect(),
        }
    }

    #[tokio::test]
    async fn test_default_inputs_produce_two_decimal_message() {
        let stub = ScoringStub::returning(Ok(score_rows(&["1234.5"])));
        let predictor = Predictor::new(stub.clone());

        let outcome = predictor.predict(PredictionInput::default()).await.unwrap();
        assert_eq!(outcome, PredictionOutcome::Predicted(1234.5));
        assert!(outcome.message().contains("1234.50"));

        let (sql, params) = stub.last_query.lock().unwrap().clone().unwrap();
        assert!(sql.contains("ML.PREDICT"));
        assert!(sql.contains(PREDICTION_MODEL));
        // User values travel as bound parameters, not query text
        assert!(!sql.contains("37.3382"));
        assert_eq!(params[0], QueryParameter::float64("latitude", 37.3382));
        assert_eq!(params[1], QueryParameter::float64("longitude", -121.8863));
        assert_eq!(params[2], QueryParameter::int64("facility_id", 12345));
        assert_eq!(params[3], QueryParameter::int64("intid", 6789));
    }

    #[tokio::test]
    async fn test_empty_result_is_no_prediction() {
        let stub = ScoringStub::returning(Ok(score_rows(&[])));
        let predictor = Predictor::new(stub);

        let outcome = predictor.predict(PredictionInput::default()).await.unwrap();
        assert_eq!(outcome, PredictionOutcome::Unavailable);
        assert_eq!(
            outcome.message(),
            "No prediction available. Check input values!"
        );
        assert!(predictor.is_idle());
    }

    #[tokio::test]
    async fn test_only_first_row_is_used() {
        let stub = ScoringStub::returning(Ok(score_rows(&["100.25", "999.0"])));
        let predictor = Predictor::new(stub);

        let outcome = predictor.predict(PredictionInput::default()).await.unwrap();
        assert_eq!(outcome, PredictionOutcome::Predicted(100.25));
    }

    #[tokio::test]
    async fn test_service_failure_surfaces_and_restores_idle() {
        let stub = ScoringStub::returning(Err(QueryError::Api {
            status: 500,
            message: "model is offline".to_string(),
        }));
        let predictor = Predictor::new(stub);

        let err = predictor.predict(PredictionInput::default()).await.unwrap_err();
        assert!(err.to_string().contains("model is offline"));
        assert!(predictor.is_idle());
    }

    #[tokio::test]
    async fn test_missing_score_column_is_decode_error() {
        let results = QueryResults {
            columns: vec!["something_else".to_string()],
            rows: vec![vec![Some("1.0".to_string())]],
        };
        let predictor = Predictor::new(ScoringStub::returning(Ok(results)));

        let err = predictor.predict(PredictionInput::default()).await.unwrap_err();
        assert!(matches!(err, QueryError::Decode(_)));
        assert!(predictor.is_idle());
    }

    #[test]
    fn test_each_field_defaults_independently() {
        let input: PredictionInput = serde_json::from_str(r#"{"latitude": 37.0}"#).unwrap();
        assert_eq!(input.latitude, 37.0);
        assert_eq!(input.longitude, -121.8863);
        assert_eq!(input.facility_id, 12345);
        assert_eq!(input.intid, 6789);

        let input: PredictionInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input, PredictionInput::default());
    }
}
