//! Traffic Records
//!
//! Typed view over the rows of the traffic-count table. A [`TrafficSet`]
//! is decoded once per page render from the raw query result and is
//! immutable afterwards; every view consumes the same snapshot.

use chrono::NaiveDate;
use std::borrow::Cow;
use std::collections::HashSet;
use thiserror::Error;

use crate::bigquery::QueryResults;

/// Street name column
pub const STREET_COLUMN: &str = "STREETONE";
/// Average daily traffic column
pub const ADT_COLUMN: &str = "ADT";
/// Latitude column
pub const LATITUDE_COLUMN: &str = "LATITUDE";
/// Longitude column
pub const LONGITUDE_COLUMN: &str = "LONGITUDE";
/// Count date column
pub const COUNTDATE_COLUMN: &str = "COUNTDATE";

/// Sentinel value for an unfiltered street selection
pub const ALL_STREETS: &str = "All";

/// One row of the traffic table.
///
/// The typed fields are the columns the dashboard interprets; the full
/// row is kept alongside so the table view can render every column
/// verbatim in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRecord {
    pub street: String,
    pub adt: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub count_date: NaiveDate,
    cells: Vec<Option<String>>,
}

impl TrafficRecord {
    /// All cell values for this row, in schema order
    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }
}

/// An ordered, uniformly-shaped set of traffic records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficSet {
    columns: Vec<String>,
    records: Vec<TrafficRecord>,
}

impl TrafficSet {
    /// Decode a raw query result into typed records.
    ///
    /// The table is published cleaned; a missing required column or an
    /// unparseable required cell is treated as a service-level fault, not
    /// silently dropped.
    pub fn from_results(results: QueryResults) -> Result<Self, TrafficError> {
        let column_index = |name: &str| {
            results
                .column_index(name)
                .ok_or_else(|| TrafficError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let street_idx = column_index(STREET_COLUMN)?;
        let adt_idx = column_index(ADT_COLUMN)?;
        let lat_idx = column_index(LATITUDE_COLUMN)?;
        let lon_idx = column_index(LONGITUDE_COLUMN)?;
        let date_idx = column_index(COUNTDATE_COLUMN)?;

        let columns = results.columns;
        let mut records = Vec::with_capacity(results.rows.len());

        for (row_idx, cells) in results.rows.into_iter().enumerate() {
            let street = cell_text(&cells, &columns, street_idx, row_idx)?.to_string();
            let adt = cell_number(&cells, &columns, adt_idx, row_idx)?;
            let latitude = cell_number(&cells, &columns, lat_idx, row_idx)?;
            let longitude = cell_number(&cells, &columns, lon_idx, row_idx)?;

            let date_raw = cell_text(&cells, &columns, date_idx, row_idx)?;
            let count_date = parse_date(date_raw).ok_or_else(|| TrafficError::BadCell {
                column: COUNTDATE_COLUMN.to_string(),
                row: row_idx,
                value: date_raw.to_string(),
            })?;

            records.push(TrafficRecord {
                street,
                adt,
                latitude,
                longitude,
                count_date,
                cells,
            });
        }

        Ok(Self { columns, records })
    }

    /// Column names in schema order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in original row order
    pub fn records(&self) -> &[TrafficRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct street names in first-seen order.
    ///
    /// Recomputed from the unfiltered set on every render; selector
    /// options are never cached.
    pub fn distinct_streets(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.street.as_str()))
            .map(|r| r.street.clone())
            .collect()
    }

    /// Narrow to the records matching the filter, preserving order.
    ///
    /// `All` borrows the set unchanged; a street selection with zero
    /// matches yields an empty set, not an error.
    pub fn filtered(&self, filter: &StreetFilter) -> Cow<'_, Self> {
        match filter {
            StreetFilter::All => Cow::Borrowed(self),
            StreetFilter::Street(name) => Cow::Owned(Self {
                columns: self.columns.clone(),
                records: self
                    .records
                    .iter()
                    .filter(|r| r.street == *name)
                    .cloned()
                    .collect(),
            }),
        }
    }
}

/// A street selection: a single street name, or everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreetFilter {
    All,
    Street(String),
}

impl StreetFilter {
    /// Interpret an optional query parameter; absent or the `"All"`
    /// sentinel means unfiltered.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => StreetFilter::All,
            Some(s) if s == ALL_STREETS || s.is_empty() => StreetFilter::All,
            Some(s) => StreetFilter::Street(s.to_string()),
        }
    }
}

impl std::fmt::Display for StreetFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreetFilter::All => f.write_str(ALL_STREETS),
            StreetFilter::Street(name) => f.write_str(name),
        }
    }
}

fn cell_text<'a>(
    cells: &'a [Option<String>],
    columns: &[String],
    idx: usize,
    row: usize,
) -> Result<&'a str, TrafficError> {
    cells
        .get(idx)
        .and_then(|c| c.as_deref())
        .ok_or_else(|| TrafficError::BadCell {
            column: columns[idx].clone(),
            row,
            value: "<null>".to_string(),
        })
}

fn cell_number(
    cells: &[Option<String>],
    columns: &[String],
    idx: usize,
    row: usize,
) -> Result<f64, TrafficError> {
    let raw = cell_text(cells, columns, idx, row)?;
    raw.parse().map_err(|_| TrafficError::BadCell {
        column: columns[idx].clone(),
        row,
        value: raw.to_string(),
    })
}

/// Parse a count date cell. BigQuery DATE columns arrive as `YYYY-MM-DD`;
/// DATETIME adds a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Errors decoding the traffic table
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("Traffic table is missing required column {column}")]
    MissingColumn { column: String },

    #[error("Bad value {value:?} in column {column} (row {row})")]
    BadCell {
        column: String,
        row: usize,
        value: String,
    },
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Canned query result shaped like the traffic table. Shared with the
    /// view and route tests.
    pub(crate) fn sample_results() -> QueryResults {
        let row = |street: &str, adt: &str, lat: &str, lon: &str, date: &str| {
            vec![
                Some(street.to_string()),
                Some(adt.to_string()),
                Some(lat.to_string()),
                Some(lon.to_string()),
                Some(date.to_string()),
            ]
        };

        QueryResults {
            columns: vec![
                STREET_COLUMN.to_string(),
                ADT_COLUMN.to_string(),
                LATITUDE_COLUMN.to_string(),
                LONGITUDE_COLUMN.to_string(),
                COUNTDATE_COLUMN.to_string(),
            ],
            rows: vec![
                row("MONTEREY HY", "34500", "37.28", "-121.85", "2019-03-12"),
                row("FIRST ST", "12000", "37.33", "-121.89", "2019-03-12"),
                row("MONTEREY HY", "31000", "37.26", "-121.84", "2019-04-02"),
                row("SANTA CLARA ST", "18000", "37.34", "-121.88", "2019-04-02"),
            ],
        }
    }

    pub(crate) fn sample_set() -> TrafficSet {
        TrafficSet::from_results(sample_results()).unwrap()
    }

    #[test]
    fn test_decode_sample() {
        let set = sample_set();
        assert_eq!(set.len(), 4);
        assert_eq!(set.columns().len(), 5);

        let first = &set.records()[0];
        assert_eq!(first.street, "MONTEREY HY");
        assert_eq!(first.adt, 34500.0);
        assert_eq!(first.latitude, 37.28);
        assert_eq!(first.count_date, NaiveDate::from_ymd_opt(2019, 3, 12).unwrap());
        assert_eq!(first.cells().len(), 5);
    }

    #[test]
    fn test_decode_missing_column() {
        let mut results = sample_results();
        results.columns[1] = "SOMETHING_ELSE".to_string();

        let err = TrafficSet::from_results(results).unwrap_err();
        assert!(matches!(err, TrafficError::MissingColumn { column } if column == ADT_COLUMN));
    }

    #[test]
    fn test_decode_bad_cell() {
        let mut results = sample_results();
        results.rows[2][1] = Some("not-a-number".to_string());

        let err = TrafficSet::from_results(results).unwrap_err();
        assert!(
            matches!(err, TrafficError::BadCell { column, row, .. } if column == ADT_COLUMN && row == 2)
        );
    }

    #[test]
    fn test_decode_null_required_cell() {
        let mut results = sample_results();
        results.rows[0][3] = None;

        let err = TrafficSet::from_results(results).unwrap_err();
        assert!(matches!(err, TrafficError::BadCell { .. }));
    }

    #[test]
    fn test_filter_matches_subsequence_in_order() {
        let set = sample_set();
        let filtered = set.filtered(&StreetFilter::Street("MONTEREY HY".to_string()));

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.records()[0].adt, 34500.0);
        assert_eq!(filtered.records()[1].adt, 31000.0);
        assert_eq!(filtered.columns(), set.columns());
    }

    #[test]
    fn test_filter_all_is_identity() {
        let set = sample_set();
        let filtered = set.filtered(&StreetFilter::All);

        assert!(matches!(filtered, Cow::Borrowed(_)));
        assert_eq!(*filtered, set);
    }

    #[test]
    fn test_filter_no_matches_is_empty() {
        let set = sample_set();
        let filtered = set.filtered(&StreetFilter::Street("NO SUCH ST".to_string()));

        assert!(filtered.is_empty());
        assert_eq!(filtered.columns(), set.columns());
    }

    #[test]
    fn test_distinct_streets_first_seen_order() {
        let set = sample_set();
        assert_eq!(
            set.distinct_streets(),
            vec!["MONTEREY HY", "FIRST ST", "SANTA CLARA ST"]
        );
    }

    #[test]
    fn test_street_filter_from_param() {
        assert_eq!(StreetFilter::from_param(None), StreetFilter::All);
        assert_eq!(StreetFilter::from_param(Some("All")), StreetFilter::All);
        assert_eq!(StreetFilter::from_param(Some("")), StreetFilter::All);
        assert_eq!(
            StreetFilter::from_param(Some("FIRST ST")),
            StreetFilter::Street("FIRST ST".to_string())
        );
    }

    #[test]
    fn test_parse_datetime_cell() {
        assert_eq!(
            parse_date("2019-03-12T00:00:00"),
            NaiveDate::from_ymd_opt(2019, 3, 12)
        );
        assert_eq!(parse_date("03/12/2019"), None);
    }
}
