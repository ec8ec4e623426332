//! Aggregate Chart Views
//!
//! Two independent aggregations over the same filtered set:
//!
//! - **Top Streets**: mean ADT per street, the 10 largest means,
//!   descending. Equal means are broken by street name ascending so the
//!   ordering is deterministic.
//! - **Volume Over Time**: mean ADT per count date, dates ascending.
//!
//! Both tolerate an empty set by producing an empty chart.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::traffic::TrafficSet;

/// How many street groups the bar chart keeps
pub const TOP_STREETS_LIMIT: usize = 10;

const BAR_COLOR: &str = "#2196F3";
const LINE_COLOR: &str = "#4CAF50";

/// Chart view model: category/axis labels plus one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub labels: Vec<String>,
    pub dataset: ChartDataset,
}

/// Single dataset for a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub color: String,
}

/// Mean ADT per street, top 10 by mean, descending.
pub fn top_streets(set: &TrafficSet) -> ChartView {
    // BTreeMap keeps group keys name-ascending, which is exactly the
    // tie-break order after the sort by mean below.
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in set.records() {
        let entry = groups.entry(record.street.as_str()).or_insert((0.0, 0));
        entry.0 += record.adt;
        entry.1 += 1;
    }

    let mut means: Vec<(&str, f64)> = groups
        .into_iter()
        .map(|(street, (sum, count))| (street, sum / count as f64))
        .collect();

    means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    means.truncate(TOP_STREETS_LIMIT);

    ChartView {
        labels: means.iter().map(|(street, _)| street.to_string()).collect(),
        dataset: ChartDataset {
            label: "Mean ADT".to_string(),
            data: means.iter().map(|(_, mean)| *mean).collect(),
            color: BAR_COLOR.to_string(),
        },
    }
}

/// Mean ADT per count date, dates ascending.
pub fn volume_over_time(set: &TrafficSet) -> ChartView {
    let mut groups: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in set.records() {
        let entry = groups.entry(record.count_date).or_insert((0.0, 0));
        entry.0 += record.adt;
        entry.1 += 1;
    }

    let mut labels = Vec::with_capacity(groups.len());
    let mut data = Vec::with_capacity(groups.len());
    for (date, (sum, count)) in groups {
        labels.push(date.format("%Y-%m-%d").to_string());
        data.push(sum / count as f64);
    }

    ChartView {
        labels,
        dataset: ChartDataset {
            label: "Mean ADT".to_string(),
            data,
            color: LINE_COLOR.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigquery::QueryResults;
    use crate::traffic::test_data::sample_set;
    use crate::traffic::{
        TrafficSet, ADT_COLUMN, COUNTDATE_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN,
        STREET_COLUMN,
    };

    fn set_with_adt(rows: &[(&str, &str, &str)]) -> TrafficSet {
        let results = QueryResults {
            columns: vec![
                STREET_COLUMN.to_string(),
                ADT_COLUMN.to_string(),
                LATITUDE_COLUMN.to_string(),
                LONGITUDE_COLUMN.to_string(),
                COUNTDATE_COLUMN.to_string(),
            ],
            rows: rows
                .iter()
                .map(|(street, adt, date)| {
                    vec![
                        Some(street.to_string()),
                        Some(adt.to_string()),
                        Some("37.3".to_string()),
                        Some("-121.9".to_string()),
                        Some(date.to_string()),
                    ]
                })
                .collect(),
        };
        TrafficSet::from_results(results).unwrap()
    }

    #[test]
    fn test_top_streets_means_descending() {
        let set = sample_set();
        let chart = top_streets(&set);

        // MONTEREY HY mean = (34500 + 31000) / 2 = 32750
        assert_eq!(
            chart.labels,
            vec!["MONTEREY HY", "SANTA CLARA ST", "FIRST ST"]
        );
        assert_eq!(chart.dataset.data, vec![32750.0, 18000.0, 12000.0]);
    }

    #[test]
    fn test_top_streets_keeps_at_most_ten() {
        let rows: Vec<(String, String, String)> = (0..15)
            .map(|i| {
                (
                    format!("STREET {:02}", i),
                    format!("{}", 1000 * (i + 1)),
                    "2019-01-01".to_string(),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
            .collect();
        let chart = top_streets(&set_with_adt(&borrowed));

        assert_eq!(chart.labels.len(), TOP_STREETS_LIMIT);
        assert_eq!(chart.labels[0], "STREET 14");
        assert_eq!(chart.dataset.data[0], 15000.0);
        // Descending throughout
        for window in chart.dataset.data.windows(2) {
            assert!(window[0] >= window[1]);
        }
    }

    #[test]
    fn test_top_streets_ties_break_by_name() {
        let chart = top_streets(&set_with_adt(&[
            ("ZEBRA WY", "5000", "2019-01-01"),
            ("ALPHA AV", "5000", "2019-01-01"),
            ("MIDDLE RD", "9000", "2019-01-01"),
        ]));

        assert_eq!(chart.labels, vec!["MIDDLE RD", "ALPHA AV", "ZEBRA WY"]);
    }

    #[test]
    fn test_volume_over_time_dates_ascending() {
        let chart = volume_over_time(&set_with_adt(&[
            ("A ST", "100", "2019-04-02"),
            ("B ST", "300", "2019-03-12"),
            ("C ST", "200", "2019-04-02"),
        ]));

        assert_eq!(chart.labels, vec!["2019-03-12", "2019-04-02"]);
        assert_eq!(chart.dataset.data, vec![300.0, 150.0]);
    }

    #[test]
    fn test_empty_set_yields_empty_charts() {
        let empty = TrafficSet::default();
        assert!(top_streets(&empty).labels.is_empty());
        assert!(top_streets(&empty).dataset.data.is_empty());
        assert!(volume_over_time(&empty).labels.is_empty());
    }
}
