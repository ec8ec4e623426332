//! Table View
//!
//! Verbatim grid of the (possibly filtered) traffic set: columns in
//! schema order, one row per record, no transformation.

use serde::Serialize;

use crate::traffic::TrafficSet;

/// Grid view model of a traffic set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Build the grid. Always succeeds; an empty set renders an empty grid.
pub fn build(set: &TrafficSet) -> TableView {
    TableView {
        columns: set.columns().to_vec(),
        rows: set.records().iter().map(|r| r.cells().to_vec()).collect(),
    }
}
