//! Traffic Data Model
//!
//! The fetched table, the typed records decoded from it, and the street
//! filter applied before the views consume it. Data flows one way:
//! fetch → decode → filter → views. Nothing here mutates a record after
//! decode, and nothing is persisted across renders.

mod fetch;
mod records;

pub use fetch::{fetch_traffic, FetchError, PROJECT_ID, TRAFFIC_TABLE};
pub use records::{
    StreetFilter, TrafficError, TrafficRecord, TrafficSet, ADT_COLUMN, ALL_STREETS,
    COUNTDATE_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN, STREET_COLUMN,
};

#[cfg(test)]
pub(crate) use records::tests as test_data;
