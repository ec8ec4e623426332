//! Map View
//!
//! Marker map of the traffic set, centered on the centroid of the
//! coordinate columns. The centroid of an empty set is undefined, so the
//! builder returns `None` and the page skips the map section entirely
//! rather than inventing a fallback center.

use serde::Serialize;

use crate::traffic::TrafficSet;

/// Initial zoom level, sized for the San Jose metro area
pub const DEFAULT_ZOOM: u8 = 12;

/// Map view model: center, zoom, one marker per record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub markers: Vec<Marker>,
}

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single map marker with its popup label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

/// Build the map view, or `None` for an empty set.
pub fn build(set: &TrafficSet) -> Option<MapView> {
    if set.is_empty() {
        return None;
    }

    let n = set.len() as f64;
    let latitude = set.records().iter().map(|r| r.latitude).sum::<f64>() / n;
    let longitude = set.records().iter().map(|r| r.longitude).sum::<f64>() / n;

    let markers = set
        .records()
        .iter()
        .map(|r| Marker {
            latitude: r.latitude,
            longitude: r.longitude,
            label: format!("Street: {}<br>ADT: {}", r.street, r.adt),
        })
        .collect();

    Some(MapView {
        center: Coordinate {
            latitude,
            longitude,
        },
        zoom: DEFAULT_ZOOM,
        markers,
    })
}
