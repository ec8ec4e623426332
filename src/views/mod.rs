//! Dashboard Views
//!
//! Pure builders that turn the filtered traffic set into serializable
//! view models. Each builder consumes the same immutable snapshot and
//! tolerates empty input; nothing here touches the network.

pub mod charts;
pub mod map;
pub mod table;

pub use charts::{ChartDataset, ChartView, TOP_STREETS_LIMIT};
pub use map::{Coordinate, MapView, Marker, DEFAULT_ZOOM};
pub use table::TableView;
