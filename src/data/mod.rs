pub mod geometry;
pub mod stats;
pub mod table;

pub use geometry::{spawn_load, GeoFeature, GeometryCache, GeometryLoad, Polygon, Ring};
pub use stats::{distinct, filter_rows, load_dataset, FilterCriteria, StatRow};
