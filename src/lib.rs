//! Choropleth world map engine: filters a statistics table, colors
//! countries by value, and draws the result to a terminal or SVG.

pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod map;

pub use config::MapConfig;
pub use error::{DatasetError, ExportError, GeometryError};
