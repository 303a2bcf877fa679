//! Named defaults for the map surface and the `MapConfig` passed into the
//! render orchestrator.

use crate::map::{Gradient, InterpolationSpace, Rgb};

/// Default location of the country boundary file
pub const DEFAULT_GEOMETRY_PATH: &str = "data/countries.geojson";

/// Surface height, fixed by policy. Width follows the container.
pub const DEFAULT_MAP_HEIGHT: f64 = 600.0;
/// Width used before the container has been measured
pub const DEFAULT_MAP_WIDTH: f64 = 800.0;

pub const MARGIN_TOP: f64 = 20.0;
pub const MARGIN_RIGHT: f64 = 20.0;
pub const MARGIN_BOTTOM: f64 = 50.0;
pub const MARGIN_LEFT: f64 = 40.0;

/// Fill for countries without a matching statistic (`#ddd`)
pub const NO_DATA_FILL: Rgb = Rgb::new(0xdd, 0xdd, 0xdd);
/// Fill used by a scale that has no domain (empty filtered set)
pub const NEUTRAL_FILL: Rgb = Rgb::new(0xbd, 0xbd, 0xbd);
/// Country outline color (`#777`)
pub const STROKE_COLOR: Rgb = Rgb::new(0x77, 0x77, 0x77);
pub const STROKE_WIDTH: f64 = 1.0;

pub const LEGEND_CELLS: usize = 10;
pub const LEGEND_SHAPE_WIDTH: f64 = 50.0;
pub const LEGEND_SHAPE_HEIGHT: f64 = 15.0;
/// Distance of the legend's top edge above the bottom of the surface
pub const LEGEND_BOTTOM_OFFSET: f64 = 40.0;

/// Display name of the feature dropped from every geometry load
pub const EXCLUDED_FEATURE: &str = "Antarctica";

/// Filter value for the variable criterion that matches every variable
pub const BOTH_VARIABLES: &str = "Both";

/// Space reserved around the fitted map, in surface units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: MARGIN_TOP,
            right: MARGIN_RIGHT,
            bottom: MARGIN_BOTTOM,
            left: MARGIN_LEFT,
        }
    }
}

/// Legend layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendConfig {
    pub cells: usize,
    pub shape_width: f64,
    pub shape_height: f64,
    pub bottom_offset: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            cells: LEGEND_CELLS,
            shape_width: LEGEND_SHAPE_WIDTH,
            shape_height: LEGEND_SHAPE_HEIGHT,
            bottom_offset: LEGEND_BOTTOM_OFFSET,
        }
    }
}

/// Everything the render pipeline needs that is not an input
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub height: f64,
    pub margins: Margins,
    pub gradient: Gradient,
    pub interpolation: InterpolationSpace,
    pub no_data_fill: Rgb,
    pub neutral_fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f64,
    pub legend: LegendConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_MAP_HEIGHT,
            margins: Margins::default(),
            gradient: Gradient::default(),
            interpolation: InterpolationSpace::default(),
            no_data_fill: NO_DATA_FILL,
            neutral_fill: NEUTRAL_FILL,
            stroke: STROKE_COLOR,
            stroke_width: STROKE_WIDTH,
            legend: LegendConfig::default(),
        }
    }
}
