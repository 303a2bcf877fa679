//! The render pipeline as a pure function from inputs to a shape set.

use crate::config::MapConfig;
use crate::data::{filter_rows, FilterCriteria, GeoFeature, StatRow};
use crate::map::join::{join, Match};
use crate::map::legend::{build_legend, LegendAnchor, LegendSpec};
use crate::map::projection::{FeaturePath, MercatorProjection, PathGenerator, ViewportDimensions};
use crate::map::scale::{ColorRamp, ColorScale, Rgb};
use crate::map::spatial::HitGrid;
use glam::DVec2;
use tracing::debug;

/// One drawn country
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub iso_a3: String,
    pub name: String,
    pub path: FeaturePath,
    pub fill: Rgb,
    /// Joined statistic, `None` when the country has no data
    pub value: Option<f64>,
}

/// Everything drawn by one render pass
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: ViewportDimensions,
    pub projection: MercatorProjection,
    pub scale: ColorScale,
    /// In feature order; later shapes draw over earlier ones
    pub shapes: Vec<Shape>,
    pub legend: LegendSpec,
    pub stroke: Rgb,
    pub stroke_width: f64,
    /// Rows that passed the filter
    pub matched_rows: usize,
    hits: HitGrid,
}

impl Scene {
    /// Topmost shape containing `point` (surface coordinates)
    pub fn shape_at(&self, point: DVec2) -> Option<usize> {
        self.hits
            .query_point(point)
            .iter()
            .rev()
            .copied()
            .find(|&idx| self.shapes[idx].path.contains(point))
    }
}

/// Filter, scale, join, project and lay out the legend.
pub fn render_scene(
    features: &[GeoFeature],
    rows: &[StatRow],
    criteria: &FilterCriteria,
    viewport: ViewportDimensions,
    config: &MapConfig,
) -> Scene {
    let filtered = filter_rows(rows, criteria);
    let ramp = ColorRamp {
        gradient: config.gradient,
        space: config.interpolation,
    };
    let scale = ColorScale::build(&filtered, ramp, config.neutral_fill);
    let matches = join(features, &filtered);

    let projection = MercatorProjection::fit(features, viewport, &config.margins);
    let paths = PathGenerator::new(projection).paths(features);

    let shapes: Vec<Shape> = features
        .iter()
        .zip(paths)
        .zip(&matches)
        .map(|((feature, path), matched)| {
            let (fill, value) = match matched {
                Match::Row(row) => (scale.color(row.value), Some(row.value)),
                Match::NoData => (config.no_data_fill, None),
            };
            Shape {
                iso_a3: feature.iso_a3.clone(),
                name: feature.name.clone(),
                path,
                fill,
                value,
            }
        })
        .collect();

    let hits = HitGrid::build(shapes.iter().map(|s| s.path.bounds()), HitGrid::CELL_SIZE);
    let legend = build_legend(
        &scale,
        config.legend.cells,
        viewport.width,
        LegendAnchor::from_config(&config.legend, viewport.height),
    );

    debug!(
        features = features.len(),
        filtered = filtered.len(),
        matched = matches.iter().filter(|m| matches!(m, Match::Row(_))).count(),
        width = viewport.width,
        "rendered scene"
    );

    Scene {
        viewport,
        projection,
        scale,
        shapes,
        legend,
        stroke: config.stroke,
        stroke_width: config.stroke_width,
        matched_rows: filtered.len(),
        hits,
    }
}
