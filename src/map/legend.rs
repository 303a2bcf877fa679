use crate::config::LegendConfig;
use crate::map::scale::{ColorScale, Rgb};
use glam::DVec2;

/// Where the legend sits and how big each swatch is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendAnchor {
    /// Top edge of the swatch row
    pub top: f64,
    pub shape_width: f64,
    pub shape_height: f64,
}

impl LegendAnchor {
    /// `bottom_offset` units above the bottom of a surface of `height`
    pub fn from_config(config: &LegendConfig, height: f64) -> Self {
        Self {
            top: height - config.bottom_offset,
            shape_width: config.shape_width,
            shape_height: config.shape_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendCell {
    /// Sampled domain value; `None` under a neutral scale
    pub value: Option<f64>,
    pub color: Rgb,
    pub label: String,
    /// Top-left corner of the swatch
    pub origin: DVec2,
    pub size: DVec2,
}

/// A horizontal row of swatches sampling a color scale
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegendSpec {
    pub origin: DVec2,
    pub cells: Vec<LegendCell>,
}

impl LegendSpec {
    pub fn width(&self) -> f64 {
        self.cells.iter().map(|c| c.size.x).sum()
    }
}

/// Sample `scale` at `cell_count` evenly spaced domain values, centered
/// horizontally in `width`.
pub fn build_legend(scale: &ColorScale, cell_count: usize, width: f64, anchor: LegendAnchor) -> LegendSpec {
    let total = cell_count as f64 * anchor.shape_width;
    let origin = DVec2::new(((width - total) / 2.0).max(0.0), anchor.top);
    let size = DVec2::new(anchor.shape_width, anchor.shape_height);

    let cells = (0..cell_count)
        .map(|i| {
            let value = scale.domain().map(|(min, max)| {
                if cell_count > 1 {
                    min + i as f64 * (max - min) / (cell_count - 1) as f64
                } else {
                    min
                }
            });
            LegendCell {
                value,
                color: value.map_or_else(|| scale.color(f64::NAN), |v| scale.color(v)),
                label: value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v)),
                origin: origin + DVec2::new(i as f64 * anchor.shape_width, 0.0),
                size,
            }
        })
        .collect();

    LegendSpec { origin, cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NEUTRAL_FILL;
    use crate::map::scale::ColorRamp;

    fn anchor() -> LegendAnchor {
        LegendAnchor::from_config(&LegendConfig::default(), 600.0)
    }

    #[test]
    fn test_cells_sample_domain_boundaries() {
        let scale = ColorScale::Sequential {
            min: 0.0,
            max: 9.0,
            ramp: ColorRamp::default(),
            neutral: NEUTRAL_FILL,
        };
        let legend = build_legend(&scale, 10, 800.0, anchor());
        assert_eq!(legend.cells.len(), 10);
        let labels: Vec<_> = legend.cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels[0], "0.00");
        assert_eq!(labels[1], "1.00");
        assert_eq!(labels[9], "9.00");
        assert_eq!(legend.cells[0].color, scale.color(0.0));
        assert_eq!(legend.cells[9].color, scale.color(9.0));
    }

    #[test]
    fn test_centered_and_anchored_to_bottom() {
        let scale = ColorScale::Neutral(NEUTRAL_FILL);
        let legend = build_legend(&scale, 10, 800.0, anchor());
        assert_eq!(legend.origin, DVec2::new(150.0, 560.0));
        assert_eq!(legend.width(), 500.0);
        assert_eq!(legend.cells[3].origin.x, 300.0);
    }

    #[test]
    fn test_neutral_scale_cells() {
        let legend = build_legend(&ColorScale::Neutral(NEUTRAL_FILL), 4, 800.0, anchor());
        assert!(legend.cells.iter().all(|c| c.color == NEUTRAL_FILL && c.label == "n/a"));
    }

    #[test]
    fn test_narrow_width_clamps_to_left_edge() {
        let legend = build_legend(&ColorScale::Neutral(NEUTRAL_FILL), 10, 100.0, anchor());
        assert_eq!(legend.origin.x, 0.0);
    }

    #[test]
    fn test_pure() {
        let scale = ColorScale::Sequential {
            min: 0.25,
            max: 0.75,
            ramp: ColorRamp::default(),
            neutral: NEUTRAL_FILL,
        };
        assert_eq!(
            build_legend(&scale, 10, 640.0, anchor()),
            build_legend(&scale, 10, 640.0, anchor())
        );
    }
}
