use crate::braille::{BrailleCanvas, FillCanvas};
use crate::map::geometry::{fill_rect, fill_rings, stroke_rings};
use crate::map::scene::Scene;
use glam::DVec2;

/// Terminal rasterization of one scene, ready for the map widget
pub struct MapLayers {
    /// Country and legend fills, half-block resolution
    pub fills: FillCanvas,
    /// Country outlines
    pub strokes: BrailleCanvas,
    /// Outline of the hovered country, drawn over everything else
    pub highlight: BrailleCanvas,
    /// Legend labels in character coordinates
    pub labels: Vec<(u16, u16, String)>,
}

/// Uniform mapping from surface units to character cells. The surface's
/// fixed height spans the panel's full height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    /// Braille dots per surface unit
    pub dots_per_unit: f64,
}

impl SurfaceTransform {
    pub fn for_panel(char_height: usize, surface_height: f64) -> Self {
        let dots_per_unit = if surface_height > 0.0 {
            (char_height * 4) as f64 / surface_height
        } else {
            0.0
        };
        Self { dots_per_unit }
    }

    pub fn to_dots(&self, p: DVec2) -> DVec2 {
        p * self.dots_per_unit
    }

    /// Half-block pixels are 2x2 braille dots
    pub fn to_fill_pixels(&self, p: DVec2) -> DVec2 {
        p * (self.dots_per_unit / 2.0)
    }

    /// Surface point under the center of a character cell, relative to the
    /// panel's top-left corner
    pub fn cell_to_surface(&self, col: u16, row: u16) -> Option<DVec2> {
        if self.dots_per_unit <= 0.0 {
            return None;
        }
        let dots = DVec2::new(col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0);
        Some(dots / self.dots_per_unit)
    }

    fn to_cell(&self, p: DVec2) -> (i64, i64) {
        let d = self.to_dots(p);
        ((d.x / 2.0).floor() as i64, (d.y / 4.0).floor() as i64)
    }
}

/// Rasterizes scenes into terminal layers
pub struct MapRenderer;

impl MapRenderer {
    /// Draw `scene` into a `width x height` character panel
    pub fn render(scene: &Scene, width: usize, height: usize, hovered: Option<usize>) -> MapLayers {
        let transform = SurfaceTransform::for_panel(height, scene.viewport.height);
        let mut fills = FillCanvas::new(width, height);
        let mut strokes = BrailleCanvas::new(width, height);
        let mut highlight = BrailleCanvas::new(width, height);

        // Later shapes paint over earlier ones, as in the scene order
        for shape in &scene.shapes {
            fill_rings(&mut fills, &shape.path.rings, shape.fill, |p| transform.to_fill_pixels(p));
        }
        for shape in &scene.shapes {
            stroke_rings(&mut strokes, &shape.path.rings, |p| transform.to_dots(p));
        }
        if let Some(shape) = hovered.and_then(|idx| scene.shapes.get(idx)) {
            stroke_rings(&mut highlight, &shape.path.rings, |p| transform.to_dots(p));
        }

        let labels = Self::draw_legend(scene, &transform, &mut fills, width, height);

        MapLayers {
            fills,
            strokes,
            highlight,
            labels,
        }
    }

    /// Fill legend swatches and place their labels centered under each,
    /// dropping labels that would collide with the previous one.
    fn draw_legend(
        scene: &Scene,
        transform: &SurfaceTransform,
        fills: &mut FillCanvas,
        width: usize,
        height: usize,
    ) -> Vec<(u16, u16, String)> {
        let mut labels = Vec::new();
        let mut next_free_col: i64 = 0;

        for cell in &scene.legend.cells {
            let min = transform.to_fill_pixels(cell.origin);
            let max = transform.to_fill_pixels(cell.origin + cell.size);
            fill_rect(fills, min, max, cell.color);

            let (left, _) = transform.to_cell(cell.origin);
            let (right, bottom) = transform.to_cell(cell.origin + cell.size);
            let row = bottom + 1;
            let len = cell.label.chars().count() as i64;
            let col = (left + right) / 2 - len / 2;
            if row < 0 || row >= height as i64 || col < next_free_col || col + len > width as i64 {
                continue;
            }
            labels.push((col as u16, row as u16, cell.label.clone()));
            next_free_col = col + len + 1;
        }
        labels
    }
}
