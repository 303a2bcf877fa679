use glam::DVec2;
use std::collections::HashMap;

/// Bucket grid over shape bounding boxes for pointer hit-testing.
/// Each shape is indexed into every cell its bbox overlaps, so a point
/// query never misses a shape; callers confirm with an exact
/// containment test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl HitGrid {
    /// Default bucket edge, in surface units
    pub const CELL_SIZE: f64 = 25.0;

    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i32, i32) {
        let x = (p.x / self.cell_size).floor() as i32;
        let y = (p.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from per-shape bounds; `None` entries (empty shapes) are skipped
    /// but still consume their index.
    pub fn build(bounds: impl Iterator<Item = Option<(DVec2, DVec2)>>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bounds.enumerate() {
            let Some((min, max)) = bbox else { continue };
            if !min.is_finite() || !max.is_finite() {
                continue;
            }
            let min_cell = grid.to_cell(min);
            let max_cell = grid.to_cell(max);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate shape indices whose bbox cell covers `p`, ascending
    pub fn query_point(&self, p: DVec2) -> &[usize] {
        if !p.is_finite() || self.cell_size <= 0.0 {
            return &[];
        }
        self.cells
            .get(&self.to_cell(p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_query_covers_spanning_bbox() {
        let grid = HitGrid::build(
            [
                Some((DVec2::new(0.0, 0.0), DVec2::new(60.0, 10.0))),
                None,
                Some((DVec2::new(50.0, 0.0), DVec2::new(55.0, 5.0))),
            ]
            .into_iter(),
            25.0,
        );
        assert_eq!(grid.query_point(DVec2::new(30.0, 5.0)), &[0]);
        assert_eq!(grid.query_point(DVec2::new(52.0, 2.0)), &[0, 2]);
        assert!(grid.query_point(DVec2::new(500.0, 500.0)).is_empty());
    }
}
