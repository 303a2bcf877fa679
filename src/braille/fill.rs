use crate::map::Rgb;

/// Color grid drawn with half-block glyphs: each character cell holds two
/// vertically stacked pixels, so the grid is `width x height*2`.
pub struct FillCanvas {
    width: usize,  // Pixels (= characters)
    height: usize, // Pixels (= characters * 2)
    pixels: Vec<Option<Rgb>>,
}

impl FillCanvas {
    pub fn new(char_width: usize, char_height: usize) -> Self {
        let height = char_height * 2;
        Self {
            width: char_width,
            height,
            pixels: vec![None; char_width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = Some(color);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            None
        }
    }

    /// Fill the horizontal run `x0..x1` of row `y`, clipped to the grid
    pub fn fill_span(&mut self, y: i64, x0: i64, x1: i64, color: Rgb) {
        if y < 0 || y >= self.height as i64 {
            return;
        }
        let start = x0.max(0) as usize;
        let end = x1.min(self.width as i64).max(0) as usize;
        let row = y as usize * self.width;
        for px in &mut self.pixels[row + start.min(end)..row + end] {
            *px = Some(color);
        }
    }

    /// (top, bottom) pixel colors of a character cell
    pub fn cell(&self, cx: usize, cy: usize) -> (Option<Rgb>, Option<Rgb>) {
        (self.get(cx, cy * 2), self.get(cx, cy * 2 + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);

    #[test]
    fn test_cell_halves() {
        let mut canvas = FillCanvas::new(2, 1);
        canvas.set(0, 1, RED);
        assert_eq!(canvas.cell(0, 0), (None, Some(RED)));
        assert_eq!(canvas.cell(1, 0), (None, None));
    }

    #[test]
    fn test_fill_span_clips() {
        let mut canvas = FillCanvas::new(4, 1);
        canvas.fill_span(0, -3, 2, RED);
        canvas.fill_span(5, 0, 4, RED);
        canvas.fill_span(1, 3, 99, RED);
        assert_eq!(canvas.get(0, 0), Some(RED));
        assert_eq!(canvas.get(1, 0), Some(RED));
        assert_eq!(canvas.get(2, 0), None);
        assert_eq!(canvas.get(3, 1), Some(RED));
        assert_eq!(canvas.get(2, 1), None);
    }
}
