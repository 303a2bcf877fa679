use crate::braille::{BrailleCanvas, FillCanvas};
use crate::map::Rgb;
use glam::DVec2;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Stroke every ring of a projected outline. `to_dots` maps surface
/// coordinates to canvas dots.
pub fn stroke_rings<F>(canvas: &mut BrailleCanvas, rings: &[Vec<DVec2>], to_dots: F)
where
    F: Fn(DVec2) -> DVec2,
{
    let (w, h) = ((canvas.width() * 2) as f64, (canvas.height() * 4) as f64);
    for ring in rings {
        for edge in ring.windows(2) {
            let (a, b) = (to_dots(edge[0]), to_dots(edge[1]));
            // Skip segments entirely off-canvas
            if a.x.max(b.x) < 0.0 || a.x.min(b.x) >= w || a.y.max(b.y) < 0.0 || a.y.min(b.y) >= h {
                continue;
            }
            draw_line(canvas, a.x as i32, a.y as i32, b.x as i32, b.y as i32);
        }
    }
}

/// Even-odd scanline fill of all rings together, sampling pixel centers.
/// `to_pixels` maps surface coordinates to fill-canvas pixels.
pub fn fill_rings<F>(canvas: &mut FillCanvas, rings: &[Vec<DVec2>], color: Rgb, to_pixels: F)
where
    F: Fn(DVec2) -> DVec2,
{
    let projected: Vec<Vec<DVec2>> = rings
        .iter()
        .filter(|r| r.len() >= 3)
        .map(|r| r.iter().map(|&p| to_pixels(p)).collect())
        .collect();
    let Some((min_y, max_y)) = projected
        .iter()
        .flatten()
        .map(|p| p.y)
        .fold(None, |acc: Option<(f64, f64)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    else {
        return;
    };

    let first_row = (min_y.floor() as i64).max(0);
    let last_row = (max_y.ceil() as i64).min(canvas.height() as i64 - 1);
    let mut crossings: Vec<f64> = Vec::new();

    for row in first_row..=last_row {
        let sample_y = row as f64 + 0.5;
        crossings.clear();
        for ring in &projected {
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > sample_y) != (b.y > sample_y) {
                    crossings.push(a.x + (sample_y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
                j = i;
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            // Pixels whose centers lie inside [x0, x1)
            let x0 = (pair[0] - 0.5).ceil() as i64;
            let x1 = (pair[1] - 0.5).ceil() as i64;
            canvas.fill_span(row, x0, x1, color);
        }
    }
}

/// Fill an axis-aligned rectangle given in pixel coordinates
pub fn fill_rect(canvas: &mut FillCanvas, min: DVec2, max: DVec2, color: Rgb) {
    let x0 = (min.x - 0.5).ceil() as i64;
    let x1 = (max.x - 0.5).ceil() as i64;
    let y0 = (min.y - 0.5).ceil() as i64;
    let y1 = (max.y - 0.5).ceil() as i64;
    for row in y0..y1 {
        canvas.fill_span(row, x0, x1, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn square(min: f64, max: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(min, min),
            DVec2::new(max, min),
            DVec2::new(max, max),
            DVec2::new(min, max),
            DVec2::new(min, min),
        ]
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        // Top dot row set across all five cells
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_fill_square() {
        let mut canvas = FillCanvas::new(6, 3);
        fill_rings(&mut canvas, &[square(1.0, 4.0)], BLUE, |p| p);
        for y in 0..6 {
            for x in 0..6 {
                let inside = (1..4).contains(&x) && (1..4).contains(&y);
                assert_eq!(canvas.get(x, y).is_some(), inside, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_fill_respects_holes() {
        let mut canvas = FillCanvas::new(10, 5);
        fill_rings(&mut canvas, &[square(0.0, 10.0), square(4.0, 6.0)], BLUE, |p| p);
        assert!(canvas.get(1, 1).is_some());
        assert!(canvas.get(5, 5).is_none());
        assert!(canvas.get(8, 8).is_some());
    }

    #[test]
    fn test_stroke_skips_offscreen_segments() {
        let mut canvas = BrailleCanvas::new(2, 1);
        stroke_rings(
            &mut canvas,
            &[vec![DVec2::new(-50.0, -50.0), DVec2::new(-10.0, -10.0)]],
            |p| p,
        );
        assert_eq!(canvas.glyph(0, 0), None);
    }

    #[test]
    fn test_fill_rect() {
        let mut canvas = FillCanvas::new(4, 2);
        fill_rect(&mut canvas, DVec2::new(1.0, 0.0), DVec2::new(3.0, 2.0), BLUE);
        assert!(canvas.get(0, 0).is_none());
        assert!(canvas.get(1, 0).is_some());
        assert!(canvas.get(2, 1).is_some());
        assert!(canvas.get(3, 1).is_none());
        assert!(canvas.get(1, 2).is_none());
    }
}
