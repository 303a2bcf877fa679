use crate::map::scene::{Scene, Shape};
use glam::DVec2;

/// Where the pointer was when the tooltip opened, in the host's screen
/// coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TooltipPosition {
    pub x: f64,
    pub y: f64,
}

/// What the tooltip shows; `content == None` hides it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverState {
    pub content: Option<String>,
    pub position: TooltipPosition,
}

/// Tooltip text for one shape
pub fn tooltip_text(shape: &Shape) -> String {
    match shape.value {
        Some(value) => format!("{}: {}", shape.name, round2(value)),
        None => format!("{}: No available data", shape.name),
    }
}

/// Round to 2 decimals, halves toward +inf; `Display` then prints the
/// shortest form (10, 3.14). Adding `0.0` turns `-0` into `0`.
fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0 + 0.0
}

/// Two-state hover machine: idle, or hovering one shape of the current scene.
#[derive(Debug, Default)]
pub struct HoverController {
    state: HoverState,
    hovered: Option<usize>,
    generation: u64,
}

impl HoverController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn is_hovering(&self) -> bool {
        self.state.content.is_some()
    }

    /// Scene generation the controller is attached to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Detach from the previous scene and attach to a new one. Hover does not
    /// survive a redraw.
    pub fn rebind(&mut self, generation: u64) {
        self.generation = generation;
        self.pointer_leave();
    }

    pub fn pointer_enter(&mut self, scene: &Scene, shape: usize, position: TooltipPosition) {
        let Some(target) = scene.shapes.get(shape) else {
            self.pointer_leave();
            return;
        };
        self.hovered = Some(shape);
        self.state = HoverState {
            content: Some(tooltip_text(target)),
            position,
        };
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = None;
        self.state = HoverState::default();
    }

    /// Turn a pointer move into enter/leave transitions. `surface` is the
    /// pointer in scene coordinates, `screen` is where the tooltip should go.
    pub fn pointer_moved(&mut self, scene: &Scene, surface: DVec2, screen: TooltipPosition) {
        let hit = scene.shape_at(surface);
        if hit == self.hovered {
            return;
        }
        if self.hovered.is_some() {
            self.pointer_leave();
        }
        if let Some(idx) = hit {
            self.pointer_enter(scene, idx, screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::data::geometry::square;
    use crate::data::stats::row;
    use crate::data::FilterCriteria;
    use crate::map::projection::ViewportDimensions;
    use crate::map::scene::render_scene;

    fn scene(rows: &[crate::data::StatRow]) -> Scene {
        let features = vec![
            square("USA", "United States of America", -120.0, 25.0, 40.0),
            square("FRA", "France", 0.0, 42.0, 8.0),
        ];
        render_scene(
            &features,
            rows,
            &FilterCriteria::new("P", "M", "A", "V"),
            ViewportDimensions::new(800.0, 600.0),
            &MapConfig::default(),
        )
    }

    #[test]
    fn test_enter_matched_and_unmatched() {
        let scene = scene(&[row("USA", 10.0)]);
        let mut hover = HoverController::new();
        let pos = TooltipPosition { x: 12.0, y: 7.0 };

        hover.pointer_enter(&scene, 0, pos);
        assert_eq!(hover.state().content.as_deref(), Some("United States of America: 10"));
        assert_eq!(hover.state().position, pos);

        hover.pointer_enter(&scene, 1, pos);
        assert_eq!(hover.state().content.as_deref(), Some("France: No available data"));

        hover.pointer_leave();
        assert_eq!(hover.state(), &HoverState::default());
    }

    #[test]
    fn test_value_rounded_to_two_decimals() {
        let scene = scene(&[row("USA", 3.14159)]);
        let mut hover = HoverController::new();
        hover.pointer_enter(&scene, 0, TooltipPosition::default());
        assert_eq!(hover.state().content.as_deref(), Some("United States of America: 3.14"));
    }

    #[test]
    fn test_small_negative_values_print_without_sign() {
        let scene = scene(&[row("USA", -0.001)]);
        let mut hover = HoverController::new();
        hover.pointer_enter(&scene, 0, TooltipPosition::default());
        assert_eq!(hover.state().content.as_deref(), Some("United States of America: 0"));
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(round2(-0.125).to_string(), "-0.12");
        assert_eq!(round2(0.125).to_string(), "0.13");
        assert_eq!(round2(-0.0).to_string(), "0");
        assert_eq!(round2(-1.5).to_string(), "-1.5");
    }

    #[test]
    fn test_pointer_moved_derives_transitions() {
        let scene = scene(&[]);
        let mut hover = HoverController::new();
        let usa = scene.projection.project(DVec2::new(-100.0, 40.0));
        let ocean = scene.projection.project(DVec2::new(-30.0, 40.0));

        hover.pointer_moved(&scene, usa, TooltipPosition { x: 1.0, y: 1.0 });
        assert_eq!(hover.hovered(), Some(0));

        // Position sticks to the enter event while inside the same shape
        hover.pointer_moved(&scene, usa + DVec2::new(1.0, 0.0), TooltipPosition { x: 2.0, y: 1.0 });
        assert_eq!(hover.state().position, TooltipPosition { x: 1.0, y: 1.0 });

        hover.pointer_moved(&scene, ocean, TooltipPosition { x: 3.0, y: 1.0 });
        assert!(!hover.is_hovering());
    }

    #[test]
    fn test_rebind_resets_hover() {
        let scene = scene(&[]);
        let mut hover = HoverController::new();
        hover.pointer_enter(&scene, 0, TooltipPosition::default());
        hover.rebind(2);
        assert!(!hover.is_hovering());
        assert_eq!(hover.hovered(), None);
        assert_eq!(hover.generation(), 2);
    }
}
