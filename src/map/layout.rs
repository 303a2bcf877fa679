use crate::map::projection::ViewportDimensions;
use tracing::debug;

/// Watches the container width and emits viewport changes. Height is
/// fixed by policy.
#[derive(Debug)]
pub struct LayoutObserver {
    height: f64,
    last: Option<ViewportDimensions>,
    connected: bool,
}

impl LayoutObserver {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            last: None,
            connected: true,
        }
    }

    /// Report the container's current content width. Returns the new
    /// viewport when it differs from the last one emitted.
    pub fn observe(&mut self, container_width: f64) -> Option<ViewportDimensions> {
        if !self.connected || !container_width.is_finite() {
            return None;
        }
        let next = ViewportDimensions::new(container_width.max(0.0), self.height);
        if self.last == Some(next) {
            return None;
        }
        debug!(width = next.width, height = next.height, "container resized");
        self.last = Some(next);
        Some(next)
    }

    pub fn current(&self) -> Option<ViewportDimensions> {
        self.last
    }

    /// Stop observing. Later reports are ignored.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Container width in surface units for a panel `dots_wide` by `dots_high`,
/// so that a surface of fixed `height` fills the panel at uniform scale.
pub fn container_width(dots_wide: usize, dots_high: usize, height: f64) -> f64 {
    if dots_high == 0 {
        return 0.0;
    }
    dots_wide as f64 * height / dots_high as f64
}
