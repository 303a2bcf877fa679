mod geometry;
pub mod interaction;
pub mod join;
pub mod layout;
pub mod legend;
pub mod orchestrator;
pub mod projection;
mod renderer;
pub mod scale;
pub mod scene;
mod spatial;
pub mod svg;

pub use interaction::{HoverController, HoverState, TooltipPosition};
pub use join::{join, Match};
pub use layout::{container_width, LayoutObserver};
pub use legend::{build_legend, LegendAnchor, LegendCell, LegendSpec};
pub use orchestrator::{ChoroplethMap, Phase};
pub use projection::{FeaturePath, MercatorProjection, PathCommand, PathGenerator, ViewportDimensions};
pub use renderer::{MapLayers, MapRenderer, SurfaceTransform};
pub use scale::{ColorRamp, ColorScale, Gradient, InterpolationSpace, Rgb};
pub use scene::{render_scene, Scene, Shape};
