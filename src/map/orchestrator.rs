use crate::config::{MapConfig, DEFAULT_MAP_WIDTH};
use crate::data::{FilterCriteria, GeoFeature, GeometryCache, StatRow};
use crate::error::GeometryError;
use crate::map::interaction::{HoverController, HoverState, TooltipPosition};
use crate::map::projection::ViewportDimensions;
use crate::map::scale::Gradient;
use crate::map::scene::{render_scene, Scene};
use glam::DVec2;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Geometry not loaded yet; the loading indicator is shown
    AwaitingGeometry,
    /// Geometry present but data or filters incomplete; nothing drawn
    AwaitingInputs,
    Rendered,
}

/// Owns the map's inputs and redraws the whole scene whenever one changes
pub struct ChoroplethMap {
    config: MapConfig,
    phase: Phase,
    geometry: Option<GeometryCache>,
    data: Option<Arc<[StatRow]>>,
    filters: FilterCriteria,
    viewport: ViewportDimensions,
    scene: Option<Scene>,
    generation: u64,
    hover: HoverController,
}

impl ChoroplethMap {
    pub fn new(config: MapConfig) -> Self {
        let viewport = ViewportDimensions::new(DEFAULT_MAP_WIDTH, config.height);
        Self {
            config,
            phase: Phase::AwaitingGeometry,
            geometry: None,
            data: None,
            filters: FilterCriteria::default(),
            viewport,
            scene: None,
            generation: 0,
            hover: HoverController::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::AwaitingGeometry
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hover(&self) -> &HoverState {
        self.hover.state()
    }

    pub fn hovered_shape(&self) -> Option<usize> {
        self.hover.hovered()
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn data(&self) -> Option<&[StatRow]> {
        self.data.as_deref()
    }

    pub fn viewport(&self) -> ViewportDimensions {
        self.viewport
    }

    pub fn geometry(&self) -> Option<&GeometryCache> {
        self.geometry.as_ref()
    }

    /// Deliver the one-time geometry load. A failure leaves an empty
    /// feature set; later deliveries are ignored.
    pub fn geometry_loaded(&mut self, result: Result<Vec<GeoFeature>, GeometryError>) {
        if self.geometry.is_some() {
            warn!("geometry already loaded; ignoring second delivery");
            return;
        }
        let cache = match result {
            Ok(features) => GeometryCache::from_features(features),
            Err(e) => {
                error!("Error loading the GeoJSON file: {}", e);
                GeometryCache::empty()
            }
        };
        self.geometry = Some(cache);
        self.phase = Phase::AwaitingInputs;
        self.refresh();
    }

    pub fn set_data(&mut self, data: Arc<[StatRow]>) {
        self.data = Some(data);
        self.refresh();
    }

    pub fn set_filters(&mut self, filters: FilterCriteria) {
        self.filters = filters;
        self.refresh();
    }

    pub fn set_viewport(&mut self, viewport: ViewportDimensions) {
        self.viewport = viewport;
        self.refresh();
    }

    pub fn set_gradient(&mut self, gradient: Gradient) {
        self.config.gradient = gradient;
        self.refresh();
    }

    /// Pointer moved over the map; `surface` in scene coordinates
    pub fn pointer_moved(&mut self, surface: DVec2, screen: TooltipPosition) {
        match &self.scene {
            Some(scene) => self.hover.pointer_moved(scene, surface, screen),
            None => self.hover.pointer_leave(),
        }
    }

    pub fn pointer_left(&mut self) {
        self.hover.pointer_leave();
    }

    /// Re-evaluate inputs and redraw from scratch when they are complete.
    fn refresh(&mut self) {
        let Some(geometry) = &self.geometry else {
            self.phase = Phase::AwaitingGeometry;
            return;
        };

        // Whatever happens next, the previous shapes and their hover state go
        self.scene = None;
        self.generation += 1;
        self.hover.rebind(self.generation);

        let data = match &self.data {
            Some(data) if self.filters.is_complete() => data,
            _ => {
                info!("Data or filters are incomplete.");
                self.phase = Phase::AwaitingInputs;
                return;
            }
        };

        self.scene = Some(render_scene(
            geometry.features(),
            data,
            &self.filters,
            self.viewport,
            &self.config,
        ));
        self.phase = Phase::Rendered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NO_DATA_FILL;
    use crate::data::geometry::square;
    use crate::data::stats::row;

    fn features() -> Vec<GeoFeature> {
        vec![
            square("USA", "United States of America", -120.0, 25.0, 40.0),
            square("FRA", "France", 0.0, 42.0, 8.0),
            square("ATA", "Antarctica", -180.0, -85.0, 20.0),
        ]
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria::new("P", "M", "A", "V")
    }

    fn data(rows: Vec<StatRow>) -> Arc<[StatRow]> {
        rows.into()
    }

    #[test]
    fn test_starts_loading() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        assert!(map.is_loading());
        map.set_data(data(vec![row("USA", 10.0)]));
        map.set_filters(criteria());
        assert_eq!(map.phase(), Phase::AwaitingGeometry);
        assert!(map.scene().is_none());
    }

    #[test]
    fn test_geometry_arrival_renders_when_inputs_ready() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        map.set_data(data(vec![row("USA", 10.0)]));
        map.set_filters(criteria());
        map.geometry_loaded(Ok(features()));

        assert_eq!(map.phase(), Phase::Rendered);
        let scene = map.scene().unwrap();
        assert_eq!(scene.shapes.len(), 2);
        assert!(scene.shapes.iter().all(|s| s.name != "Antarctica"));
        assert_eq!(scene.shapes[0].fill, scene.scale.color(10.0));
        assert_eq!(scene.shapes[1].fill, NO_DATA_FILL);
    }

    #[test]
    fn test_incomplete_filters_wait_then_recover() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        map.geometry_loaded(Ok(features()));
        map.set_data(data(vec![row("USA", 10.0)]));
        assert_eq!(map.phase(), Phase::AwaitingInputs);

        let mut partial = criteria();
        partial.measure.clear();
        map.set_filters(partial);
        assert_eq!(map.phase(), Phase::AwaitingInputs);
        assert!(map.scene().is_none());

        map.set_filters(criteria());
        assert_eq!(map.phase(), Phase::Rendered);
    }

    #[test]
    fn test_geometry_failure_degrades_to_empty_map() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        map.set_data(data(vec![row("USA", 10.0)]));
        map.set_filters(criteria());
        map.geometry_loaded(Err(GeometryError::Disconnected));

        assert!(!map.is_loading());
        assert_eq!(map.phase(), Phase::Rendered);
        assert!(map.scene().unwrap().shapes.is_empty());
    }

    #[test]
    fn test_second_geometry_delivery_ignored() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        map.geometry_loaded(Ok(features()));
        map.geometry_loaded(Ok(Vec::new()));
        assert_eq!(map.geometry().unwrap().len(), 2);
    }

    #[test]
    fn test_redraw_clears_hover() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        map.geometry_loaded(Ok(features()));
        map.set_data(data(vec![row("USA", 10.0)]));
        map.set_filters(criteria());

        let usa = map.scene().unwrap().projection.project(DVec2::new(-100.0, 40.0));
        map.pointer_moved(usa, TooltipPosition { x: 5.0, y: 5.0 });
        assert_eq!(
            map.hover().content.as_deref(),
            Some("United States of America: 10")
        );

        let before = map.generation();
        map.set_viewport(ViewportDimensions::new(500.0, 600.0));
        assert!(map.generation() > before);
        assert!(map.hover().content.is_none());
    }

    #[test]
    fn test_identical_inputs_redraw_identically() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        map.geometry_loaded(Ok(features()));
        map.set_data(data(vec![row("USA", 10.0), row("FRA", 2.0)]));
        map.set_filters(criteria());
        let first = map.scene().cloned();
        map.set_filters(criteria());
        assert_eq!(map.scene().cloned(), first);
    }

    #[test]
    fn test_gradient_change_recolors() {
        let mut map = ChoroplethMap::new(MapConfig::default());
        map.geometry_loaded(Ok(features()));
        map.set_data(data(vec![row("USA", 10.0), row("FRA", 2.0)]));
        map.set_filters(criteria());
        let before = map.scene().unwrap().shapes[0].fill;
        map.set_gradient(Gradient::Blues);
        assert_ne!(map.scene().unwrap().shapes[0].fill, before);
    }
}
