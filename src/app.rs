use crate::ui;
use glam::DVec2;
use ratatui::layout::Rect;
use std::sync::Arc;
use tui_choropleth::config::BOTH_VARIABLES;
use tui_choropleth::data::table::{
    find_country, SortConfig, SortDirection, SortKey, TableFilters, YearFilter,
};
use tui_choropleth::data::{distinct, FilterCriteria, StatRow};
use tui_choropleth::map::{
    container_width, ChoroplethMap, LayoutObserver, SurfaceTransform, TooltipPosition,
};
use tui_choropleth::MapConfig;

/// Values offered for each filter, taken from the dataset
#[derive(Default)]
pub struct FilterOptions {
    pub perspectives: Vec<String>,
    pub measures: Vec<String>,
    pub approaches: Vec<String>,
    /// `"Both"` first, then each variable
    pub variables: Vec<String>,
    pub regions: Vec<String>,
    pub years: Vec<String>,
}

impl FilterOptions {
    pub fn from_rows(rows: &[StatRow]) -> Self {
        let mut variables = vec![BOTH_VARIABLES.to_string()];
        variables.extend(distinct(rows, |r| &r.variable));
        Self {
            perspectives: distinct(rows, |r| &r.perspective),
            measures: distinct(rows, |r| &r.measure),
            approaches: distinct(rows, |r| &r.approach),
            variables,
            regions: distinct(rows, |r| &r.region),
            years: distinct(rows, |r| &r.year),
        }
    }
}

/// Next option after `current`, wrapping; the first when `current` is unset
fn cycle(options: &[String], current: &str) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let next = options
        .iter()
        .position(|o| o == current)
        .map_or(0, |i| (i + 1) % options.len());
    Some(options[next].clone())
}

/// One country looked up for the detail line of the table panel
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDetail {
    pub country_code: String,
    pub year: String,
    /// `None` when the dataset has no row for this country and year
    pub row: Option<StatRow>,
}

/// Application state
pub struct App {
    pub map: ChoroplethMap,
    layout: LayoutObserver,
    pub options: FilterOptions,
    pub show_table: bool,
    pub sort: SortConfig,
    /// Year used for the hovered-country lookup; empty until chosen
    pub detail_year: String,
    pub detail: Option<CountryDetail>,
    pub should_quit: bool,
    /// Current mouse position (terminal column/row)
    pub mouse_pos: Option<(u16, u16)>,
    /// Pointer in surface coordinates while it is over the map
    pub pointer_surface: Option<DVec2>,
    /// Terminal size last seen
    screen: Rect,
}

impl App {
    pub fn new(config: MapConfig, width: u16, height: u16) -> Self {
        let layout = LayoutObserver::new(config.height);
        let mut app = Self {
            map: ChoroplethMap::new(config),
            layout,
            options: FilterOptions::default(),
            show_table: false,
            sort: SortConfig::default(),
            detail_year: String::new(),
            detail: None,
            should_quit: false,
            mouse_pos: None,
            pointer_surface: None,
            screen: Rect::new(0, 0, width, height),
        };
        app.relayout();
        app
    }

    pub fn set_data(&mut self, rows: Vec<StatRow>) {
        self.options = FilterOptions::from_rows(&rows);
        self.map.set_data(Arc::from(rows));
    }

    pub fn set_filters(&mut self, filters: FilterCriteria) {
        self.map.set_filters(filters);
        self.refresh_detail();
    }

    /// Update layout when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        self.relayout();
    }

    /// Inner map panel for the current terminal size
    pub fn map_panel(&self) -> Rect {
        ui::panels(self.screen, self.show_table).map_inner
    }

    /// Measure the map container and feed the layout observer
    fn relayout(&mut self) {
        let inner = self.map_panel();
        let width = container_width(
            inner.width as usize * 2,
            inner.height as usize * 4,
            self.map.config().height,
        );
        if let Some(viewport) = self.layout.observe(width) {
            self.map.set_viewport(viewport);
            self.refresh_detail();
        }
    }

    pub fn cycle_perspective(&mut self) {
        let mut filters = self.map.filters().clone();
        if let Some(next) = cycle(&self.options.perspectives, &filters.perspective) {
            filters.perspective = next;
            self.set_filters(filters);
        }
    }

    pub fn cycle_measure(&mut self) {
        let mut filters = self.map.filters().clone();
        if let Some(next) = cycle(&self.options.measures, &filters.measure) {
            filters.measure = next;
            self.set_filters(filters);
        }
    }

    pub fn cycle_approach(&mut self) {
        let mut filters = self.map.filters().clone();
        if let Some(next) = cycle(&self.options.approaches, &filters.approach) {
            filters.approach = next;
            self.set_filters(filters);
        }
    }

    pub fn cycle_variable(&mut self) {
        let mut filters = self.map.filters().clone();
        if let Some(next) = cycle(&self.options.variables, &filters.variable) {
            filters.variable = next;
            self.set_filters(filters);
        }
    }

    pub fn cycle_gradient(&mut self) {
        let next = self.map.config().gradient.next();
        self.map.set_gradient(next);
        self.refresh_detail();
    }

    /// Show or hide the table; the map panel changes width either way
    pub fn toggle_table(&mut self) {
        self.show_table = !self.show_table;
        self.map.pointer_left();
        self.refresh_detail();
        self.relayout();
    }

    /// Sort by the next column key
    pub fn cycle_sort_key(&mut self) {
        let key = self.sort.key.map_or(SortKey::Name, SortKey::next);
        self.sort = SortConfig {
            key: Some(key),
            direction: SortDirection::Ascending,
        };
    }

    /// Flip direction of the current sort key
    pub fn flip_sort(&mut self) {
        let key = self.sort.key.unwrap_or(SortKey::Name);
        self.sort = self.sort.select(key);
    }

    /// Cycle the year of the country lookup
    pub fn cycle_year(&mut self) {
        if let Some(next) = cycle(&self.options.years, &self.detail_year) {
            self.detail_year = next;
            self.refresh_detail();
        }
    }

    /// Look up the hovered country when it or the year changed
    fn refresh_detail(&mut self) {
        let hovered = self
            .map
            .scene()
            .zip(self.map.hovered_shape())
            .and_then(|(scene, idx)| scene.shapes.get(idx))
            .map(|shape| shape.iso_a3.clone());

        let (Some(country_code), false) = (hovered, self.detail_year.is_empty()) else {
            self.detail = None;
            return;
        };
        if let Some(detail) = &self.detail {
            if detail.country_code == country_code && detail.year == self.detail_year {
                return;
            }
        }
        let row = self
            .map
            .data()
            .and_then(|data| find_country(data, &country_code, &self.detail_year))
            .cloned();
        self.detail = Some(CountryDetail {
            country_code,
            year: self.detail_year.clone(),
            row,
        });
    }

    /// Filters for the table panel; `None` until measure and approach are set
    pub fn table_filters(&self) -> Option<TableFilters> {
        let filters = self.map.filters();
        if filters.measure.is_empty() || filters.approach.is_empty() {
            return None;
        }
        Some(TableFilters {
            measure: filters.measure.clone(),
            approach: filters.approach.clone(),
            year: YearFilter::Latest,
            regions: self.options.regions.clone(),
        })
    }

    /// Track the mouse and drive hover
    pub fn mouse_moved(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        let inner = self.map_panel();
        let inside = col >= inner.x
            && col < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;

        let transform = SurfaceTransform::for_panel(inner.height as usize, self.map.viewport().height);
        let surface = if inside {
            transform.cell_to_surface(col - inner.x, row - inner.y)
        } else {
            None
        };

        self.pointer_surface = surface;
        match surface {
            Some(point) => self.map.pointer_moved(
                point,
                TooltipPosition {
                    x: col as f64,
                    y: row as f64,
                },
            ),
            None => self.map.pointer_left(),
        }
        self.refresh_detail();
    }

    /// Pointer position as lon/lat, when over the map
    pub fn pointer_lonlat(&self) -> Option<DVec2> {
        let scene = self.map.scene()?;
        scene.projection.invert(self.pointer_surface?)
    }

    /// Release the layout subscription
    pub fn shutdown(&mut self) {
        self.layout.disconnect();
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
