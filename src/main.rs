mod app;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui_choropleth::config::{DEFAULT_GEOMETRY_PATH, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, LEGEND_CELLS};
use tui_choropleth::data::geometry::load_countries;
use tui_choropleth::data::{load_dataset, spawn_load, FilterCriteria, StatRow};
use tui_choropleth::map::svg::write_svg;
use tui_choropleth::map::{ChoroplethMap, Gradient, InterpolationSpace, ViewportDimensions};
use tui_choropleth::{ExportError, MapConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Choropleth world map of per-country statistics")]
struct Args {
    /// Country boundaries (GeoJSON FeatureCollection)
    #[arg(long, default_value = DEFAULT_GEOMETRY_PATH)]
    geometry: PathBuf,

    /// Statistics table (JSON array of rows)
    #[arg(long)]
    data: Option<PathBuf>,

    #[arg(long, default_value = "")]
    perspective: String,

    #[arg(long, default_value = "")]
    measure: String,

    #[arg(long, default_value = "")]
    approach: String,

    /// Variable to show, or "Both" for every variable
    #[arg(long, default_value = "")]
    variable: String,

    #[arg(long, default_value = "yellow-purple")]
    gradient: Gradient,

    /// Color space for the gradient: rgb or lab
    #[arg(long, default_value = "rgb")]
    interpolation: InterpolationSpace,

    #[arg(long, default_value_t = LEGEND_CELLS)]
    legend_cells: usize,

    /// Surface height in map units
    #[arg(long, default_value_t = DEFAULT_MAP_HEIGHT)]
    height: f64,

    #[arg(long, default_value = "tui-choropleth.log")]
    log_file: PathBuf,

    /// Render once to an SVG file and exit
    #[arg(long)]
    export_svg: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_MAP_WIDTH)]
    svg_width: f64,
}

impl Args {
    fn map_config(&self) -> MapConfig {
        let mut config = MapConfig {
            height: self.height,
            gradient: self.gradient,
            interpolation: self.interpolation,
            ..MapConfig::default()
        };
        config.legend.cells = self.legend_cells;
        config
    }

    fn filters(&self) -> FilterCriteria {
        FilterCriteria::new(
            self.perspective.as_str(),
            self.measure.as_str(),
            self.approach.as_str(),
            self.variable.as_str(),
        )
    }

    fn dataset(&self) -> Result<Option<Vec<StatRow>>> {
        self.data
            .as_deref()
            .map(|path| load_dataset(path).with_context(|| format!("loading {}", path.display())))
            .transpose()
    }
}

/// Log to a file so output does not fight the terminal UI
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    if let Some(out) = &args.export_svg {
        return export(&args, out);
    }

    let rows = args.dataset()?;
    let mut session = TerminalSession::start()?;
    run(&mut session.terminal, &args, rows)
}

/// Render a single frame to SVG without starting the terminal UI
fn export(args: &Args, out: &Path) -> Result<()> {
    let mut map = ChoroplethMap::new(args.map_config());
    map.geometry_loaded(load_countries(&args.geometry));
    if let Some(rows) = args.dataset()? {
        map.set_data(rows.into());
    }
    map.set_filters(args.filters());
    map.set_viewport(ViewportDimensions::new(args.svg_width, args.height));

    let scene = map
        .scene()
        .ok_or(ExportError::NotRendered("data or filters are incomplete"))?;
    write_svg(scene, out)?;
    info!("Exported {} countries to {}", scene.shapes.len(), out.display());
    Ok(())
}

/// Raw mode and mouse capture for the lifetime of the UI
struct TerminalSession {
    terminal: DefaultTerminal,
}

impl TerminalSession {
    fn start() -> Result<Self> {
        let mut session = Self {
            terminal: ratatui::init(),
        };
        session.terminal.clear()?;
        execute!(std::io::stdout(), EnableMouseCapture)?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        ratatui::restore();
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => app.mouse_moved(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, args: &Args, rows: Option<Vec<StatRow>>) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(args.map_config(), size.width, size.height);

    // Geometry arrives in the background; data and filters are already known
    let mut geometry = spawn_load(args.geometry.clone());
    if let Some(rows) = rows {
        app.set_data(rows);
    }
    app.set_filters(args.filters());

    loop {
        if let Some(result) = geometry.poll() {
            app.map.geometry_loaded(result);
        }

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                            KeyCode::Char('p') => app.cycle_perspective(),
                            KeyCode::Char('m') => app.cycle_measure(),
                            KeyCode::Char('a') => app.cycle_approach(),
                            KeyCode::Char('v') => app.cycle_variable(),
                            KeyCode::Char('g') => app.cycle_gradient(),
                            KeyCode::Char('t') => app.toggle_table(),
                            KeyCode::Char('o') => app.cycle_sort_key(),
                            KeyCode::Char('O') => app.flip_sort(),
                            KeyCode::Char('y') => app.cycle_year(),
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    // A load still in flight is discarded when its receiver drops
    app.shutdown();
    drop(geometry);
    Ok(())
}
