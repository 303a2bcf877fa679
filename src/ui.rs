use crate::app::{App, CountryDetail};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Widget},
    Frame,
};
use tui_choropleth::data::table::{filter_general, SortDirection, SortKey};
use tui_choropleth::map::{MapLayers, MapRenderer, Rgb};

const TABLE_WIDTH: u16 = 56;

/// Screen regions for one frame
pub struct Panels {
    pub map: Rect,
    pub map_inner: Rect,
    pub table: Option<Rect>,
    pub status: Rect,
}

fn map_block<'a>() -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " World Map ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Split the screen into map, optional table, and status bar
pub fn panels(area: Rect, show_table: bool) -> Panels {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map (and table)
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let (map, table) = if show_table {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(TABLE_WIDTH)])
            .split(chunks[0]);
        (columns[0], Some(columns[1]))
    } else {
        (chunks[0], None)
    };

    Panels {
        map,
        map_inner: map_block().inner(map),
        table,
        status: chunks[1],
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let panels = panels(frame.area(), app.show_table);

    render_map(frame, app, panels.map);
    if let Some(area) = panels.table {
        if let Some(detail) = &app.detail {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(area);
            render_table(frame, app, rows[0]);
            render_detail(frame, detail, rows[1]);
        } else {
            render_table(frame, app, area);
        }
    }
    render_status_bar(frame, app, panels.status);
    render_tooltip(frame, app);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = map_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.map.is_loading() {
        render_centered(frame, inner, "Loading data...", Color::Yellow);
        return;
    }

    let Some(scene) = app.map.scene() else {
        render_centered(
            frame,
            inner,
            "Choose a perspective, measure, approach and variable (p/m/a/v)",
            Color::DarkGray,
        );
        return;
    };

    let layers = MapRenderer::render(
        scene,
        inner.width as usize,
        inner.height as usize,
        app.map.hovered_shape(),
    );
    let map_widget = MapWidget {
        layers,
        stroke: to_color(scene.stroke),
    };
    frame.render_widget(map_widget, inner);
}

fn render_centered(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    if area.height == 0 {
        return;
    }
    let line = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(color))).alignment(Alignment::Center);
    frame.render_widget(paragraph, line);
}

/// Custom widget that composes fills, outlines and legend labels
struct MapWidget {
    layers: MapLayers,
    stroke: Color,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width as usize).min(self.layers.fills.width());
        let height = (area.height as usize).min(self.layers.fills.height() / 2);

        for cy in 0..height {
            for cx in 0..width {
                let cell = &mut buf[(area.x + cx as u16, area.y + cy as u16)];

                // Fills: upper half block, foreground = top pixel, background = bottom
                let (top, bottom) = self.layers.fills.cell(cx, cy);
                match (top, bottom) {
                    (Some(t), Some(b)) => {
                        cell.set_char('▀').set_fg(to_color(t)).set_bg(to_color(b));
                    }
                    (Some(t), None) => {
                        cell.set_char('▀').set_fg(to_color(t));
                    }
                    (None, Some(b)) => {
                        cell.set_char('▄').set_fg(to_color(b));
                    }
                    (None, None) => {}
                }

                // Outlines sit on top of the fill, keeping its color as background
                if let Some(ch) = self.layers.highlight.glyph(cx, cy) {
                    let bg = top.or(bottom).map_or(Color::Reset, to_color);
                    cell.set_char(ch).set_fg(Color::White).set_bg(bg);
                } else if let Some(ch) = self.layers.strokes.glyph(cx, cy) {
                    let bg = top.or(bottom).map_or(Color::Reset, to_color);
                    cell.set_char(ch).set_fg(self.stroke).set_bg(bg);
                }
            }
        }

        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let x = area.x + *lx;
            let y = area.y + *ly;
            let max_len = area.width.saturating_sub(*lx) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(x + i as u16, y)].set_char(ch).set_style(label_style);
            }
        }
    }
}

/// Tooltip box next to where the pointer entered the country
fn render_tooltip(frame: &mut Frame, app: &App) {
    let hover = app.map.hover();
    let Some(text) = hover.content.as_deref() else {
        return;
    };
    let screen = frame.area();
    let width = (text.chars().count() as u16 + 2).min(screen.width);
    let height = 3.min(screen.height);

    let mut x = hover.position.x as u16 + 2;
    let mut y = hover.position.y as u16 + 1;
    if x + width > screen.right() {
        x = screen.right().saturating_sub(width);
    }
    if y + height > screen.bottom() {
        y = (hover.position.y as u16).saturating_sub(height);
    }
    let area = Rect::new(x, y, width, height);

    let tooltip = Paragraph::new(Span::styled(text, Style::default().fg(Color::White))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(tooltip, area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Latest values ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let (Some(filters), Some(data)) = (app.table_filters(), app.map.data()) else {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_centered(frame, inner, "Select a measure and approach", Color::DarkGray);
        return;
    };

    let rows = filter_general(data, &filters, app.sort);
    let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let header = Row::new(SortKey::ALL.iter().map(|&key| {
        let marker = match (app.sort.key, app.sort.direction) {
            (Some(k), SortDirection::Ascending) if k == key => " ▲",
            (Some(k), SortDirection::Descending) if k == key => " ▼",
            _ => "",
        };
        Cell::from(format!("{}{}", key.label(), marker))
    }))
    .style(header_style);

    let visible = area.height.saturating_sub(3) as usize;
    let body = rows.iter().take(visible).map(|row| {
        Row::new(vec![
            Cell::from(row.name.clone()),
            Cell::from(row.year.clone()),
            Cell::from(row.region.clone()),
            Cell::from(row.variable.clone()),
            Cell::from(format!("{:.2}", row.value)),
        ])
    });

    let table = Table::new(
        body,
        [
            Constraint::Min(12),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

/// Hovered country in the chosen year
fn render_detail(frame: &mut Frame, detail: &CountryDetail, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let spans = match &detail.row {
        Some(row) => vec![
            Span::styled(format!(" {} {} ", row.name, detail.year), Style::default().fg(Color::Cyan)),
            Span::styled(format!("{} {} ", row.region, row.variable), label),
            Span::styled(format!("{:.2}", row.value), Style::default().fg(Color::Yellow)),
        ],
        None => vec![Span::styled(
            format!(" No data for {} in {}", detail.country_code, detail.year),
            label,
        )],
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filters = app.map.filters();
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Yellow);
    let unset = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    let mut spans = vec![
        Span::styled(" [p]", label),
        Span::styled(unset(&filters.perspective), value),
        Span::styled(" [m]", label),
        Span::styled(unset(&filters.measure), value),
        Span::styled(" [a]", label),
        Span::styled(unset(&filters.approach), value),
        Span::styled(" [v]", label),
        Span::styled(unset(&filters.variable), value),
        Span::styled(" [g]", label),
        Span::styled(app.map.config().gradient.name(), Style::default().fg(Color::Magenta)),
    ];

    if let Some(scene) = app.map.scene() {
        spans.push(Span::styled(" | ", label));
        spans.push(Span::styled(
            format!("{} rows", scene.matched_rows),
            Style::default().fg(Color::Green),
        ));
    }
    if let Some(lonlat) = app.pointer_lonlat() {
        spans.push(Span::styled(" | ", label));
        spans.push(Span::styled(
            format!("{:.2}°, {:.2}°", lonlat.y, lonlat.x),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::styled(" | t:table o/O:sort y:year q:quit", label));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
