//! TUI rendering for the locate TUI
//!
//! The map canvas fills the left side; the right side stacks the search box,
//! the candidate list, the quick links and a status panel. Rendering only
//! reads state: the selected marker and the quick-link highlight both come
//! from the selection store.

use crate::api::GeocodeProvider;
use crate::app::{App, Focus};
use crate::map::{GeolocationStatus, MapSurface, Marker, MarkerKind};
use crate::sync::SessionPhase;
use ratatui::{
    prelude::*,
    widgets::{canvas::*, *}, // Imports Map, MapResolution, Canvas, etc.
};

use ratatui::text::Line;

const MARKER_LABEL_WIDTH: usize = 32;

/// Renders one frame of the TUI based on current application state.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current application state.
pub fn render<P: GeocodeProvider>(f: &mut Frame, app: &App<P>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(f.size());

    render_map(f, app, chunks[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Min(6),
            Constraint::Length(6),
        ])
        .split(chunks[1]);

    render_search_box(f, app, side[0]);
    render_candidates(f, app, side[1]);
    render_quick_links(f, app, side[2]);
    render_status(f, app, side[3]);
}

/// Map canvas: coastline outline plus the controller's markers.
fn render_map<P: GeocodeProvider>(f: &mut Frame, app: &App<P>, area: Rect) {
    let map = app.search.map();
    let surface = map.surface();
    let (x_bounds, y_bounds) = surface.bounds();
    let center = surface.center();
    let markers = map.markers();

    let title = format!(
        " Map  z{:.0}  {:.4}, {:.4} ",
        surface.zoom(),
        center.lat,
        center.lng
    );

    let canvas = Canvas::default()
        .block(Block::bordered().title(title).border_type(BorderType::Rounded))
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(50, 50, 50),
                resolution: MapResolution::High,
            });
            ctx.layer();

            for marker in &markers {
                ctx.print(marker.position.lng, marker.position.lat, marker_line(marker));
            }
        });

    f.render_widget(canvas, area);
}

fn marker_line(marker: &Marker) -> Line<'static> {
    let (glyph, color) = match marker.kind {
        MarkerKind::LivePosition => (" ◉ ", Color::Cyan),
        MarkerKind::Selected => (" ⌖ ", Color::Yellow),
        MarkerKind::Preview => (" ○ ", Color::Magenta),
    };
    Line::from(vec![
        Span::styled(glyph, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            truncate(&marker.label, MARKER_LABEL_WIDTH),
            Style::default().fg(Color::Black).bg(color),
        ),
    ])
}

fn render_search_box<P: GeocodeProvider>(f: &mut Frame, app: &App<P>, area: Rect) {
    let focused = app.focus == Focus::Search;
    let caret = if focused && app.tick_count % 6 < 3 { "▏" } else { " " };

    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.search.input().to_string()),
        Span::styled(caret, Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .title(" Search your favorite location ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(focus_style(focused)),
    );
    f.render_widget(input, area);
}

fn render_candidates<P: GeocodeProvider>(f: &mut Frame, app: &App<P>, area: Rect) {
    let title = match app.search.phase() {
        SessionPhase::Pending => " Results (searching…) ".to_string(),
        _ => format!(" Results ({}) ", app.search.candidates().len()),
    };

    let items: Vec<ListItem> = app
        .search
        .candidates()
        .iter()
        .map(|c| ListItem::new(c.label.clone()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(focus_style(app.focus == Focus::Search)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .bg(Color::Rgb(30, 30, 60))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.search.highlighted());
    f.render_stateful_widget(list, area, &mut state);
}

fn render_quick_links<P: GeocodeProvider>(f: &mut Frame, app: &App<P>, area: Rect) {
    let focused = app.focus == Focus::QuickLinks;
    let current = app.selected_quick_link();

    let items: Vec<ListItem> = app
        .quick_links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let name_style = if Some(i) == current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    link.display_name.clone().unwrap_or_default(),
                    name_style,
                )),
                Line::from(Span::styled(
                    format!("Type: {}", link.type_label()),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let title = if app.quick_links_loaded {
        " Quick Links "
    } else {
        " Quick Links (loading…) "
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(focus_style(focused)),
        )
        .highlight_style(Style::default().bg(Color::Rgb(30, 30, 60)))
        .highlight_symbol("> ");

    let selected = (focused && !app.quick_links.is_empty()).then_some(app.quick_link_index);
    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
}

/// Current selection, live-position state and the last message.
fn render_status<P: GeocodeProvider>(f: &mut Frame, app: &App<P>, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let selection = match app.search.store().get() {
        Some(loc) => {
            let id = loc.place_id().map(|id| format!(" #{}", id)).unwrap_or_default();
            format!("{}{}", loc.label, id)
        }
        None => "none".to_string(),
    };

    let (gps_text, gps_color) = match app.search.map().geolocation() {
        GeolocationStatus::Pending => ("locating…".to_string(), Color::DarkGray),
        GeolocationStatus::Found => ("found".to_string(), Color::Green),
        GeolocationStatus::Unavailable(_) => ("unavailable".to_string(), Color::Red),
    };

    let last_lookup = app
        .search
        .last_lookup()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let lines = vec![
        Line::from(vec![Span::styled(" CURRENT: ", bold), Span::raw(selection)]),
        Line::from(vec![
            Span::styled(" LIVE: ", bold),
            Span::styled(gps_text, Style::default().fg(gps_color)),
            Span::raw("  │  "),
            Span::styled("LOOKUP: ", bold),
            Span::raw(last_lookup),
        ]),
        Line::from(Span::styled(
            format!(" {}", app.status.as_deref().unwrap_or("")),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            " Tab focus  ↑/↓ move  Enter select  PgUp/PgDn zoom  Ctrl-C quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(p, area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return format!(" {} ", text);
    }
    let head: String = text.chars().take(max.saturating_sub(1)).collect();
    format!(" {}… ", head)
}
