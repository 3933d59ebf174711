//! Vehicle tracker page rendering
//!
//! Renders the active filters, summary counts, status and route breakdowns, a
//! map of located vehicles and the vehicle table.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Cell, Paragraph, Row, Table,
    },
    Frame,
};

use crate::app::{App, InputMode};
use crate::data::{LocationBounds, Vehicle, VehicleSummary, VehicleType};
use crate::ui::{bar_line, render_placeholder, section_block};

/// Colour for a status string: delays red, early yellow, on time green
fn status_color(status: &str) -> Color {
    let status = status.to_lowercase();
    if status.contains("delay") {
        Color::Red
    } else if status.contains("early") {
        Color::Yellow
    } else if status.contains("on time") {
        Color::Green
    } else {
        Color::Reset
    }
}

/// Degrees of padding around the plotted vehicles
const MAP_PADDING: f64 = 0.05;

fn type_color(kind: VehicleType) -> Color {
    match kind {
        VehicleType::Train => Color::Cyan,
        VehicleType::Bus => Color::Yellow,
        VehicleType::Other => Color::Gray,
    }
}

/// Map extent covering every point, or the default area when there are none
///
/// Points are `(longitude, latitude)`.
fn map_bounds(points: &[(f64, f64)]) -> LocationBounds {
    if points.is_empty() {
        return LocationBounds::default();
    }

    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for (lon, lat) in points {
        min_lon = min_lon.min(*lon);
        max_lon = max_lon.max(*lon);
        min_lat = min_lat.min(*lat);
        max_lat = max_lat.max(*lat);
    }

    LocationBounds {
        min_lat: min_lat - MAP_PADDING,
        max_lat: max_lat + MAP_PADDING,
        min_lon: min_lon - MAP_PADDING,
        max_lon: max_lon + MAP_PADDING,
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let section = &app.dashboard.vehicles;
    if render_placeholder(frame, area, "Vehicles", section) {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Percentage(35),
        ])
        .split(area);

    render_filters(frame, app, chunks[0]);

    let vehicles = app.filtered_vehicles();
    let Some(summary) = app.vehicle_summary() else {
        return;
    };
    render_summary(frame, &summary, chunks[1]);

    if vehicles.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No vehicles match the current filters (press c to clear)",
            Style::default().fg(Color::DarkGray),
        ))
        .block(section_block("Vehicles", section));
        frame.render_widget(empty, chunks[2]);
        return;
    }

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    render_breakdowns(frame, &summary, middle[0]);
    render_map(frame, &vehicles, middle[1]);

    render_table(frame, app, &vehicles, chunks[3]);
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let filter = &app.vehicle_filter;
    let toggle = |name: &'static str, on: bool| {
        let style = if on {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!("[{}] {}  ", if on { "x" } else { " " }, name), style)
    };

    let search = match &app.input {
        InputMode::Search { field, buffer } => Span::styled(
            format!("{}: {}_", field.label(), buffer),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        InputMode::Normal => Span::raw(filter.mode.label()),
    };

    let line = Line::from(vec![
        toggle("Trains", filter.include_trains),
        toggle("Buses", filter.include_buses),
        toggle("Moving only", filter.moving_only),
        Span::styled("│ ", Style::default().fg(Color::DarkGray)),
        search,
        Span::styled("  │ ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.vehicle_sort.label()),
    ]);

    let block = Block::default().borders(Borders::ALL).title(" Filters ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_summary(frame: &mut Frame, summary: &VehicleSummary, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let pairs = [
        ("Found", summary.found),
        ("Filtered out", summary.filtered_out),
        ("Trains", summary.trains),
        ("Buses", summary.buses),
        ("Moving", summary.moving),
        ("On time", summary.on_time),
    ];
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (name, count) in pairs {
        spans.push(Span::styled(format!("{} ", name), label));
        spans.push(Span::styled(format!("{}   ", count), value));
    }

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_breakdowns(frame: &mut Frame, summary: &VehicleSummary, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Breakdown ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = (inner.width as usize).saturating_sub(20);
    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };

    let mut lines = vec![heading("Status")];
    let max = summary.status_counts.first().map(|(_, n)| *n).unwrap_or(0);
    for (status, count) in &summary.status_counts {
        lines.push(bar_line(status, *count, max, width, Color::Green));
    }

    lines.push(Line::from(""));
    lines.push(heading("Top routes"));
    let max = summary.top_routes.first().map(|(_, n)| *n).unwrap_or(0);
    for (route, count) in &summary.top_routes {
        lines.push(bar_line(route, *count, max, width, Color::Cyan));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_map(frame: &mut Frame, vehicles: &[&Vehicle], area: Rect) {
    let located: Vec<&&Vehicle> = vehicles.iter().filter(|v| v.has_location()).collect();
    let points_for = |kind: VehicleType| -> Vec<(f64, f64)> {
        located
            .iter()
            .filter(|v| v.vehicle_type() == kind)
            .map(|v| (v.longitude, v.latitude))
            .collect()
    };
    let trains = points_for(VehicleType::Train);
    let buses = points_for(VehicleType::Bus);
    let others = points_for(VehicleType::Other);

    let all: Vec<(f64, f64)> = located.iter().map(|v| (v.longitude, v.latitude)).collect();
    let bounds = map_bounds(&all);

    let title = format!(" Map ({} located) ", located.len());
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds([bounds.min_lon, bounds.max_lon])
        .y_bounds([bounds.min_lat, bounds.max_lat])
        .paint(|ctx| {
            for (coords, kind) in [
                (&others, VehicleType::Other),
                (&buses, VehicleType::Bus),
                (&trains, VehicleType::Train),
            ] {
                ctx.draw(&Points {
                    coords,
                    color: type_color(kind),
                });
            }
        });

    frame.render_widget(canvas, area);
}

fn render_table(frame: &mut Frame, app: &App, vehicles: &[&Vehicle], area: Rect) {
    let offset = app.table_offset.min(vehicles.len().saturating_sub(1));

    let rows = vehicles.iter().skip(offset).map(|v| {
        let kind = v.vehicle_type();
        Row::new(vec![
            Cell::from(v.display.clone()),
            Cell::from(kind.label()).style(Style::default().fg(type_color(kind))),
            Cell::from(v.route_name()),
            Cell::from(v.trip_number.clone()),
            Cell::from(v.status.clone()).style(Style::default().fg(status_color(&v.status))),
            Cell::from(if v.is_in_motion { "yes" } else { "no" }),
        ])
    });

    let header = Row::new(["Vehicle", "Type", "Route", "Trip", "Status", "Moving"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let widths = [
        Constraint::Percentage(20),
        Constraint::Length(6),
        Constraint::Percentage(30),
        Constraint::Length(8),
        Constraint::Percentage(20),
        Constraint::Length(6),
    ];

    let title = format!(" Vehicles {}-{} of {} ", offset + 1, vehicles.len(), vehicles.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(section_block(title.trim(), &app.dashboard.vehicles));
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Page;
    use crate::data::{SearchMode, Section};
    use crate::ui::test_support::{render_to_string, sample_app};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn vehicles_app() -> App {
        let mut app = sample_app();
        app.page = Page::Vehicles;
        app
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color("Delayed 5 min"), Color::Red);
        assert_eq!(status_color("DELAY"), Color::Red);
        assert_eq!(status_color("Early"), Color::Yellow);
        assert_eq!(status_color("On Time"), Color::Green);
        assert_eq!(status_color("Cancelled"), Color::Reset);
        assert_eq!(status_color(""), Color::Reset);
    }

    #[test]
    fn test_map_bounds_default_when_empty() {
        assert_eq!(map_bounds(&[]), LocationBounds::default());
    }

    #[test]
    fn test_map_bounds_pads_points() {
        let bounds = map_bounds(&[(-79.5, 43.6), (-79.0, 43.9)]);
        assert!((bounds.min_lon - -79.55).abs() < 1e-9);
        assert!((bounds.max_lon - -78.95).abs() < 1e-9);
        assert!((bounds.min_lat - 43.55).abs() < 1e-9);
        assert!((bounds.max_lat - 43.95).abs() < 1e-9);
    }

    #[test]
    fn test_vehicles_page_renders_summary_and_table() {
        let app = vehicles_app();
        let content = render_to_string(&app, 140, 50);

        assert!(content.contains("Found 3"));
        assert!(content.contains("Map (2 located)"));
        assert!(content.contains("Lakeshore West"));
        assert!(content.contains("Top routes"));
        assert!(content.contains("Show All"));
    }

    #[test]
    fn test_filter_changes_what_is_rendered() {
        let mut app = vehicles_app();
        app.vehicle_filter.mode = SearchMode::RouteCode("LW".to_string());

        let content = render_to_string(&app, 140, 50);
        assert!(content.contains("Found 1"));
        assert!(content.contains("Filtered out 2"));
        assert!(content.contains("Route Code: LW"));
    }

    #[test]
    fn test_no_matches_message() {
        let mut app = vehicles_app();
        app.vehicle_filter.mode = SearchMode::RouteCode("ZZ".to_string());

        let content = render_to_string(&app, 140, 50);
        assert!(content.contains("No vehicles match"));
    }

    #[test]
    fn test_search_input_is_shown() {
        let mut app = vehicles_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE));

        let content = render_to_string(&app, 140, 50);
        assert!(content.contains("Route code: l_"));
    }

    #[test]
    fn test_sort_is_shown_in_filters() {
        let mut app = vehicles_app();
        let content = render_to_string(&app, 140, 50);
        assert!(content.contains("Sort: Trip Number asc"));

        app.handle_key(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Char('O'), KeyModifiers::SHIFT));
        let content = render_to_string(&app, 140, 50);
        assert!(content.contains("Sort: Route Name desc"));
    }

    #[test]
    fn test_unavailable_vehicles_show_error() {
        let mut app = vehicles_app();
        app.dashboard.vehicles =
            Section::Unavailable("Unable to load vehicle positions: timed out".to_string());

        let content = render_to_string(&app, 140, 50);
        assert!(content.contains("Unable to load vehicle positions"));
    }
}
