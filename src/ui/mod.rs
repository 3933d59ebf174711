//! UI rendering module for transitboard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod alerts;
pub mod help_overlay;
pub mod lines;
pub mod overview;
pub mod vehicles;
pub mod widgets;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, Page};
use crate::data::Section;

pub use help_overlay::render as render_help_overlay;

/// Renders the whole dashboard for the current page
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.page {
        Page::Overview => overview::render(frame, app, chunks[1]),
        Page::Lines => lines::render(frame, app, chunks[1]),
        Page::Vehicles => vehicles::render(frame, app, chunks[1]),
        Page::Alerts => alerts::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2], Utc::now());

    if app.show_help {
        render_help_overlay(frame);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| Line::from(format!("{} {}", i + 1, page.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " TRANSITBOARD ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
        )
        .select(app.page.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Renders refresh status and key hints at the bottom of the screen
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, now: DateTime<Utc>) {
    let refresh = app.refresh_state();

    let mut spans = vec![
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Refresh  "),
        Span::styled("a", Style::default().fg(Color::Yellow)),
        Span::raw(" Auto  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    let updated = match app.last_refresh {
        Some(at) => format!(" │ Updated {}", at.format("%H:%M:%S")),
        None => " │ Loading...".to_string(),
    };
    spans.push(Span::styled(updated, Style::default().fg(Color::DarkGray)));

    let auto = match refresh.seconds_until_refresh(now) {
        Some(secs) => Span::styled(
            format!(" │ Auto refresh in {}s", secs),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled(" │ Auto refresh off", Style::default().fg(Color::DarkGray)),
    };
    spans.push(auto);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Formats a fetch time in the local time zone
pub(crate) fn format_fetched_at(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Bordered block for a section, marked when the data shown is stale
pub(crate) fn section_block<T>(title: &str, section: &Section<T>) -> Block<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));

    match section {
        Section::Stale {
            fetched_at, error, ..
        } => block
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                format!(" stale since {} ", format_fetched_at(*fetched_at)),
                Style::default().fg(Color::Yellow),
            ))
            .title_bottom(Span::styled(
                format!(" {} ", error),
                Style::default().fg(Color::Yellow),
            )),
        _ => block,
    }
}

/// Renders a section's placeholder when it has no data to show
///
/// # Returns
/// `true` if a placeholder was drawn and the caller should skip the section
pub(crate) fn render_placeholder<T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    section: &Section<T>,
) -> bool {
    let (text, color) = match section {
        Section::Loading => ("Loading...".to_string(), Color::DarkGray),
        Section::Unavailable(error) => (error.clone(), Color::Red),
        Section::Ready { .. } | Section::Stale { .. } => return false,
    };

    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(color)))
        .block(section_block(title, section))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
    true
}

/// Horizontal bar line for a labelled count
pub(crate) fn bar_line(
    label: &str,
    count: usize,
    max: usize,
    width: usize,
    color: Color,
) -> Line<'static> {
    let filled = if max == 0 {
        0
    } else {
        ((count as f64 / max as f64) * width as f64).round() as usize
    };

    Line::from(vec![
        Span::raw(format!("{:<14.14} ", label)),
        Span::styled("█".repeat(filled.min(width)), Style::default().fg(color)),
        Span::styled(format!(" {}", count), Style::default().fg(Color::White)),
    ])
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    use crate::api::TransitClient;
    use crate::app::App;
    use crate::cli::StartupConfig;
    use crate::data::{
        AlertsBoard, LinesBoard, Section, StatsBoard, SummaryBoard, TrendBoard, UnionBoard,
        VehiclesBoard,
    };

    /// App with an unreachable API and nothing loaded
    pub fn offline_app() -> App {
        let client = TransitClient::with_config(
            "http://127.0.0.1:9/api/go",
            "http://127.0.0.1:9/api",
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        App::with_client(client, &StartupConfig::default(), Utc::now())
    }

    fn ready<T>(value: T) -> Section<T> {
        Section::Ready {
            value,
            fetched_at: Utc::now(),
        }
    }

    /// App with every section loaded from representative payloads
    pub fn sample_app() -> App {
        let mut app = offline_app();
        let d = &mut app.dashboard;

        d.stats = ready(
            StatsBoard::from_value(&json!([
                {"metric": "Performance Rate", "value": 92.5},
                {"metric": "Total Vehicles", "value": 120},
                {"metric": "Trains Active", "value": 40},
                {"metric": "Buses Active", "value": 80},
                {"metric": "Trains in Motion", "value": 30},
                {"metric": "Buses in Motion", "value": 60},
                {"metric": "On Time", "value": 100},
                {"metric": "Delayed", "value": 20},
                {"metric": "Train Lines", "value": 7},
                {"metric": "Bus Routes", "value": 30}
            ]))
            .unwrap(),
        );
        d.trends = ready(
            TrendBoard::from_value(&json!([
                {"target": "Active Vehicles", "datapoints": [
                    [100, 1_700_000_000_000i64], [110, 1_700_000_600_000i64],
                    [null, 1_700_001_200_000i64], [120, 1_700_001_800_000i64]
                ]},
                {"target": "Delayed", "datapoints": [
                    [10, 1_700_000_000_000i64], [20, 1_700_001_800_000i64]
                ]}
            ]))
            .unwrap(),
        );
        d.vehicles = ready(
            VehiclesBoard::from_value(&json!({"vehicles": [
                {"Latitude": 43.64, "Longitude": -79.38, "Status": "On Time", "Type": "Train",
                 "Line": "LW", "TripNumber": "1234", "IsInMotion": true, "Display": "LW 1234"},
                {"Latitude": 43.86, "Longitude": -79.02, "Status": "Delayed 5 min", "Type": "Bus",
                 "Line": "90", "TripNumber": "5678", "IsInMotion": false, "Display": "90 5678"},
                {"Latitude": 0.0, "Longitude": 0.0, "Status": "On Time", "Type": "Bus",
                 "Line": "41", "TripNumber": "9999", "IsInMotion": true, "Display": "41"}
            ]}))
            .unwrap(),
        );
        d.union = ready(
            UnionBoard::from_value(&json!([
                {"Trip": "LW 1234", "Platform": "11", "Departure": "08:15"}
            ]))
            .unwrap(),
        );
        d.train_lines = ready(
            LinesBoard::from_value(&json!([
                {"Code": "LW", "Total": 12, "OnTime": 11, "Delayed": 1},
                {"Code": "KI", "Total": 6, "OnTime": 6, "Delayed": 0}
            ]))
            .unwrap(),
        );
        d.bus_routes = ready(
            LinesBoard::from_value(&json!([
                {"Code": "90", "Total": 9, "OnTime": 7, "Delayed": 2},
                {"Code": "41", "Total": 3, "OnTime": 3, "Delayed": 0}
            ]))
            .unwrap(),
        );
        d.alerts = ready(
            AlertsBoard::from_value(&json!([
                {"Severity": "High", "Type": "Delay", "Route": "501", "Description": "Track work"},
                {"Severity": "Low", "Type": "Detour", "Route": "29"}
            ]))
            .unwrap(),
        );
        d.summary = ready(
            SummaryBoard::from_value(&json!([
                {"metric": "Active Alerts", "value": 2},
                {"metric": "Routes Affected", "value": 2}
            ]))
            .unwrap(),
        );

        app.last_refresh = Some(chrono::Local::now());
        app
    }

    /// Renders the full dashboard and returns the buffer text
    pub fn render_to_string(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| super::render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }
}
