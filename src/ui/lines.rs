//! Lines page rendering
//!
//! Train line performance, the busiest bus routes and Union Station departures.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{LineStat, LinesBoard, UnionBoard};
use crate::ui::{render_placeholder, section_block};

/// Bus routes listed on the page
const TOP_BUS_ROUTES: usize = 10;

/// Color for an on-time rate
fn rate_color(rate: Option<f64>) -> Color {
    match rate {
        Some(r) if r >= 95.0 => Color::Green,
        Some(r) if r >= 85.0 => Color::Yellow,
        Some(_) => Color::Red,
        None => Color::DarkGray,
    }
}

fn header_row(titles: &[&str]) -> Row<'static> {
    Row::new(titles.iter().map(|t| t.to_string())).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn line_row(line: &LineStat) -> Row<'static> {
    let rate = line.on_time_rate();
    let rate_text = rate
        .map(|r| format!("{:.1}%", r))
        .unwrap_or_else(|| "-".to_string());

    Row::new(vec![
        Cell::from(line.code.clone()).style(Style::default().fg(Color::Yellow)),
        Cell::from(line.name()),
        Cell::from(line.total.to_string()),
        Cell::from(line.on_time.to_string()),
        Cell::from(line.delayed.to_string()),
        Cell::from(rate_text).style(Style::default().fg(rate_color(rate))),
    ])
}

fn line_widths() -> [Constraint; 6] {
    [
        Constraint::Length(5),
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
    ]
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let d = &app.dashboard;

    if !render_placeholder(frame, columns[0], "Train Lines", &d.train_lines) {
        if let Some(board) = d.train_lines.value() {
            let table = Table::new(board.lines.iter().map(line_row), line_widths())
                .header(header_row(&["Code", "Line", "Total", "OnTime", "Delay", "Rate"]))
                .block(section_block("Train Lines", &d.train_lines));
            frame.render_widget(table, columns[0]);
        }
    }

    if !render_placeholder(frame, columns[1], "Bus Routes", &d.bus_routes) {
        if let Some(board) = d.bus_routes.value() {
            render_bus_routes(frame, board, columns[1], app);
        }
    }

    if !render_placeholder(frame, rows[1], "Union Station Departures", &d.union) {
        if let Some(board) = d.union.value() {
            render_union(frame, board, rows[1], app);
        }
    }
}

fn render_bus_routes(frame: &mut Frame, board: &LinesBoard, area: Rect, app: &App) {
    let block = section_block("Bus Routes", &app.dashboard.bus_routes);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let busiest = board
        .busiest()
        .map(|line| format!("{} ({})", line.code, line.total))
        .unwrap_or_else(|| "-".to_string());
    let label = Style::default().fg(Color::Gray);
    let summary = vec![
        Line::from(vec![
            Span::styled("Buses ", label),
            Span::raw(board.total_vehicles().to_string()),
            Span::styled("  Busiest ", label),
            Span::raw(busiest),
        ]),
        Line::from(vec![
            Span::styled("Routes without delays ", label),
            Span::styled(
                format!("{}/{}", board.routes_without_delays(), board.lines.len()),
                Style::default().fg(Color::Green),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(summary), chunks[0]);

    let table = Table::new(
        board.top_by_total(TOP_BUS_ROUTES).into_iter().map(line_row),
        line_widths(),
    )
    .header(header_row(&["Code", "Route", "Total", "OnTime", "Delay", "Rate"]));
    frame.render_widget(table, chunks[1]);
}

fn render_union(frame: &mut Frame, board: &UnionBoard, area: Rect, app: &App) {
    let block = section_block("Union Station Departures", &app.dashboard.union);

    if board.rows.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No departures listed",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let columns = board.columns();
    let header: Vec<&str> = columns.iter().map(String::as_str).collect();
    let offset = app.table_offset.min(board.rows.len().saturating_sub(1));

    let rows = board.rows.iter().skip(offset).map(|row| {
        Row::new(
            columns
                .iter()
                .map(|column| UnionBoard::cell(row, column))
                .collect::<Vec<_>>(),
        )
    });
    let widths = vec![Constraint::Ratio(1, columns.len() as u32); columns.len()];

    let table = Table::new(rows, widths)
        .header(header_row(&header))
        .block(block);
    frame.render_widget(table, area);
}
