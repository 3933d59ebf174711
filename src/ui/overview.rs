//! Overview page rendering
//!
//! Network KPIs with the performance gauge, on-time and fleet breakdowns, and
//! the 24-hour activity chart.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, Gauge, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::stats::{format_number, PERFORMANCE_TARGET};
use crate::data::timeseries::time_label;
use crate::data::{StatsBoard, TrendBoard};
use crate::ui::widgets::TrendSparkline;
use crate::ui::{bar_line, render_placeholder, section_block};

const SERIES_COLORS: [Color; 5] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
];

/// Color for a performance rate against the target
fn performance_color(rate: f64) -> Color {
    if rate >= PERFORMANCE_TARGET {
        Color::Green
    } else if rate >= PERFORMANCE_TARGET - 5.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Min(6),
        ])
        .split(area);

    let stats = &app.dashboard.stats;
    if !render_placeholder(frame, chunks[0], "Network Performance", stats) {
        if let Some(board) = stats.value() {
            let block = section_block("Network Performance", stats);
            let inner = block.inner(chunks[0]);
            frame.render_widget(block, chunks[0]);
            render_kpis(frame, board, inner);
        }
    }

    let breakdown = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    if !render_placeholder(frame, breakdown[0], "Service Status", stats) {
        if let Some(board) = stats.value() {
            render_breakdown(
                frame,
                breakdown[0],
                section_block("Service Status", stats),
                &[
                    ("On Time", board.on_time(), Color::Green),
                    ("Delayed", board.delayed(), Color::Red),
                ],
            );
            render_breakdown(
                frame,
                breakdown[1],
                section_block("Fleet", stats),
                &[
                    ("Trains", board.trains_active(), Color::Cyan),
                    ("Buses", board.buses_active(), Color::Yellow),
                ],
            );
        }
    } else {
        render_placeholder(frame, breakdown[1], "Fleet", stats);
    }

    let trends = &app.dashboard.trends;
    if !render_placeholder(frame, chunks[2], "Last 24 Hours", trends) {
        if let Some(board) = trends.value() {
            let block = section_block("Last 24 Hours", trends);
            let inner = block.inner(chunks[2]);
            frame.render_widget(block, chunks[2]);
            render_trends(frame, board, inner);
        }
    }
}

fn render_kpis(frame: &mut Frame, board: &StatsBoard, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let rate = board.performance_rate();
    let delta = board.delta_vs_target();
    let color = performance_color(rate);

    let label = Style::default().fg(Color::Gray);
    let lines = vec![
        Line::from(vec![
            Span::styled("Performance  ", label),
            Span::styled(
                format!("{:.1}%", rate),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({:+.1} vs {}% target)", delta, format_number(PERFORMANCE_TARGET)),
                Style::default().fg(color),
            ),
        ]),
        Line::from(vec![
            Span::styled("Vehicles     ", label),
            Span::raw(format!(
                "{} total · {} moving",
                format_number(board.total_vehicles()),
                format_number(board.moving())
            )),
        ]),
        Line::from(vec![
            Span::styled("On time      ", label),
            Span::raw(format!(
                "{} ({}%) · {} delayed",
                format_number(board.on_time()),
                board.on_time_share(),
                format_number(board.delayed())
            )),
        ]),
        Line::from(vec![
            Span::styled("Network      ", label),
            Span::raw(format!(
                "{} train lines · {} bus routes",
                format_number(board.train_lines()),
                format_number(board.bus_routes())
            )),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), columns[0]);

    let gauge = Gauge::default()
        .block(Block::default().title("Performance Rate"))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(rate.clamp(0.0, 100.0).round() as u16)
        .label(format!("{:.1}%", rate));
    frame.render_widget(gauge, columns[1]);
}

fn render_breakdown(frame: &mut Frame, area: Rect, block: Block, rows: &[(&str, f64, Color)]) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max = rows.iter().map(|(_, n, _)| *n as usize).max().unwrap_or(0);
    let width = (inner.width as usize).saturating_sub(24);
    let lines: Vec<Line> = rows
        .iter()
        .map(|(name, n, color)| bar_line(name, *n as usize, max, width, *color))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_trends(frame: &mut Frame, board: &TrendBoard, area: Rect) {
    if board.series.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No trend data",
                Style::default().fg(Color::DarkGray),
            )),
            area,
        );
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let points: Vec<Vec<(f64, f64)>> = board.series.iter().map(|s| s.points()).collect();
    let datasets: Vec<Dataset> = board
        .series
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (series, data))| {
            Dataset::default()
                .name(series.target.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(data)
        })
        .collect();

    let (x_min, x_max) = board.time_bounds().unwrap_or((0.0, 1.0));
    let (y_min, y_max) = board.value_bounds().unwrap_or((0.0, 1.0));
    let axis_style = Style::default().fg(Color::DarkGray);

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([x_min, x_max])
                .labels(vec![Span::raw(time_label(x_min)), Span::raw(time_label(x_max))]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([y_min.min(0.0), y_max])
                .labels(vec![
                    Span::raw(format_number(y_min.min(0.0))),
                    Span::raw(format_number(y_max)),
                ]),
        );
    frame.render_widget(chart, columns[0]);

    render_sparklines(frame, board, columns[1]);
}

/// One label row and one sparkline row per series
fn render_sparklines(frame: &mut Frame, board: &TrendBoard, area: Rect) {
    for (i, series) in board.series.iter().enumerate() {
        let y = area.y + (i as u16) * 2;
        if y + 1 >= area.y + area.height {
            break;
        }
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];

        let latest = series
            .latest()
            .map(format_number)
            .unwrap_or_else(|| "-".to_string());
        let label = Line::from(vec![
            Span::styled(series.target.clone(), Style::default().fg(color)),
            Span::raw(format!("  {}", latest)),
        ]);
        frame.render_widget(Paragraph::new(label), Rect::new(area.x, y, area.width, 1));

        let values = series.values();
        frame.render_widget(
            TrendSparkline::new(&values).style(Style::default().fg(color)),
            Rect::new(area.x, y + 1, area.width, 1),
        );
    }
}
