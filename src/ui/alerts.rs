//! TTC alerts page rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::alerts::ALERTS_SHOWN;
use crate::data::{AlertsBoard, Severity, SummaryBoard};
use crate::ui::{bar_line, render_placeholder, section_block};

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Green,
        Severity::Other => Color::Gray,
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let d = &app.dashboard;
    if !render_placeholder(frame, chunks[0], "TTC Summary", &d.summary) {
        if let Some(board) = d.summary.value() {
            render_summary(frame, board, chunks[0], app);
        }
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    if render_placeholder(frame, columns[0], "Service Alerts", &d.alerts) {
        render_placeholder(frame, columns[1], "Breakdown", &d.alerts);
        return;
    }
    if let Some(board) = d.alerts.value() {
        render_alerts_table(frame, board, columns[0], app);
        render_breakdowns(frame, board, columns[1], app);
    }
}

fn render_summary(frame: &mut Frame, board: &SummaryBoard, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for (metric, value) in board.entries() {
        spans.push(Span::styled(
            format!("{} ", metric),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::styled(
            format!("{}   ", value),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(section_block("TTC Summary", &app.dashboard.summary))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_alerts_table(frame: &mut Frame, board: &AlertsBoard, area: Rect, app: &App) {
    let title = format!(
        "Service Alerts ({} of {})",
        board.shown().len(),
        board.alerts.len()
    );
    let block = section_block(&title, &app.dashboard.alerts);

    if board.alerts.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No active alerts",
            Style::default().fg(Color::Green),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let details = board.detail_columns();
    let shown = board.shown();
    let offset = app.table_offset.min(shown.len().saturating_sub(1));

    let rows = shown.iter().skip(offset).map(|alert| {
        let mut cells = vec![
            Cell::from(alert.severity.clone())
                .style(Style::default().fg(severity_color(alert.severity_level()))),
            Cell::from(alert.alert_type.clone()),
        ];
        cells.extend(details.iter().map(|field| Cell::from(alert.detail(field))));
        Row::new(cells)
    });

    let mut header: Vec<String> = vec!["Severity".to_string(), "Type".to_string()];
    header.extend(details.iter().cloned());
    let header = Row::new(header).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let mut widths = vec![Constraint::Length(9), Constraint::Length(12)];
    widths.extend(details.iter().map(|_| Constraint::Min(8)));

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_breakdowns(frame: &mut Frame, board: &AlertsBoard, area: Rect, app: &App) {
    let block = section_block("Breakdown", &app.dashboard.alerts);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = (inner.width as usize).saturating_sub(20);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(Span::styled("By severity", bold))];
    let by_severity = board.by_severity();
    let max = by_severity.first().map(|(_, n)| *n).unwrap_or(0);
    for (severity, count) in &by_severity {
        let level = severity_color(
            board
                .alerts
                .iter()
                .find(|a| &a.severity == severity)
                .map(|a| a.severity_level())
                .unwrap_or(Severity::Other),
        );
        lines.push(bar_line(severity, *count, max, width, level));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("By type", bold)));
    let by_type = board.by_type();
    let max = by_type.first().map(|(_, n)| *n).unwrap_or(0);
    for (kind, count) in &by_type {
        lines.push(bar_line(kind, *count, max, width, Color::Magenta));
    }

    if board.alerts.len() > ALERTS_SHOWN {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Counts cover the first {} alerts", ALERTS_SHOWN),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Page;
    use crate::data::Section;
    use crate::ui::test_support::{render_to_string, sample_app};
    use serde_json::json;

    fn alerts_app() -> App {
        let mut app = sample_app();
        app.page = Page::Alerts;
        app
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(severity_color(Severity::High), Color::Red);
        assert_eq!(severity_color(Severity::Medium), Color::Yellow);
        assert_eq!(severity_color(Severity::Low), Color::Green);
        assert_eq!(severity_color(Severity::Other), Color::Gray);
    }

    #[test]
    fn test_alerts_page_renders_summary_and_table() {
        let app = alerts_app();
        let content = render_to_string(&app, 140, 40);

        assert!(content.contains("Active Alerts 2"));
        assert!(content.contains("Service Alerts (2 of 2)"));
        assert!(content.contains("Track work"));
        assert!(content.contains("Detour"));
        assert!(content.contains("By severity"));
    }

    #[test]
    fn test_only_first_alerts_are_listed() {
        let mut app = alerts_app();
        let many: Vec<_> = (0..20)
            .map(|i| json!({"Severity": "Low", "Type": "Delay", "Route": i.to_string()}))
            .collect();
        app.dashboard.alerts = Section::Ready {
            value: AlertsBoard::from_value(&serde_json::Value::Array(many)).unwrap(),
            fetched_at: chrono::Utc::now(),
        };

        let content = render_to_string(&app, 140, 40);
        assert!(content.contains("Service Alerts (15 of 20)"));
        assert!(content.contains("Counts cover the first 15 alerts"));
    }

    #[test]
    fn test_no_alerts_message() {
        let mut app = alerts_app();
        app.dashboard.alerts = Section::Ready {
            value: AlertsBoard::default(),
            fetched_at: chrono::Utc::now(),
        };

        let content = render_to_string(&app, 140, 40);
        assert!(content.contains("No active alerts"));
    }

    #[test]
    fn test_failed_summary_keeps_alerts() {
        let mut app = alerts_app();
        app.dashboard.summary =
            Section::Unavailable("Unable to load TTC summary: HTTP 503".to_string());

        let content = render_to_string(&app, 140, 40);
        assert!(content.contains("Unable to load TTC summary"));
        assert!(content.contains("Service Alerts"));
    }
}
