// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use crate::core::models::RiskLevel;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn risk_style(level: RiskLevel) -> Style {
    match level {
        RiskLevel::High => Style::default().fg(Color::Red).bold(),
        RiskLevel::Medium => Style::default().fg(Color::Yellow).bold(),
        RiskLevel::Low => Style::default().fg(Color::Cyan),
        RiskLevel::Safe => Style::default().fg(Color::Green),
    }
}

/// Renders the summary widget, showing the overall risk and scan facts.
///
/// # Arguments
///
/// * `frame` - The `Frame` to render the widget on.
/// * `app` - A reference to the application state (`App`), containing the summary data.
/// * `area` - The `Rect` defining the drawable area for this widget.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Risk level
            Constraint::Length(1), // Spacer
            Constraint::Length(7), // Target facts
            Constraint::Length(1), // Spacer
            Constraint::Length(4), // Issues found
            Constraint::Min(0),    // Summary paragraph
        ])
        .split(area);

    // Nothing to show until a report is on screen.
    let Some(report) = app.scan_report.as_ref().filter(|_| app.state == AppState::Finished) else {
        return;
    };

    // --- Risk Level ---
    let risk_text = Text::from(vec![
        Line::from("Overall Risk".bold()),
        Line::from(Span::styled(report.risk_level.to_string().to_uppercase(), risk_style(report.risk_level))),
    ]);
    frame.render_widget(Paragraph::new(risk_text).alignment(Alignment::Center), summary_chunks[0]);

    // --- Target Facts ---
    let fact = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, Style::default().fg(Color::DarkGray)), Span::raw(value)])
    };
    let facts = vec![
        fact("Host:     ", report.hostname.clone()),
        fact("IP:       ", report.ip.clone()),
        fact("OS:       ", report.os_guess.clone()),
        fact("Server:   ", report.web_analysis.server.clone()),
        fact("Ports:    ", format!("{} open / {}", report.metadata.open_count, report.metadata.total_ports)),
        fact("Duration: ", report.metadata.duration_label()),
        fact("Scanned:  ", report.metadata.scan_time.format("%Y-%m-%d %H:%M:%S").to_string()),
    ];
    frame.render_widget(Paragraph::new(facts), summary_chunks[2]);

    // --- Issues Found ---
    let issues_block = Block::default().title("ISSUES FOUND".bold());
    let issues = Text::from(vec![
        Line::from(vec![Span::raw("High:   "), Span::styled(app.summary.high_issues.to_string(), risk_style(RiskLevel::High))]),
        Line::from(vec![Span::raw("Medium: "), Span::styled(app.summary.medium_issues.to_string(), risk_style(RiskLevel::Medium))]),
        Line::from(vec![Span::raw("Low:    "), Span::styled(app.summary.low_issues.to_string(), risk_style(RiskLevel::Low))]),
    ]);
    frame.render_widget(Paragraph::new(issues).block(issues_block), summary_chunks[4]);

    // --- Summary Paragraph ---
    let verdict = Paragraph::new(report.summary.as_str())
        .style(risk_style(report.risk_level))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP).title("Assessment"));
    frame.render_widget(verdict, summary_chunks[5]);
}
