// src/ui/widgets/analysis_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use crate::core::models::{PortState, ScanReport};
use crate::ui::widgets::summary::risk_style;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Wrap},
    text::Line,
};

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Analysis Report (Navigate with ↑ ↓)");

    if app.state != AppState::Finished {
        let content = match app.state {
            AppState::Idle => Paragraph::new(vec![
                Line::from("Enter a URL, hostname or IP and press Enter."),
                Line::from(""),
                Line::from("Ports 21, 22, 80, 443, 3306 and 8080 are probed, the OS is"),
                Line::from("guessed from the ping TTL and HTTP headers are inspected."),
            ])
            .alignment(Alignment::Center),
            AppState::Scanning => {
                let spinner_char = SPINNER_CHARS[app.spinner_frame];
                let phase = app.phase.map_or("Starting", |p| p.label());
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                    Span::raw(format!("{}...", phase)),
                ]))
                .alignment(Alignment::Center)
            }
            AppState::Failed => {
                let error = app.scan_error.as_deref().unwrap_or("Scan failed.");
                Paragraph::new(vec![
                    Line::from("SCAN FAILED".bold().fg(Color::Red)),
                    Line::from(""),
                    Line::from(error.to_string()),
                    Line::from(""),
                    Line::from("Check the target spelling and your network connection."),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
            }
            _ => Paragraph::new(""),
        };
        frame.render_widget(content.block(main_block), area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let Some(report) = app.scan_report.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(report.scan_results.len() as u16 + 2),
            Constraint::Percentage(35),
            Constraint::Min(0),
        ])
        .split(inner_area);

    frame.render_widget(port_table(report), chunks[0]);

    let items: Vec<ListItem> = report
        .vulnerabilities
        .iter()
        .map(|v| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", v.risk), risk_style(v.risk)),
                Span::styled(format!("{}: ", v.kind), Style::default().fg(Color::DarkGray)),
                Span::raw(v.message.clone()),
            ]))
        })
        .collect();

    let findings_list = List::new(items)
        .block(Block::default().borders(Borders::TOP).title("Vulnerabilities"))
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let vulnerability_count = report.vulnerabilities.len();
    frame.render_stateful_widget(findings_list, chunks[1], &mut app.analysis_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    if let Some(selected) = app.selected_vulnerability() {
        let text = vec![
            Line::from(""),
            Line::from("WHAT IT IS:".yellow().bold()),
            Line::from(format!("{} ({} risk)", selected.message, selected.risk)),
            Line::from(""),
            Line::from("HOW TO FIX:".yellow().bold()),
            Line::from(selected.recommendation.clone()),
        ];
        let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block);
        frame.render_widget(p, chunks[2]);
    } else {
        render_placeholder_details(frame, vulnerability_count, detail_block, chunks[2]);
    }
}

fn port_table(report: &ScanReport) -> Table<'static> {
    let header = Row::new(["PORT", "STATE", "SERVICE", "RISK", "RECOMMENDATION"])
        .style(Style::default().bold().underlined());

    let rows = report.scan_results.iter().map(|p| {
        let state_style = match p.state {
            PortState::Open => Style::default().fg(Color::Green).bold(),
            PortState::Closed => Style::default().fg(Color::DarkGray),
        };
        Row::new(vec![
            Cell::from(p.port.to_string()),
            Cell::from(p.state.to_string()).style(state_style),
            Cell::from(p.service.clone()),
            Cell::from(p.risk.to_string()).style(risk_style(p.risk)),
            Cell::from(p.recommendation.clone()),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Min(20),
        ],
    )
    .header(header)
}

fn render_placeholder_details(frame: &mut Frame, vulnerability_count: usize, block: Block, area: Rect) {
    let placeholder_text = if vulnerability_count == 0 {
        Text::from(vec![
            Line::from(""),
            Line::from("✓ NO EXPOSED SERVICES".bold().fg(Color::Green)),
            Line::from(""),
            Line::from("None of the probed ports answered and no header issues were found."),
        ])
    } else {
        Text::from("Select an item above to see details.")
    };

    let p = Paragraph::new(placeholder_text).alignment(Alignment::Center).block(block);
    frame.render_widget(p, area);
}
