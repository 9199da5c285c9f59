// src/ui/widgets/reports_view.rs

use crate::app::App;
use crate::ui::widgets::summary::risk_style;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Renders the list of saved reports, newest first.
pub fn render_reports_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Saved Reports (Enter to open, Esc to go back)");

    if app.saved_reports.is_empty() {
        let empty = Paragraph::new("No saved reports yet. Finished scans are saved automatically.")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .saved_reports
        .iter()
        .map(|meta| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}  ", meta.scan_time.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<7}", meta.risk_level.to_string()), risk_style(meta.risk_level)),
                Span::raw(meta.target.clone()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.reports_list_state);
}
