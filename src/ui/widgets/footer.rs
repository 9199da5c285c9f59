// src/ui/widgets/footer.rs

use crate::app::{App, AppState, ExportStatus};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = match app.state {
        AppState::Idle => vec![
            Span::raw("Press "),
            key("Enter"),
            Span::raw(" to scan, "),
            key("Tab"),
            Span::raw(" for saved reports, "),
            key("F2"),
            Span::raw(" for logs, "),
            key("Esc"),
            Span::raw(" to quit."),
        ],
        AppState::Finished | AppState::Failed => vec![
            key("[N]"),
            Span::raw("ew Scan, "),
            key("[R]"),
            Span::raw("eports, "),
            key("[L]"),
            Span::raw("ogs, "),
            key("[Q]"),
            Span::raw("uit"),
        ],
        AppState::Reports => vec![
            key("Enter"),
            Span::raw(" open, "),
            key("Esc"),
            Span::raw(" back, "),
            key("[Q]"),
            Span::raw("uit"),
        ],
        AppState::Scanning => vec![Span::raw("Scanning... Press Q to quit.")],
    };

    match &app.export_status {
        ExportStatus::Idle => {}
        ExportStatus::Success(id) => {
            spans.push(Span::raw("  |  "));
            spans.push(Span::styled(format!("Saved: {}", id), Style::new().fg(Color::Green)));
        }
        ExportStatus::Error(e) => {
            spans.push(Span::raw("  |  "));
            spans.push(Span::styled(format!("Save failed: {}", e), Style::new().fg(Color::Red)));
        }
    }

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
