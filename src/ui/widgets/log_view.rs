// src/ui/widgets/log_view.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation},
};

fn level_style(level: &str) -> Style {
    match level {
        "ERROR" => Style::default().fg(Color::Red).bold(),
        "WARN" => Style::default().fg(Color::Yellow),
        "DEBUG" | "TRACE" => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::Green),
    }
}

/// Splits a formatted tracing line into timestamp, level and message.
fn styled_line(raw: &str) -> Line<'_> {
    let Some((ts, rest)) = raw.split_once(char::is_whitespace) else {
        return Line::raw(raw);
    };
    let Some((level, msg)) = rest.trim_start().split_once(char::is_whitespace) else {
        return Line::raw(raw);
    };
    Line::from(vec![
        Span::styled(ts, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(level, level_style(level)),
        Span::raw(" "),
        Span::raw(msg),
    ])
}

/// Tail of the log file. Long lines scroll sideways with ← and →.
pub fn render_log_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!("Logs ({} lines, ← → to scroll)", app.log_content.len()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [text_area, bar_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

    let widest = app.log_content.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    app.log_horizontal_scroll_state = app.log_horizontal_scroll_state.content_length(widest);

    // Newest lines stay at the bottom of the panel.
    let skip = app.log_content.len().saturating_sub(text_area.height as usize);
    let lines: Vec<Line> = app.log_content[skip..].iter().map(|l| styled_line(l)).collect();

    frame.render_widget(
        Paragraph::new(lines).scroll((0, u16::try_from(app.log_horizontal_scroll).unwrap_or(u16::MAX))),
        text_area,
    );
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::HorizontalBottom).thumb_symbol("■"),
        bar_area,
        &mut app.log_horizontal_scroll_state,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_level_from_message() {
        let line = styled_line("2026-10-17T09:00:00.000+02:00  INFO Scan finished. target=\"example.com\"");
        assert_eq!(line.spans.len(), 5);
        assert_eq!(line.spans[2].content, "INFO");
        assert_eq!(line.spans[4].content, "Scan finished. target=\"example.com\"");
    }

    #[test]
    fn unstructured_lines_pass_through() {
        assert_eq!(styled_line("panic").spans.len(), 1);
    }
}
