// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Defines the areas of the application's user interface.
///
/// One `Rect` per widget area, computed once per frame.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
    /// Empty when the log panel is hidden.
    pub log_panel: Rect,
}

/// Creates the complete application layout.
///
/// The frame is split vertically into the target input, the content area and
/// a one-line footer. The content area holds the report pane and the summary
/// side by side, plus the log panel as a third column when `show_logs` is set.
///
/// # Arguments
/// * `frame_size` - The `Rect` representing the total size of the terminal frame.
/// * `show_logs` - Whether to reserve a column for the log panel.
///
/// # Returns
/// An `AppLayout` struct containing the calculated `Rect` for each widget area.
pub fn create_layout(frame_size: Rect, show_logs: bool) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let content_constraints = if show_logs {
        vec![Constraint::Percentage(45), Constraint::Percentage(22), Constraint::Percentage(33)]
    } else {
        vec![Constraint::Percentage(68), Constraint::Percentage(32)]
    };

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(content_constraints)
        .split(main_chunks[1]);

    AppLayout {
        input: main_chunks[0],
        report: content_chunks[0],
        summary: content_chunks[1],
        log_panel: if show_logs { content_chunks[2] } else { Rect::default() },
        footer: main_chunks[2],
    }
}
