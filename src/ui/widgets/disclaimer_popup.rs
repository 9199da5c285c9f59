// src/ui/widgets/disclaimer_popup.rs

use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

const TERMS: [&str; 3] = [
    "Only scan hosts you own or are explicitly authorized to test.",
    "Respect the laws of your jurisdiction and of the target's.",
    "The authors accept no liability for misuse of this program.",
];

/// Modal authorized-use notice shown before the first scan.
pub fn render_disclaimer_popup(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from("AUTHORIZED USE ONLY".bold().yellow()).centered(),
        Line::from(""),
        Line::from(
            "Krypt Analyzer connects to TCP ports, sends ICMP echo requests and \
             issues HTTP requests against the target you enter.",
        ),
        Line::from(""),
        Line::from(vec![
            Span::raw("Probing systems without permission may be "),
            "illegal".bold().red(),
            Span::raw(" and is always unethical. By continuing you agree that:"),
        ]),
        Line::from(""),
    ];
    lines.extend(
        TERMS
            .iter()
            .enumerate()
            .map(|(i, term)| Line::from(format!(" {}. {}", i + 1, term))),
    );
    lines.push(Line::from(""));
    lines.push(
        Line::from(vec![
            "Enter".bold().yellow(),
            Span::raw(" accept and continue   "),
            "Esc".bold().yellow(),
            Span::raw(" quit"),
        ])
        .centered(),
    );

    let popup_area = centered_rect(64, 60, area);
    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Disclaimer ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::Red)),
        );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// A rectangle of `percent_x` by `percent_y` of `r`, centered in it.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(r);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_sits_in_the_middle() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(64, 60, area);
        assert_eq!(popup.width, 64);
        assert_eq!(popup.height, 30);
        assert_eq!(popup.x, 18);
        assert_eq!(popup.y, 10);
    }
}
