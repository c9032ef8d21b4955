use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::session::{format_remaining, SubmitSummary};

pub fn render(frame: &mut Frame, area: Rect, summary: &SubmitSummary) {
    let popup = centered(area, 46, 9);
    let unanswered = summary.total_count - summary.answered_count;

    let mut content = vec![
        Line::from(""),
        Line::from(format!(
            "Answered {} of {}",
            summary.answered_count, summary.total_count
        )),
        Line::from(format!(
            "Time remaining {}",
            format_remaining(summary.remaining_secs)
        )),
    ];
    if unanswered > 0 {
        content.push(Line::from(Span::styled(
            format!("{} unanswered will count as wrong", unanswered),
            Style::default().fg(Color::Yellow),
        )));
    } else {
        content.push(Line::from(""));
    }
    content.extend([
        Line::from(""),
        Line::from("y submit  ·  n keep going".fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::Cyan)
            .title(" Submit? ")
            .title_style(Style::default().fg(Color::Cyan).bold()),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
