use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
    ])
    .split(area);

    let session = app.session();
    let summary = if session.is_loading() {
        "Loading questions...".to_string()
    } else {
        format!(
            "{} Questions · {} min",
            session.total_questions(),
            session.config().duration_secs.div_ceil(60)
        )
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "TIMED QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(summary, Style::default().fg(Color::DarkGray))),
    ];

    if session.load_outcome().is_fallback() && !session.is_loading() {
        content.push(Line::from(
            "Question set unavailable, showing a placeholder".fg(Color::Yellow),
        ));
    } else {
        content.push(Line::from(""));
    }

    content.extend([
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("to start".fg(Color::DarkGray)),
    ]);

    if let Some(notice) = app.notice() {
        content.push(Line::from(""));
        content.push(Line::from(notice.fg(Color::Red)));
    }

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}
