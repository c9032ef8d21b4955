use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::session::{format_remaining, Review, ReviewEntry, SessionOutcome, SubmitTrigger};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (Some(outcome), Ok(review)) = (app.session().outcome(), app.session().build_review())
    else {
        return;
    };
    let grade_color = get_grade_color(outcome.percentage);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], &outcome, grade_color);
    render_question_breakdown(frame, chunks[2], &review, app.result_scroll());
    render_controls(frame, chunks[3]);
}

fn get_grade_color(percentage: u32) -> Color {
    match percentage {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn render_score_summary(
    frame: &mut Frame,
    area: Rect,
    outcome: &SessionOutcome,
    grade_color: Color,
) {
    let how = match outcome.trigger {
        SubmitTrigger::User => "submitted",
        SubmitTrigger::Timer => "time expired",
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({}%)",
                outcome.score, outcome.total, outcome.percentage
            ),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{}  ·  took {}  ·  {} left",
                how,
                format_elapsed(outcome.elapsed_secs),
                format_remaining(outcome.remaining_secs)
            ),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn answer_detail(entry: &ReviewEntry) -> String {
    let correct = entry
        .options
        .get(entry.correct_option_index)
        .map(String::as_str)
        .unwrap_or("");

    match entry.chosen_option_index {
        _ if entry.is_correct => correct.to_string(),
        Some(chosen) => format!(
            "{} → {}",
            entry.options.get(chosen).map(String::as_str).unwrap_or(""),
            correct
        ),
        None => format!("unanswered → {}", correct),
    }
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, review: &Review, scroll: usize) {
    let lines: Vec<Line> = review
        .entries
        .iter()
        .flat_map(|entry| {
            let (symbol, color) = match (entry.is_correct, entry.is_answered()) {
                (true, _) => ("+", Color::Green),
                (false, true) => ("-", Color::Red),
                (false, false) => ("?", Color::Yellow),
            };

            [
                Line::from(vec![
                    Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                    Span::styled(
                        format!("{:2}. ", entry.question_index + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        truncate_question(&entry.question_text),
                        Style::default().fg(Color::Gray),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("       {}", answer_detail(entry)),
                    Style::default().fg(color),
                )),
            ]
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll(((scroll * 2) as u16, 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r restart  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(chosen: Option<usize>) -> ReviewEntry {
        ReviewEntry {
            question_index: 0,
            question_text: "Capital of France?".to_string(),
            options: vec!["Paris".to_string(), "Rome".to_string()],
            correct_option_index: 0,
            chosen_option_index: chosen,
            is_correct: chosen == Some(0),
        }
    }

    #[test]
    fn test_answer_detail() {
        assert_eq!(answer_detail(&entry(Some(0))), "Paris");
        assert_eq!(answer_detail(&entry(Some(1))), "Rome → Paris");
        assert_eq!(answer_detail(&entry(None)), "unanswered → Paris");
    }

    #[test]
    fn test_format_elapsed_and_truncate() {
        assert_eq!(format_elapsed(3725), "62:05");
        assert_eq!(truncate_question("short"), "short");
        assert!(truncate_question(&"x".repeat(80)).ends_with("..."));
    }
}
