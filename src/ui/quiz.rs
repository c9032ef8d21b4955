use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::session::{format_remaining, NavigatorCell, SessionSnapshot};

const NAVIGATOR_COLUMNS: usize = 10;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let snapshot = app.session().snapshot();
    let Some(question) = snapshot.current_question.as_ref() else {
        let waiting = Paragraph::new("Loading questions...")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(waiting, area);
        return;
    };

    let navigator_rows = snapshot.total.div_ceil(NAVIGATOR_COLUMNS) as u16;
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(navigator_rows + 2),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], &snapshot);
    render_question_text(frame, chunks[1], &question.question);
    render_options(
        frame,
        chunks[2],
        &question.options,
        app.option_cursor(),
        snapshot.selected_option,
    );
    render_navigator(frame, chunks[3], &snapshot.navigator);
    render_notice(frame, chunks[4], app.notice());
    render_controls(frame, chunks[5]);
}

fn render_header(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(12)]).areas(area);

    let bookmarked = snapshot
        .navigator
        .get(snapshot.current_index)
        .is_some_and(|cell| cell.bookmarked);
    let mut progress = vec![Span::styled(
        format!(
            "{}/{}  ·  {} answered",
            snapshot.current_index + 1,
            snapshot.total,
            snapshot.answered_count
        ),
        Style::default().fg(Color::DarkGray),
    )];
    if bookmarked {
        progress.push(Span::styled("  ★", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(progress)), left);

    let timer_style = if snapshot.warning {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::Cyan)
    };
    let timer = Paragraph::new(format_remaining(snapshot.remaining_secs))
        .alignment(Alignment::Right)
        .style(timer_style);
    frame.render_widget(timer, right);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    char::from_digit(index as u32 + 10, 36)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    options: &[String],
    cursor: usize,
    chosen: Option<usize>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == cursor;
        let is_chosen = chosen == Some(index);
        let style = match (is_cursor, is_chosen) {
            (_, true) => Style::default().fg(Color::Green).bold(),
            (true, false) => Style::default().fg(Color::Cyan).bold(),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let check = if is_chosen { "●" } else { "○" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} {} ", marker, check), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn navigator_span(cell: &NavigatorCell) -> Span<'static> {
    let text = if cell.bookmarked {
        format!("{:>3}*", cell.index + 1)
    } else {
        format!("{:>3} ", cell.index + 1)
    };

    let mut style = if cell.answered {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    if cell.bookmarked {
        style = style.fg(Color::Yellow);
    }
    if cell.current {
        style = style.reversed().bold();
    }

    Span::styled(text, style)
}

fn render_navigator(frame: &mut Frame, area: Rect, cells: &[NavigatorCell]) {
    let lines: Vec<Line> = cells
        .chunks(NAVIGATOR_COLUMNS)
        .map(|row| Line::from(row.iter().map(navigator_span).collect::<Vec<_>>()))
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_notice(frame: &mut Frame, area: Rect, notice: Option<&str>) {
    if let Some(notice) = notice {
        let widget = Paragraph::new(notice)
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(widget, area);
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k move  ·  enter answer  ·  h/l prev/next  ·  u/m unanswered/marked  ·  b mark  ·  s submit  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
        assert_eq!(option_label(25), 'Z');
        assert_eq!(option_label(26), '?');
    }
}
