mod confirm;
mod quiz;
mod result;
mod welcome;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::models::Phase;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.phase() {
        Phase::NotStarted => welcome::render(frame, area, app),
        Phase::InProgress => {
            quiz::render(frame, area, app);
            if let Some(summary) = app.confirm_prompt() {
                confirm::render(frame, area, summary);
            }
        }
        Phase::Submitted => result::render(frame, area, app),
    }
}
