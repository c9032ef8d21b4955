//! # timed-quiz
//!
//! A timed, multiple-choice assessment session for the terminal.
//!
//! The core is [`Session`], a single-owner state machine that records
//! answers and bookmarks, counts down a fixed duration, submits on
//! confirmation or when time runs out, and projects a per-question review.
//! It performs no I/O and does not schedule anything itself: a
//! [`Heartbeat`] delivers ticks and a [`Clock`] supplies timestamps.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use timed_quiz::{JsonFileSource, Quiz, QuizError, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let source = JsonFileSource::new("questions.json");
//!     let quiz = Quiz::from_source(&source, SessionConfig::default()).await;
//!     quiz.run()?;
//!     Ok(())
//! }
//! ```
//!
//! Driving a session directly:
//!
//! ```rust
//! use timed_quiz::{Phase, Question, Session, SessionConfig};
//!
//! let questions = vec![Question::new("2 + 2?", vec!["3".into(), "4".into()], 1)];
//! let mut session = Session::with_questions(questions, SessionConfig::with_duration(60));
//!
//! session.start().unwrap();
//! session.select_option(0, 1).unwrap();
//! let outcome = session.confirm_submit().unwrap();
//!
//! assert_eq!(session.phase(), Phase::Submitted);
//! assert_eq!(outcome.percentage, 100);
//! ```

mod app;
pub mod clock;
pub mod config;
mod data;
pub mod error;
pub mod heartbeat;
mod models;
pub mod session;
pub mod terminal;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

pub use app::App;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use data::{
    parse_questions, validate_questions, JsonFileSource, LoadOutcome,
    QuestionSource, StaticSource, UnavailableSource,
};
pub use error::{ConfigError, LoadError, QuizError, SessionError};
pub use heartbeat::{Heartbeat, Tick};
pub use models::{Phase, Question, MIN_OPTIONS};
pub use session::{
    Review, ReviewEntry, Session, SessionEvent, SessionOutcome, SessionSnapshot, SubmitSummary,
    SubmitTrigger,
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A quiz ready to run in the terminal.
pub struct Quiz {
    app: App,
}

impl Quiz {
    /// Create a quiz from an already loaded question set.
    pub fn new(questions: Vec<Question>, config: SessionConfig) -> Self {
        Self {
            app: App::new(Session::with_questions(questions, config)),
        }
    }

    /// Fetch questions from `source`. A failing source yields the
    /// placeholder question rather than an error.
    pub async fn from_source(source: &dyn QuestionSource, config: SessionConfig) -> Self {
        let mut session = Session::new(config);
        if let Err(e) = session.load_from(source).await {
            tracing::warn!("could not load questions: {}", e);
        }
        Self {
            app: App::new(session),
        }
    }

    /// Write the review JSON to `path` after each submitted attempt.
    pub fn with_review_export(mut self, path: PathBuf) -> Self {
        self.app = self.app.with_review_export(path);
        self
    }

    /// Run the quiz in the terminal until the user quits.
    ///
    /// Must be called from within a tokio runtime; the countdown heartbeat
    /// is a tokio task.
    pub fn run(mut self) -> Result<(), QuizError> {
        let mut term = terminal::TerminalGuard::init()?;
        let result = run_event_loop(&mut term, &mut self.app);
        term.restore()?;
        result
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

fn run_event_loop(terminal: &mut terminal::QuizTerminal, app: &mut App) -> Result<(), QuizError> {
    loop {
        app.pump();
        terminal.draw(|frame| ui::render(frame, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if handle_input(app, key.code) {
                break;
            }
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.phase() {
        Phase::NotStarted => handle_welcome_input(app, key),
        Phase::InProgress if app.confirm_prompt().is_some() => handle_confirm_input(app, key),
        Phase::InProgress => handle_quiz_input(app, key),
        Phase::Submitted => handle_result_input(app, key),
    }
}

fn handle_welcome_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Enter => {
            app.start_quiz();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.answer_with_cursor(),
        KeyCode::Char(c @ '1'..='9') => app.answer_option(c as usize - '1' as usize),
        KeyCode::Left | KeyCode::Char('h') => app.previous_question(),
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Home => app.jump_to(0),
        KeyCode::End => app.jump_to(app.session().total_questions() - 1),
        KeyCode::Char('u') => app.jump_to_next_unanswered(),
        KeyCode::Char('m') => app.jump_to_next_bookmark(),
        KeyCode::Char('b') => app.toggle_bookmark(),
        KeyCode::Char('s') => app.request_submit(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_confirm_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_submit(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_submit(),
        _ => {}
    }
    false
}

fn handle_result_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_results_down();
            false
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_results_up();
            false
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.restart();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Quiz {
        let questions = (0..4)
            .map(|i| Question::new(format!("Q{}", i), vec!["a".into(), "b".into()], 0))
            .collect();
        Quiz::new(questions, SessionConfig::with_duration(120))
    }

    #[tokio::test]
    async fn test_key_flow_to_results_and_back() {
        let mut quiz = quiz();
        let app = quiz.app_mut();

        assert!(!handle_input(app, KeyCode::Enter));
        assert_eq!(app.phase(), Phase::InProgress);

        handle_input(app, KeyCode::Char('1'));
        handle_input(app, KeyCode::Char('l'));
        handle_input(app, KeyCode::Char('j'));
        handle_input(app, KeyCode::Enter);
        handle_input(app, KeyCode::Char('b'));
        handle_input(app, KeyCode::End);
        assert_eq!(app.session().current_index(), 3);
        assert_eq!(app.session().answer_for(1), Some(1));
        assert!(app.session().is_bookmarked(1));

        handle_input(app, KeyCode::Char('s'));
        handle_input(app, KeyCode::Char('q'));
        assert_eq!(app.phase(), Phase::InProgress, "q is ignored by the confirm prompt");
        handle_input(app, KeyCode::Char('y'));
        assert_eq!(app.phase(), Phase::Submitted);
        assert_eq!(app.session().score(), Some(1));

        handle_input(app, KeyCode::Char('r'));
        assert_eq!(app.phase(), Phase::NotStarted);
        assert!(handle_input(app, KeyCode::Char('q')));
    }

    #[tokio::test]
    async fn test_from_source_falls_back() {
        let quiz = Quiz::from_source(
            &UnavailableSource::new("offline"),
            SessionConfig::default(),
        )
        .await;
        assert_eq!(quiz.app().session().questions(), &[Question::placeholder()]);
    }
}
