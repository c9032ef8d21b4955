use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::error::{QuizError, SessionError};
use crate::heartbeat::{Heartbeat, Tick};
use crate::models::Phase;
use crate::session::{format_remaining, Session, SessionEvent, SubmitSummary, SubmitTrigger};

/// Drives one [`Session`] for the terminal UI.
///
/// Owns the heartbeat that feeds the countdown and the view-only state the
/// session does not care about (option cursor, confirm prompt, scroll).
pub struct App {
    session: Session,
    heartbeat: Option<Heartbeat>,
    tick_tx: mpsc::UnboundedSender<Tick>,
    tick_rx: mpsc::UnboundedReceiver<Tick>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    option_cursor: usize,
    confirm: Option<SubmitSummary>,
    result_scroll: usize,
    notice: Option<String>,
    review_export: Option<PathBuf>,
}

impl App {
    pub fn new(mut session: Session) -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let events = session.subscribe();

        Self {
            session,
            heartbeat: None,
            tick_tx,
            tick_rx,
            events,
            option_cursor: 0,
            confirm: None,
            result_scroll: 0,
            notice: None,
            review_export: None,
        }
    }

    /// Write the review as JSON to `path` whenever an attempt is submitted.
    pub fn with_review_export(mut self, path: PathBuf) -> Self {
        self.review_export = Some(path);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn option_cursor(&self) -> usize {
        self.option_cursor
    }

    pub fn confirm_prompt(&self) -> Option<&SubmitSummary> {
        self.confirm.as_ref()
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn heartbeat_running(&self) -> bool {
        self.heartbeat.as_ref().is_some_and(Heartbeat::is_running)
    }

    /// Apply pending ticks and session events. Call once per frame.
    pub fn pump(&mut self) {
        while let Ok(tick) = self.tick_rx.try_recv() {
            self.handle_tick(tick);
        }
        self.drain_events();
        self.sync_heartbeat();
    }

    pub fn handle_tick(&mut self, tick: Tick) {
        let result = self.session.tick_for(tick.generation);
        self.report(result);
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::WarningThresholdCrossed { remaining_secs } => {
                    self.notice = Some(format!(
                        "{} remaining",
                        format_remaining(remaining_secs)
                    ));
                }
                SessionEvent::Submitted { trigger, .. } => {
                    self.on_submitted(trigger);
                }
                SessionEvent::Started { .. } | SessionEvent::Restarted => {
                    self.option_cursor = 0;
                    self.confirm = None;
                    self.result_scroll = 0;
                    self.notice = None;
                }
                SessionEvent::Navigated { .. } => {
                    self.option_cursor = self
                        .session
                        .answer_for(self.session.current_index())
                        .unwrap_or(0);
                }
                _ => {}
            }
        }
    }

    fn on_submitted(&mut self, trigger: SubmitTrigger) {
        self.stop_heartbeat();
        self.confirm = None;
        self.result_scroll = 0;
        self.notice = match trigger {
            SubmitTrigger::Timer => Some("Time is up. Your answers were submitted.".to_string()),
            SubmitTrigger::User => None,
        };

        if let Err(e) = self.export_review() {
            tracing::error!("review export failed: {}", e);
            self.notice = Some(e.to_string());
        }
    }

    /// Keep exactly one heartbeat alive while the countdown should run.
    fn sync_heartbeat(&mut self) {
        if !self.session.timer_running() {
            self.stop_heartbeat();
            return;
        }

        let generation = self.session.timer_generation();
        if self.heartbeat.as_ref().map(Heartbeat::generation) == Some(generation) {
            return;
        }

        self.stop_heartbeat();
        self.heartbeat = Some(Heartbeat::spawn(
            self.session.config().tick_interval(),
            generation,
            self.tick_tx.clone(),
        ));
    }

    fn stop_heartbeat(&mut self) {
        if let Some(mut heartbeat) = self.heartbeat.take() {
            heartbeat.stop();
        }
    }

    fn export_review(&self) -> Result<(), QuizError> {
        let Some(path) = &self.review_export else {
            return Ok(());
        };
        let review = match self.session.build_review() {
            Ok(review) => review,
            Err(_) => return Ok(()),
        };

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &review)?;
        tracing::info!("review written to {}", path.display());
        Ok(())
    }

    fn report<T>(&mut self, result: Result<T, SessionError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("rejected: {}", e);
                self.notice = Some(e.to_string());
                None
            }
        }
    }

    // ----- user intents -----

    pub fn start_quiz(&mut self) {
        let result = self.session.start();
        self.report(result);
        self.pump();
    }

    pub fn select_next_option(&mut self) {
        let count = self.session.current_question().option_count();
        self.option_cursor = (self.option_cursor + 1) % count;
    }

    pub fn select_previous_option(&mut self) {
        let count = self.session.current_question().option_count();
        self.option_cursor = (self.option_cursor + count - 1) % count;
    }

    /// Record the option under the cursor for the current question.
    pub fn answer_with_cursor(&mut self) {
        let result = self.session.select_current(self.option_cursor);
        self.report(result);
    }

    /// Record option `index` directly (number keys).
    pub fn answer_option(&mut self, index: usize) {
        match self.session.select_current(index) {
            Ok(()) => self.option_cursor = index,
            Err(SessionError::OptionOutOfRange { .. }) => {
                self.notice = Some(format!("No option {}", index + 1));
            }
            Err(e) => {
                self.report::<()>(Err(e));
            }
        }
    }

    pub fn next_question(&mut self) {
        let result = self.session.next();
        self.report(result);
        self.pump();
    }

    pub fn previous_question(&mut self) {
        let result = self.session.previous();
        self.report(result);
        self.pump();
    }

    pub fn jump_to(&mut self, index: usize) {
        let result = self.session.go_to(index);
        self.report(result);
        self.pump();
    }

    /// Jump to the next question after the current one matching `pred`,
    /// wrapping around. Stays put if none matches.
    fn jump_to_next_matching(&mut self, pred: impl Fn(&Session, usize) -> bool) -> bool {
        let total = self.session.total_questions();
        let current = self.session.current_index();
        let target = (1..=total)
            .map(|offset| (current + offset) % total)
            .find(|&index| pred(&self.session, index));

        match target {
            Some(index) => {
                self.jump_to(index);
                true
            }
            None => false,
        }
    }

    pub fn jump_to_next_unanswered(&mut self) {
        if !self.jump_to_next_matching(|s, i| !s.is_answered(i)) {
            self.notice = Some("Every question is answered".to_string());
        }
    }

    pub fn jump_to_next_bookmark(&mut self) {
        if !self.jump_to_next_matching(Session::is_bookmarked) {
            self.notice = Some("No bookmarked questions".to_string());
        }
    }

    pub fn toggle_bookmark(&mut self) {
        let result = self.session.toggle_bookmark(self.session.current_index());
        self.report(result);
    }

    /// Open the confirmation prompt.
    pub fn request_submit(&mut self) {
        let result = self.session.request_submit();
        self.confirm = self.report(result);
    }

    pub fn cancel_submit(&mut self) {
        self.confirm = None;
    }

    pub fn confirm_submit(&mut self) {
        let result = self.session.confirm_submit();
        self.report(result);
        self.pump();
    }

    pub fn restart(&mut self) {
        self.session.restart();
        self.pump();
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self.session.total_questions().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::SessionConfig;
    use crate::models::Question;

    fn app(duration_secs: u32) -> App {
        let questions = (0..3)
            .map(|i| Question::new(format!("Q{}", i), vec!["x".into(), "y".into()], 1))
            .collect();
        App::new(Session::with_questions(
            questions,
            SessionConfig::with_duration(duration_secs),
        ))
    }

    #[tokio::test]
    async fn test_heartbeat_follows_phase() {
        let mut app = app(60);
        assert!(!app.heartbeat_running());

        app.start_quiz();
        assert!(app.heartbeat_running());

        app.request_submit();
        assert!(app.confirm_prompt().is_some());
        app.confirm_submit();
        assert_eq!(app.phase(), Phase::Submitted);
        assert!(!app.heartbeat_running());
        assert!(app.confirm_prompt().is_none());

        app.restart();
        assert_eq!(app.phase(), Phase::NotStarted);
        assert!(!app.heartbeat_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_submits_through_heartbeat() {
        let mut app = app(2);
        app.start_quiz();
        app.answer_option(1);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        app.pump();

        assert_eq!(app.phase(), Phase::Submitted);
        assert_eq!(app.session().remaining_secs(), 0);
        assert_eq!(app.session().score(), Some(1));
        assert!(app.notice().is_some_and(|n| n.starts_with("Time is up")));
        assert!(!app.heartbeat_running());
    }

    #[tokio::test]
    async fn test_rejections_become_notices() {
        let mut app = app(60);
        app.toggle_bookmark();
        assert!(app.notice().is_some_and(|n| n.contains("not started")));

        app.start_quiz();
        app.answer_option(5);
        assert_eq!(app.notice(), Some("No option 6"));
        assert!(!app.session().is_answered(0));
    }

    #[tokio::test]
    async fn test_number_keys_report_phase_errors() {
        let mut app = app(600);
        app.answer_option(0);
        assert!(app.notice().is_some_and(|n| n.contains("not started")));

        app.start_quiz();
        app.confirm_submit();
        app.answer_option(0);
        assert!(app.notice().is_some_and(|n| n.contains("submitted")));
        assert!(!app.session().is_answered(0));
    }

    #[tokio::test]
    async fn test_jump_helpers() {
        let mut app = app(60);
        app.start_quiz();
        app.answer_option(0);

        app.jump_to_next_unanswered();
        assert_eq!(app.session().current_index(), 1);

        app.jump_to_next_bookmark();
        assert_eq!(app.notice(), Some("No bookmarked questions"));

        app.toggle_bookmark();
        app.jump_to(0);
        app.jump_to_next_bookmark();
        assert_eq!(app.session().current_index(), 1);
    }

    #[tokio::test]
    async fn test_review_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.json");
        let mut app = app(60).with_review_export(path.clone());

        app.start_quiz();
        app.answer_option(1);
        app.confirm_submit();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["score"], 1);
        assert_eq!(json["total"], 3);
        assert_eq!(json["entries"][1]["chosen_option_index"], serde_json::Value::Null);
    }
}
