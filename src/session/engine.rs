//! The session state machine.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{whole_seconds_between, Clock, SystemClock};
use crate::config::SessionConfig;
use crate::data::{questions_or_placeholder, LoadOutcome, QuestionSource};
use crate::error::{LoadError, SessionError};
use crate::models::{Phase, Question};

use super::countdown::{Countdown, TickOutcome};
use super::events::{EventBus, SessionEvent, SubmitTrigger};
use super::review::{calculate_score, percentage, Review};

/// Mutable per-attempt state. Replaced wholesale on restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    attempt_id: Uuid,
    phase: Phase,
    current_index: usize,
    answers: BTreeMap<usize, usize>,
    bookmarks: BTreeSet<usize>,
    countdown: Countdown,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    score: Option<usize>,
    trigger: Option<SubmitTrigger>,
}

impl SessionState {
    fn fresh(config: &SessionConfig) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            phase: Phase::NotStarted,
            current_index: 0,
            answers: BTreeMap::new(),
            bookmarks: BTreeSet::new(),
            countdown: Countdown::new(config.duration_secs, config.warning_threshold_secs),
            started_at: None,
            ended_at: None,
            score: None,
            trigger: None,
        }
    }
}

/// Returned by `request_submit` for the confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitSummary {
    pub answered_count: usize,
    pub total_count: usize,
    pub remaining_secs: u32,
}

/// Final figures of a submitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub elapsed_secs: u64,
    pub remaining_secs: u32,
    pub trigger: SubmitTrigger,
}

/// Per-index flags for painting a navigator grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigatorCell {
    pub index: usize,
    pub answered: bool,
    pub bookmarked: bool,
    pub current: bool,
}

/// Everything a view needs to render the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub attempt_id: Uuid,
    pub phase: Phase,
    pub loading: bool,
    pub current_index: usize,
    pub total: usize,
    /// `None` while a load is in flight.
    pub current_question: Option<Question>,
    pub selected_option: Option<usize>,
    pub remaining_secs: u32,
    pub warning: bool,
    pub answered_count: usize,
    pub navigator: Vec<NavigatorCell>,
}

/// A single timed quiz attempt over a fixed question set.
///
/// All mutation goes through the methods below. Every method that returns
/// `Err` leaves the session untouched.
pub struct Session {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    questions: Vec<Question>,
    load_outcome: LoadOutcome,
    loading: bool,
    state: SessionState,
    timer_generation: u64,
    events: EventBus,
}

impl Session {
    /// A session holding only the placeholder question, ready for `load`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: SessionState::fresh(&config),
            config,
            clock: Arc::new(SystemClock),
            questions: vec![Question::placeholder()],
            load_outcome: LoadOutcome::Fallback("no questions loaded yet".to_string()),
            loading: false,
            timer_generation: 0,
            events: EventBus::default(),
        }
    }

    /// A session over `questions`, falling back to the placeholder if the
    /// set is empty or malformed.
    pub fn with_questions(questions: Vec<Question>, config: SessionConfig) -> Self {
        let mut session = Self::new(config);
        session.apply_load(Ok(questions));
        session
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }

    // ----- loading -----

    /// Enter the loading sub-state. Only valid before the attempt starts.
    pub fn begin_load(&mut self) -> Result<(), SessionError> {
        self.require_phase(Phase::NotStarted, "load questions")?;
        self.loading = true;
        debug!("question load started");
        Ok(())
    }

    /// Install the result of a fetch. Failures are replaced by the
    /// placeholder set and never reported as errors.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<Question>, LoadError>,
    ) -> Result<&LoadOutcome, SessionError> {
        self.require_phase(Phase::NotStarted, "load questions")?;
        self.apply_load(result);
        Ok(&self.load_outcome)
    }

    /// `begin_load` + fetch + `finish_load`.
    pub async fn load_from(
        &mut self,
        source: &dyn QuestionSource,
    ) -> Result<&LoadOutcome, SessionError> {
        self.begin_load()?;
        let result = source.fetch().await;
        self.finish_load(result)
    }

    fn apply_load(&mut self, result: Result<Vec<Question>, LoadError>) {
        let (questions, outcome) = questions_or_placeholder(result);
        self.questions = questions;
        self.load_outcome = outcome;
        self.loading = false;
        self.state = SessionState::fresh(&self.config);

        info!(
            total = self.questions.len(),
            fallback = self.load_outcome.is_fallback(),
            "questions loaded"
        );
        self.events.emit(SessionEvent::Loaded {
            total: self.questions.len(),
            fallback: self.load_outcome.is_fallback(),
        });
    }

    // ----- lifecycle -----

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.require_phase(Phase::NotStarted, "start")?;
        if self.loading {
            return Err(SessionError::StillLoading);
        }

        let now = self.clock.now();
        let state = &mut self.state;
        state.phase = Phase::InProgress;
        state.started_at = Some(now);
        state.current_index = 0;
        state.countdown =
            Countdown::new(self.config.duration_secs, self.config.warning_threshold_secs);
        self.timer_generation += 1;

        info!(
            attempt = %state.attempt_id,
            questions = self.questions.len(),
            duration_secs = self.config.duration_secs,
            "session started"
        );
        self.events.emit(SessionEvent::Started {
            duration_secs: self.config.duration_secs,
        });

        if self.state.countdown.warning() {
            let remaining_secs = self.state.countdown.remaining_secs();
            warn!(remaining_secs, "low time warning");
            self.events
                .emit(SessionEvent::WarningThresholdCrossed { remaining_secs });
        }
        Ok(())
    }

    /// Discard the attempt and return to `NotStarted` with the same questions.
    ///
    /// Also leaves the loading sub-state, so a fetch that was abandoned
    /// mid-flight cannot block the next `start`.
    pub fn restart(&mut self) {
        let previous = self.state.phase;
        self.state = SessionState::fresh(&self.config);
        self.loading = false;
        self.timer_generation += 1;

        info!(attempt = %self.state.attempt_id, from = %previous, "session restarted");
        self.events.emit(SessionEvent::Restarted);
    }

    // ----- answering and navigation -----

    pub fn select_option(
        &mut self,
        question_index: usize,
        option_index: usize,
    ) -> Result<(), SessionError> {
        self.require_in_progress("select an option")?;
        let question = self.question_checked(question_index)?;
        if option_index >= question.option_count() {
            return Err(SessionError::OptionOutOfRange {
                question: question_index,
                option: option_index,
                options: question.option_count(),
            });
        }

        self.state.answers.insert(question_index, option_index);

        debug!(question = question_index, option = option_index, "answer recorded");
        self.events.emit(SessionEvent::Answered {
            question_index,
            option_index,
        });
        Ok(())
    }

    /// Answer the question currently shown.
    pub fn select_current(&mut self, option_index: usize) -> Result<(), SessionError> {
        self.select_option(self.state.current_index, option_index)
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_in_progress("navigate")?;
        self.question_checked(index)?;

        self.state.current_index = index;

        debug!(index, "navigated");
        self.events.emit(SessionEvent::Navigated { index });
        Ok(())
    }

    /// Move forward one question. `Ok(false)` on the last question.
    pub fn next(&mut self) -> Result<bool, SessionError> {
        self.require_in_progress("navigate")?;
        let target = self.state.current_index + 1;
        if target >= self.questions.len() {
            return Ok(false);
        }
        self.go_to(target)?;
        Ok(true)
    }

    /// Move back one question. `Ok(false)` on the first question.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        self.require_in_progress("navigate")?;
        let Some(target) = self.state.current_index.checked_sub(1) else {
            return Ok(false);
        };
        self.go_to(target)?;
        Ok(true)
    }

    /// Flip the bookmark on `index`. Returns whether it is now bookmarked.
    pub fn toggle_bookmark(&mut self, index: usize) -> Result<bool, SessionError> {
        self.require_in_progress("bookmark")?;
        self.question_checked(index)?;

        let bookmarked = if self.state.bookmarks.remove(&index) {
            false
        } else {
            self.state.bookmarks.insert(index);
            true
        };

        debug!(index, bookmarked, "bookmark toggled");
        self.events.emit(SessionEvent::BookmarkToggled { index, bookmarked });
        Ok(bookmarked)
    }

    // ----- timing -----

    /// Consume one heartbeat second. Submits automatically when the
    /// countdown reaches zero.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        self.require_in_progress("tick")?;

        let outcome = self.state.countdown.tick();
        self.events.emit(SessionEvent::Ticked {
            remaining_secs: outcome.remaining_secs,
        });

        if outcome.warning_crossed {
            warn!(remaining_secs = outcome.remaining_secs, "low time warning");
            self.events.emit(SessionEvent::WarningThresholdCrossed {
                remaining_secs: outcome.remaining_secs,
            });
        }

        if outcome.expired {
            self.auto_submit();
        }

        Ok(outcome)
    }

    /// Like `tick`, but ignores ticks from a heartbeat that has been
    /// retired by a submit or restart.
    pub fn tick_for(&mut self, generation: u64) -> Result<Option<TickOutcome>, SessionError> {
        if generation != self.timer_generation || self.state.phase != Phase::InProgress {
            debug!(generation, current = self.timer_generation, "stale tick dropped");
            return Ok(None);
        }
        self.tick().map(Some)
    }

    /// Identifies the heartbeat allowed to drive the countdown. Changes on
    /// start, submit and restart.
    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    /// Whether a heartbeat should currently be running.
    pub fn timer_running(&self) -> bool {
        self.state.phase == Phase::InProgress
    }

    // ----- submission -----

    /// Read-only summary for a confirmation prompt.
    pub fn request_submit(&self) -> Result<SubmitSummary, SessionError> {
        self.require_in_progress("request submission")?;
        Ok(self.submit_summary())
    }

    fn submit_summary(&self) -> SubmitSummary {
        SubmitSummary {
            answered_count: self.state.answers.len(),
            total_count: self.questions.len(),
            remaining_secs: self.state.countdown.remaining_secs(),
        }
    }

    /// User-confirmed submission.
    pub fn confirm_submit(&mut self) -> Result<SessionOutcome, SessionError> {
        self.require_in_progress("submit")?;
        Ok(self.submit(SubmitTrigger::User))
    }

    /// Timer-forced submission. A no-op returning `None` unless in progress.
    pub fn auto_submit(&mut self) -> Option<SessionOutcome> {
        if self.state.phase != Phase::InProgress {
            return None;
        }
        Some(self.submit(SubmitTrigger::Timer))
    }

    fn submit(&mut self, trigger: SubmitTrigger) -> SessionOutcome {
        let now = self.clock.now();
        let score = calculate_score(&self.questions, &self.state.answers);

        let state = &mut self.state;
        state.ended_at = Some(now);
        state.score = Some(score);
        state.trigger = Some(trigger);
        state.phase = Phase::Submitted;
        self.timer_generation += 1;

        let outcome = self.outcome_unchecked(score, trigger);
        info!(
            attempt = %self.state.attempt_id,
            ?trigger,
            score,
            total = outcome.total,
            elapsed_secs = outcome.elapsed_secs,
            "session submitted"
        );
        self.events.emit(SessionEvent::Submitted {
            trigger,
            score,
            total: outcome.total,
        });
        outcome
    }

    /// Final figures, once submitted.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        let score = self.state.score?;
        let trigger = self.state.trigger?;
        Some(self.outcome_unchecked(score, trigger))
    }

    fn outcome_unchecked(&self, score: usize, trigger: SubmitTrigger) -> SessionOutcome {
        let total = self.questions.len();
        SessionOutcome {
            score,
            total,
            percentage: percentage(score, total),
            elapsed_secs: self.elapsed_secs().unwrap_or(0),
            remaining_secs: self.state.countdown.remaining_secs(),
            trigger,
        }
    }

    /// Per-question correctness report. Only available once submitted.
    pub fn build_review(&self) -> Result<Review, SessionError> {
        self.require_phase(Phase::Submitted, "build a review")?;
        Ok(Review::build(&self.questions, &self.state.answers))
    }

    // ----- queries -----

    /// While a load is in flight the snapshot describes no questions at all.
    pub fn snapshot(&self) -> SessionSnapshot {
        let current = self.state.current_index;
        let (current_question, total, selected_option, answered_count, navigator) =
            if self.loading {
                (None, 0, None, 0, Vec::new())
            } else {
                (
                    self.questions.get(current).cloned(),
                    self.questions.len(),
                    self.answer_for(current),
                    self.state.answers.len(),
                    self.navigator(),
                )
            };

        SessionSnapshot {
            attempt_id: self.state.attempt_id,
            phase: self.state.phase,
            loading: self.loading,
            current_index: current,
            total,
            current_question,
            selected_option,
            remaining_secs: self.state.countdown.remaining_secs(),
            warning: self.state.countdown.warning(),
            answered_count,
            navigator,
        }
    }

    pub fn navigator(&self) -> Vec<NavigatorCell> {
        (0..self.questions.len())
            .map(|index| NavigatorCell {
                index,
                answered: self.is_answered(index),
                bookmarked: self.is_bookmarked(index),
                current: self.is_current(index),
            })
            .collect()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn attempt_id(&self) -> Uuid {
        self.state.attempt_id
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.state.current_index]
    }

    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.state.answers
    }

    pub fn answer_for(&self, index: usize) -> Option<usize> {
        self.state.answers.get(&index).copied()
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.state.answers.contains_key(&index)
    }

    pub fn is_bookmarked(&self, index: usize) -> bool {
        self.state.bookmarks.contains(&index)
    }

    pub fn is_current(&self, index: usize) -> bool {
        self.state.current_index == index
    }

    pub fn bookmarks(&self) -> &BTreeSet<usize> {
        &self.state.bookmarks
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.countdown.remaining_secs()
    }

    pub fn warning(&self) -> bool {
        self.state.countdown.warning()
    }

    /// Only meaningful once submitted.
    pub fn score(&self) -> Option<usize> {
        self.state.score
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.state.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.state.ended_at
    }

    /// Wall-clock seconds of the attempt, up to now if still running.
    pub fn elapsed_secs(&self) -> Option<u64> {
        let started = self.state.started_at?;
        let ended = self.state.ended_at.unwrap_or_else(|| self.clock.now());
        Some(whole_seconds_between(started, ended))
    }

    // ----- guards -----

    fn require_phase(&self, phase: Phase, operation: &'static str) -> Result<(), SessionError> {
        if self.state.phase != phase {
            return Err(SessionError::InvalidTransition {
                operation,
                phase: self.state.phase,
            });
        }
        Ok(())
    }

    fn require_in_progress(&self, operation: &'static str) -> Result<(), SessionError> {
        self.require_phase(Phase::InProgress, operation)
    }

    fn question_checked(&self, index: usize) -> Result<&Question, SessionError> {
        self.questions
            .get(index)
            .ok_or(SessionError::QuestionOutOfRange {
                index,
                total: self.questions.len(),
            })
    }
}
