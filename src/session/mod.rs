//! Quiz session engine.
//!
//! [`Session`] owns the question set and all per-attempt state and moves
//! through `NotStarted -> InProgress -> Submitted`, back to `NotStarted`
//! only via [`Session::restart`]. Views read it through
//! [`Session::snapshot`] or subscribe to [`SessionEvent`]s.

mod countdown;
mod engine;
mod events;
mod review;

pub use countdown::{format_remaining, Countdown, TickOutcome};
pub use engine::{
    NavigatorCell, Session, SessionOutcome, SessionSnapshot, SessionState, SubmitSummary,
};
pub use events::{EventBus, SessionEvent, SubmitTrigger};
pub use review::{calculate_score, percentage, Review, ReviewEntry};
