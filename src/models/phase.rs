use std::fmt;

use serde::Serialize;

/// Top-level lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    /// Loaded (or loading), waiting for `start`.
    #[default]
    NotStarted,
    /// Countdown running, answers accepted.
    InProgress,
    /// Terminal until `restart`.
    Submitted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "not started",
            Phase::InProgress => "in progress",
            Phase::Submitted => "submitted",
        };
        f.write_str(name)
    }
}
