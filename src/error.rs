//! Error types for the quiz session and its collaborators.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::Phase;

/// Conditions reported by session operations.
///
/// Every variant leaves the session exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The operation is not allowed in the current phase.
    #[error("cannot {operation} while the session is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    /// A question index outside `0..total`.
    #[error("question {index} is out of range (session has {total} questions)")]
    QuestionOutOfRange { index: usize, total: usize },

    /// An option index outside the question's option list.
    #[error("option {option} is out of range for question {question} ({options} options)")]
    OptionOutOfRange {
        question: usize,
        option: usize,
        options: usize,
    },

    /// A question load is still in flight.
    #[error("questions are still loading")]
    StillLoading,
}

/// Failures a question source can report. Never escapes the session load.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse question set: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question set is empty")]
    Empty,

    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: &'static str },

    #[error("question source unavailable: {0}")]
    Unavailable(String),
}

/// Problems with the session configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Error type for running a quiz end to end.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to export review: {0}")]
    Export(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_messages() {
        let err = SessionError::InvalidTransition {
            operation: "select an option",
            phase: Phase::NotStarted,
        };
        assert_eq!(
            err.to_string(),
            "cannot select an option while the session is not started"
        );

        let err = SessionError::QuestionOutOfRange { index: 10, total: 10 };
        assert!(err.to_string().contains("question 10"));
    }
}
