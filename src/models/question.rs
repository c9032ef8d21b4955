use serde::{Deserialize, Serialize};

/// Minimum number of options a question must offer.
pub const MIN_OPTIONS: usize = 2;

/// A single multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "text")]
    pub question: String,
    pub options: Vec<String>,
    /// 0-based index into `options`.
    #[serde(alias = "correct_answer")]
    pub answer: usize,
}

impl Question {
    pub fn new(question: impl Into<String>, options: Vec<String>, answer: usize) -> Self {
        Self {
            question: question.into(),
            options,
            answer,
        }
    }

    /// The question shown when no question set could be loaded.
    pub fn placeholder() -> Self {
        Self::new(
            "No questions could be loaded. Is the question source available?",
            vec!["Yes".to_string(), "No".to_string()],
            1,
        )
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer
    }

    /// Checks the shape rules a loaded record must satisfy.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.options.len() < MIN_OPTIONS {
            return Err("question must offer at least 2 options");
        }

        if self.answer >= self.options.len() {
            return Err("answer index is outside the option list");
        }

        Ok(())
    }
}
