use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::LoadError;
use crate::models::Question;

/// Supplies an ordered question set on request.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Question>, LoadError>;
}

/// Reads a JSON array of `{question, options, answer}` records.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Question>, LoadError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(source) => {
                return Err(LoadError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        parse_questions(&content)
    }
}

/// An in-memory question set.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    questions: Vec<Question>,
}

impl StaticSource {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Question>, LoadError> {
        validate_questions(self.questions.clone())
    }
}

/// A source that is never reachable.
#[derive(Debug, Clone)]
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl QuestionSource for UnavailableSource {
    async fn fetch(&self) -> Result<Vec<Question>, LoadError> {
        Err(LoadError::Unavailable(self.reason.clone()))
    }
}

pub fn parse_questions(json: &str) -> Result<Vec<Question>, LoadError> {
    let questions: Vec<Question> = serde_json::from_str(json)?;
    validate_questions(questions)
}

/// Rejects empty sets and malformed records.
pub fn validate_questions(questions: Vec<Question>) -> Result<Vec<Question>, LoadError> {
    if questions.is_empty() {
        return Err(LoadError::Empty);
    }

    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|reason| LoadError::InvalidQuestion { index, reason })?;
    }

    Ok(questions)
}

/// How a load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// The placeholder set was substituted; carries the failure description.
    Fallback(String),
}

impl LoadOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadOutcome::Fallback(_))
    }
}

/// Turn a fetch result into a usable question set, substituting the
/// placeholder on any failure.
pub fn questions_or_placeholder(
    result: Result<Vec<Question>, LoadError>,
) -> (Vec<Question>, LoadOutcome) {
    match result.and_then(validate_questions) {
        Ok(questions) => (questions, LoadOutcome::Loaded),
        Err(err) => {
            tracing::warn!("question load failed, using placeholder: {}", err);
            (vec![Question::placeholder()], LoadOutcome::Fallback(err.to_string()))
        }
    }
}
