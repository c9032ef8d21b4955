mod loader;

pub use loader::{
    parse_questions, questions_or_placeholder, validate_questions,
    JsonFileSource, LoadOutcome, QuestionSource, StaticSource, UnavailableSource,
};
