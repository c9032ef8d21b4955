mod phase;
mod question;

pub use phase::Phase;
pub use question::{Question, MIN_OPTIONS};
