//! Scoring and the post-submission review projection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Question;

/// Count of questions whose recorded choice is the correct option.
pub fn calculate_score(questions: &[Question], answers: &BTreeMap<usize, usize>) -> usize {
    answers
        .iter()
        .filter(|(index, option)| questions.get(**index).is_some_and(|q| q.is_correct(**option)))
        .count()
}

/// `round(100 * score / total)` with halves rounded up, in integer math.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }

    let rounded = (200 * score + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// One row of the review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub question_index: usize,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    /// `None` when the question was never answered.
    pub chosen_option_index: Option<usize>,
    pub is_correct: bool,
}

impl ReviewEntry {
    pub fn is_answered(&self) -> bool {
        self.chosen_option_index.is_some()
    }
}

/// Per-question correctness report for a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub entries: Vec<ReviewEntry>,
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
}

impl Review {
    pub fn build(questions: &[Question], answers: &BTreeMap<usize, usize>) -> Self {
        let entries: Vec<ReviewEntry> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let chosen = answers.get(&index).copied();
                ReviewEntry {
                    question_index: index,
                    question_text: question.question.clone(),
                    options: question.options.clone(),
                    correct_option_index: question.answer,
                    chosen_option_index: chosen,
                    is_correct: chosen == Some(question.answer),
                }
            })
            .collect();

        let score = entries.iter().filter(|entry| entry.is_correct).count();
        let total = entries.len();

        Self {
            entries,
            score,
            total,
            percentage: percentage(score, total),
        }
    }

    pub fn unanswered_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_answered()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, &answer)| {
                Question::new(
                    format!("Question {}", i + 1),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    answer,
                )
            })
            .collect()
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percentage(7, 10), 70);
        assert_eq!(percentage(9, 10), 90);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 1), 0);
        assert_eq!(percentage(1, 1), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_unanswered_is_incorrect() {
        let questions = questions(&[0, 1]);
        let answers = BTreeMap::from([(0, 0)]);

        let review = Review::build(&questions, &answers);

        assert_eq!(review.score, 1);
        assert_eq!(review.unanswered_count(), 1);
        assert!(review.entries[0].is_correct);
        assert_eq!(review.entries[1].chosen_option_index, None);
        assert!(!review.entries[1].is_correct);
        assert_eq!(review.score, calculate_score(&questions, &answers));
    }
}
