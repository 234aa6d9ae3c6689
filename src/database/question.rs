use std::fmt;

use crate::error::QuestionError;

/// Largest number of answers a question may carry: one per keyboard letter.
pub const MAX_ANSWERS: usize = 26;

/// A trivia question. Immutable once fetched; `correct_answer` is a
/// zero-based index into `answers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    answers: Vec<String>,
    correct_answer: usize,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} answers)", self.text, self.answers.len())
    }
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        answers: Vec<String>,
        correct_answer: usize,
    ) -> Result<Self, QuestionError> {
        if answers.len() < 2 {
            return Err(QuestionError::TooFewAnswers(answers.len()));
        }
        if answers.len() > MAX_ANSWERS {
            return Err(QuestionError::TooManyAnswers(answers.len()));
        }
        if correct_answer >= answers.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: correct_answer,
                len: answers.len(),
            });
        }

        Ok(Self {
            text: text.into(),
            answers,
            correct_answer,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }
}

/// Questions served when no database is configured.
pub fn fixture_questions() -> Vec<Question> {
    let raw: [(&str, &[&str], usize); 3] = [
        ("1.What is the color of sky?", &["orange", "blue", "green"], 1),
        ("2.How much is 2 + 5?", &["4", "10", "7", "8"], 2),
        (
            "3.What date is Christmas?",
            &["Dec 24", "Apr 15", "Jan 1", "Dec 25"],
            3,
        ),
    ];

    raw.into_iter()
        .filter_map(|(text, answers, correct)| {
            Question::new(text, answers.iter().map(|a| a.to_string()).collect(), correct).ok()
        })
        .collect()
}
