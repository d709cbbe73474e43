use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Quiz;

/// How a displayed quiz ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerResult {
    Correct,
    Incorrect,
    /// The session ended while the quiz was still on screen.
    NoAnswer,
}

impl AnswerResult {
    #[must_use]
    pub fn from_check(is_correct: bool) -> Self {
        if is_correct { Self::Correct } else { Self::Incorrect }
    }

    /// One-character mark used in history listings.
    #[must_use]
    pub fn mark(self) -> &'static str {
        match self {
            AnswerResult::Correct => "O",
            AnswerResult::Incorrect => "X",
            AnswerResult::NoAnswer => "-",
        }
    }
}

/// Record of a single displayed quiz, appended to the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub answered_at: DateTime<Utc>,
    pub result: AnswerResult,
    pub question: String,
    pub answer: String,
    pub explanation: String,
}

impl LogEntry {
    #[must_use]
    pub fn for_quiz(quiz: &Quiz, result: AnswerResult, answered_at: DateTime<Utc>) -> Self {
        Self {
            answered_at,
            result,
            question: quiz.question().to_owned(),
            answer: quiz.delimited_answer(),
            explanation: quiz.explanation().to_owned(),
        }
    }

    /// Rebuild the quiz this entry was written for.
    #[must_use]
    pub fn quiz(&self) -> Quiz {
        Quiz::from_delimited(self.question.clone(), &self.answer, self.explanation.clone())
    }
}
