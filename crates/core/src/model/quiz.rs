/// Separator between accepted answers in the stored answer string.
pub const ANSWER_DELIMITER: char = '\t';

/// One question with its accepted answers and an optional explanation.
///
/// The accepted answers are fixed at construction. Matching is exact: no case folding
/// and no whitespace trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    question: String,
    answers: Vec<String>,
    explanation: String,
}

impl Quiz {
    /// Build a quiz from an explicit list of accepted answers.
    ///
    /// Duplicates are dropped, keeping the first occurrence so the display order is stable.
    #[must_use]
    pub fn new<I, S>(question: impl Into<String>, answers: I, explanation: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for answer in answers {
            let answer = answer.into();
            if !unique.contains(&answer) {
                unique.push(answer);
            }
        }
        Self {
            question: question.into(),
            answers: unique,
            explanation: explanation.into(),
        }
    }

    /// Build a quiz from the stored, tab-delimited answer format.
    ///
    /// Every segment counts, so `"cat\tdog\t"` accepts `cat`, `dog`, and the empty string.
    #[must_use]
    pub fn from_delimited(
        question: impl Into<String>,
        answer: &str,
        explanation: impl Into<String>,
    ) -> Self {
        Self::new(question, answer.split(ANSWER_DELIMITER), explanation)
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn accepted_answers(&self) -> &[String] {
        &self.answers
    }

    /// The accepted answers joined back into the stored format.
    #[must_use]
    pub fn delimited_answer(&self) -> String {
        self.answers.join(ANSWER_DELIMITER.to_string().as_str())
    }

    #[must_use]
    pub fn check_answer(&self, candidate: &str) -> bool {
        self.answers.iter().any(|answer| answer == candidate)
    }
}
