mod log;
mod mode;
mod quiz;
mod source;

pub use log::{AnswerResult, LogEntry};
pub use mode::{ModeError, ModeKind, ModeLimits, PlayMode};
pub use quiz::{ANSWER_DELIMITER, Quiz};
pub use source::{
    CalendarQuiz, Generator, MAX_MULTIPLICATION_DIGITS, MultiplicationQuiz, Overview, QuizSource,
    QuizSourceError, StaticPool,
};
