use async_trait::async_trait;
use quiz_core::model::{LogEntry, Overview, Quiz};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("quiz bank has no overview record")]
    MissingOverview,

    #[error("quiz bank has no quizzes")]
    EmptyQuizBank,

    #[error("log sink is closed")]
    Closed,

    #[error("log sink unavailable: {0}")]
    Unavailable(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Whether the error describes a malformed quiz bank rather than an I/O failure.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, StorageError::MissingOverview | StorageError::EmptyQuizBank)
    }
}

/// Persisted shape of a quiz: answers stay tab-delimited at this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRecord {
    pub question: String,
    pub answer: String,
    pub explanation: String,
}

impl QuizRecord {
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            explanation: explanation.into(),
        }
    }

    #[must_use]
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            question: quiz.question().to_owned(),
            answer: quiz.delimited_answer(),
            explanation: quiz.explanation().to_owned(),
        }
    }

    #[must_use]
    pub fn into_quiz(self) -> Quiz {
        Quiz::from_delimited(self.question, &self.answer, self.explanation)
    }
}

/// Read-only access to one quiz bank.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Human-readable origin of the bank, used in logs and rejection reports.
    fn label(&self) -> String;

    /// Fetch the bank's name and description.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingOverview` when the bank has no overview record,
    /// or other storage errors.
    async fn list_overview(&self) -> Result<Overview, StorageError>;

    /// Fetch every quiz in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::EmptyQuizBank` when the bank holds no quizzes, or other
    /// storage errors.
    async fn load_all(&self) -> Result<Vec<QuizRecord>, StorageError>;
}

/// Append-only history of displayed quizzes.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one entry and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Closed` after `close`, or other storage errors.
    async fn append(&self, entry: &LogEntry) -> Result<i64, StorageError>;

    /// All entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read.
    async fn load_all(&self) -> Result<Vec<LogEntry>, StorageError>;

    /// Release the sink. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the underlying resource fails to shut down.
    async fn close(&self) -> Result<(), StorageError>;
}

/// Quiz bank held in memory, for tests and built-in samples.
#[derive(Debug, Clone)]
pub struct InMemoryQuizBank {
    label: String,
    overview: Option<Overview>,
    quizzes: Vec<QuizRecord>,
}

impl InMemoryQuizBank {
    #[must_use]
    pub fn new(label: impl Into<String>, overview: Option<Overview>, quizzes: Vec<QuizRecord>) -> Self {
        Self {
            label: label.into(),
            overview,
            quizzes,
        }
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizBank {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn list_overview(&self) -> Result<Overview, StorageError> {
        self.overview.clone().ok_or(StorageError::MissingOverview)
    }

    async fn load_all(&self) -> Result<Vec<QuizRecord>, StorageError> {
        if self.quizzes.is_empty() {
            return Err(StorageError::EmptyQuizBank);
        }
        Ok(self.quizzes.clone())
    }
}

/// In-memory log sink. Clones share the same entries.
///
/// `set_offline(true)` makes every call fail with `StorageError::Unavailable` until it
/// is switched back, which lets tests exercise deferred writes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogSink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    offline: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl InMemoryLogSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Entries in append order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Vec<LogEntry>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("in-memory sink is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LogSink for InMemoryLogSink {
    async fn append(&self, entry: &LogEntry) -> Result<i64, StorageError> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        self.check_online()?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(entry.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Serialization("log id overflow".into()))
    }

    async fn load_all(&self) -> Result<Vec<LogEntry>, StorageError> {
        self.check_online()?;
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().rev().cloned().collect())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AnswerResult;
    use quiz_core::time::fixed_now;

    fn entry(question: &str, result: AnswerResult) -> LogEntry {
        LogEntry::for_quiz(&Quiz::from_delimited(question, question, ""), result, fixed_now())
    }

    #[tokio::test]
    async fn bank_reports_configuration_errors() {
        let no_overview = InMemoryQuizBank::new("a", None, vec![QuizRecord::new("q", "a", "")]);
        let err = no_overview.list_overview().await.unwrap_err();
        assert!(matches!(err, StorageError::MissingOverview));
        assert!(err.is_configuration());

        let empty = InMemoryQuizBank::new("b", Some(Overview::new("B", "")), Vec::new());
        let err = empty.load_all().await.unwrap_err();
        assert!(matches!(err, StorageError::EmptyQuizBank));
    }

    #[tokio::test]
    async fn log_sink_returns_newest_first() {
        let sink = InMemoryLogSink::new();
        sink.append(&entry("one", AnswerResult::Correct)).await.unwrap();
        let id = sink.append(&entry("two", AnswerResult::NoAnswer)).await.unwrap();
        assert_eq!(id, 2);

        let loaded = sink.load_all().await.unwrap();
        assert_eq!(loaded[0].question, "two");
        assert_eq!(loaded[1].question, "one");
    }

    #[tokio::test]
    async fn offline_and_closed_sinks_refuse_writes() {
        let sink = InMemoryLogSink::new();
        sink.set_offline(true);
        let err = sink.append(&entry("x", AnswerResult::Correct)).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        sink.set_offline(false);

        sink.close().await.unwrap();
        sink.close().await.unwrap();
        let err = sink.append(&entry("x", AnswerResult::Correct)).await.unwrap_err();
        assert!(matches!(err, StorageError::Closed));
        assert!(sink.snapshot().unwrap().is_empty());
    }

    #[test]
    fn record_round_trips_through_quiz() {
        let record = QuizRecord::new("北海道", "札幌市\t札幌", "");
        let quiz = record.clone().into_quiz();
        assert!(quiz.check_answer("札幌"));
        assert_eq!(QuizRecord::from_quiz(&quiz), record);
    }
}
