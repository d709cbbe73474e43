use std::sync::Arc;

use quiz_core::model::{AnswerResult, LogEntry};
use quiz_core::session::SessionSummary;
use storage::repository::{LogSink, StorageError};

/// Totals over a slice of history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub no_answer: usize,
}

impl HistoryStats {
    #[must_use]
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, entry| {
            stats.total += 1;
            match entry.result {
                AnswerResult::Correct => stats.correct += 1,
                AnswerResult::Incorrect => stats.incorrect += 1,
                AnswerResult::NoAnswer => stats.no_answer += 1,
            }
            stats
        })
    }
}

/// Read side of the quiz history.
#[derive(Clone)]
pub struct HistoryService {
    log: Arc<dyn LogSink>,
}

impl HistoryService {
    #[must_use]
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    /// Newest-first entries, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<LogEntry>, StorageError> {
        let mut entries = self.log.load_all().await?;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Entries of the session that produced `summary`, newest first.
    ///
    /// `unsaved` holds entries still queued for the sink, oldest first. They are the
    /// newest entries overall, so they come first and only the remainder is read back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read.
    pub async fn for_session(
        &self,
        summary: &SessionSummary,
        unsaved: &[LogEntry],
    ) -> Result<Vec<LogEntry>, StorageError> {
        let count = usize::try_from(summary.displayed_count).unwrap_or(usize::MAX);
        let mut entries: Vec<LogEntry> = unsaved.iter().rev().take(count).cloned().collect();
        let saved = count - entries.len();
        if saved > 0 {
            entries.extend(self.recent(Some(saved)).await?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{PlayMode, Quiz};
    use quiz_core::session::FinishReason;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryLogSink;

    #[tokio::test]
    async fn recent_limits_newest_first() {
        let sink = InMemoryLogSink::new();
        for (question, result) in [
            ("a", AnswerResult::Correct),
            ("b", AnswerResult::Incorrect),
            ("c", AnswerResult::NoAnswer),
        ] {
            let entry = LogEntry::for_quiz(&Quiz::from_delimited(question, "x", ""), result, fixed_now());
            sink.append(&entry).await.unwrap();
        }
        let history = HistoryService::new(Arc::new(sink));

        let all = history.recent(None).await.unwrap();
        assert_eq!(
            HistoryStats::from_entries(&all),
            HistoryStats {
                total: 3,
                correct: 1,
                incorrect: 1,
                no_answer: 1,
            }
        );

        let last_two = history.recent(Some(2)).await.unwrap();
        let questions: Vec<_> = last_two.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["c", "b"]);
    }

    #[tokio::test]
    async fn session_entries_include_unsaved_ones() {
        let sink = InMemoryLogSink::new();
        let entry = |question: &str, result| {
            LogEntry::for_quiz(&Quiz::from_delimited(question, "x", ""), result, fixed_now())
        };
        sink.append(&entry("earlier", AnswerResult::Correct)).await.unwrap();
        sink.append(&entry("first", AnswerResult::Correct)).await.unwrap();
        let unsaved = [
            entry("second", AnswerResult::Incorrect),
            entry("third", AnswerResult::NoAnswer),
        ];
        let summary = SessionSummary {
            source_name: "Letters".into(),
            mode: PlayMode::FixedCount { count: 5 },
            reason: FinishReason::Retired,
            started_at: fixed_now(),
            finished_at: fixed_now(),
            displayed_count: 3,
            correct_count: 1,
            elapsed_seconds: 9.0,
            remaining_seconds_at_stop: None,
        };
        let history = HistoryService::new(Arc::new(sink));

        let entries = history.for_session(&summary, &unsaved).await.unwrap();
        let questions: Vec<_> = entries.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["third", "second", "first"]);

        let all_saved = history.for_session(&summary, &[]).await.unwrap();
        let questions: Vec<_> = all_saved.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["first", "earlier"]);
    }
}
