use quiz_core::model::{AnswerResult, LogEntry, Overview};
use sqlx::Row;

use crate::repository::{QuizRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors; a closed pool means the sink was closed.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::PoolClosed => StorageError::Closed,
        other => StorageError::Connection(other.to_string()),
    }
}

/// Storage encoding: Correct=1, Incorrect=0, NoAnswer=NULL.
pub(crate) fn result_to_i64(result: AnswerResult) -> Option<i64> {
    match result {
        AnswerResult::Correct => Some(1),
        AnswerResult::Incorrect => Some(0),
        AnswerResult::NoAnswer => None,
    }
}

/// Inverse of `result_to_i64`.
pub(crate) fn result_from_i64(value: Option<i64>) -> Result<AnswerResult, StorageError> {
    match value {
        Some(1) => Ok(AnswerResult::Correct),
        Some(0) => Ok(AnswerResult::Incorrect),
        None => Ok(AnswerResult::NoAnswer),
        Some(other) => Err(StorageError::Serialization(format!(
            "invalid result: {other}"
        ))),
    }
}

pub(crate) fn map_overview_row(row: &sqlx::sqlite::SqliteRow) -> Result<Overview, StorageError> {
    Ok(Overview::new(
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description")
            .map_err(ser)?
            .unwrap_or_default(),
    ))
}

pub(crate) fn map_quiz_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizRecord, StorageError> {
    Ok(QuizRecord {
        question: row.try_get("question").map_err(ser)?,
        answer: row.try_get("answer").map_err(ser)?,
        explanation: row
            .try_get::<Option<String>, _>("explanation")
            .map_err(ser)?
            .unwrap_or_default(),
    })
}

pub(crate) fn map_log_row(row: &sqlx::sqlite::SqliteRow) -> Result<LogEntry, StorageError> {
    Ok(LogEntry {
        answered_at: row.try_get("answered_at").map_err(ser)?,
        result: result_from_i64(row.try_get::<Option<i64>, _>("result").map_err(ser)?)?,
        question: row.try_get("question").map_err(ser)?,
        answer: row.try_get("answer").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_encoding_round_trips() {
        for result in [
            AnswerResult::Correct,
            AnswerResult::Incorrect,
            AnswerResult::NoAnswer,
        ] {
            assert_eq!(result_from_i64(result_to_i64(result)).unwrap(), result);
        }
        assert!(result_from_i64(Some(7)).is_err());
    }
}
