use quiz_core::model::LogEntry;

use super::{
    SqliteRepository,
    mapping::{db_err, map_log_row, result_to_i64},
};
use crate::repository::{LogSink, StorageError};

#[async_trait::async_trait]
impl LogSink for SqliteRepository {
    async fn append(&self, entry: &LogEntry) -> Result<i64, StorageError> {
        if self.pool.is_closed() {
            return Err(StorageError::Closed);
        }
        let res = sqlx::query(
            r"
                INSERT INTO quiz_logs (answered_at, result, question, answer, explanation)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(entry.answered_at)
        .bind(result_to_i64(entry.result))
        .bind(&entry.question)
        .bind(&entry.answer)
        .bind(&entry.explanation)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(res.last_insert_rowid())
    }

    async fn load_all(&self) -> Result<Vec<LogEntry>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, answered_at, result, question, answer, explanation
                FROM quiz_logs
                ORDER BY id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_log_row(&row)?);
        }
        Ok(out)
    }

    async fn close(&self) -> Result<(), StorageError> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::debug!(database = %self.label, "log sink closed");
        }
        Ok(())
    }
}
