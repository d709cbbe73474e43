use quiz_core::model::Overview;

use super::{
    SqliteRepository,
    mapping::{db_err, map_overview_row, map_quiz_row},
};
use crate::repository::{QuizRecord, QuizStore, StorageError};

#[async_trait::async_trait]
impl QuizStore for SqliteRepository {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn list_overview(&self) -> Result<Overview, StorageError> {
        let row = sqlx::query("SELECT name, description FROM overview LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match row {
            Some(row) => map_overview_row(&row),
            None => Err(StorageError::MissingOverview),
        }
    }

    async fn load_all(&self) -> Result<Vec<QuizRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT question, answer, explanation
                FROM quizzes
                ORDER BY rowid ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        if rows.is_empty() {
            return Err(StorageError::EmptyQuizBank);
        }
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_quiz_row(&row)?);
        }
        Ok(out)
    }
}

impl SqliteRepository {
    /// Replace the bank's overview and insert or update its quizzes in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if any statement fails.
    pub async fn write_bank(
        &self,
        overview: &Overview,
        quizzes: &[QuizRecord],
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM overview")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("INSERT INTO overview (name, description) VALUES (?1, ?2)")
            .bind(&overview.name)
            .bind(&overview.description)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for quiz in quizzes {
            sqlx::query(
                r"
                    INSERT INTO quizzes (question, answer, explanation)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(question) DO UPDATE SET
                        answer = excluded.answer,
                        explanation = excluded.explanation
                ",
            )
            .bind(&quiz.question)
            .bind(&quiz.answer)
            .bind(&quiz.explanation)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}
