use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Brings the history log schema up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: quiz history.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        // result: 1 correct, 0 incorrect, NULL no answer.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_logs (
                    id INTEGER PRIMARY KEY,
                    answered_at TEXT NOT NULL,
                    result INTEGER CHECK (result IN (0, 1)),
                    question TEXT NOT NULL,
                    answer TEXT NOT NULL,
                    explanation TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_logs_answered_at
                    ON quiz_logs (answered_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}

/// Creates the two tables every quiz bank file carries.
pub async fn create_bank_schema(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS overview (
                name TEXT NOT NULL,
                description TEXT NOT NULL
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS quizzes (
                question TEXT PRIMARY KEY,
                answer TEXT NOT NULL,
                explanation TEXT NOT NULL DEFAULT ''
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
