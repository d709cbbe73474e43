use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

mod mapping;
mod migrate;
mod quiz_bank_repo;
mod quiz_log_repo;

/// `SQLite` adapter. One value wraps one database file: either a quiz bank
/// (`QuizStore`) or the history log (`LogSink`).
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    label: String,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the URL is malformed or the connection cannot be
    /// established.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?;
        Self::connect_with(options, database_url.to_owned()).await
    }

    /// Open (creating if needed) the history log at `path` and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the file cannot be opened or migrated.
    pub async fn open_log(path: &Path) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let repo = Self::connect_with(options, path.display().to_string()).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Open an existing quiz bank read-only.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the file does not exist or cannot be opened.
    pub async fn open_bank(path: &Path) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        Self::connect_with(options, path.display().to_string()).await
    }

    /// Create a quiz bank file at `path` with an empty schema.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the file cannot be created.
    pub async fn create_bank(path: &Path) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let repo = Self::connect_with(options, path.display().to_string()).await?;
        repo.create_bank_schema().await?;
        Ok(repo)
    }

    async fn connect_with(
        options: SqliteConnectOptions,
        label: String,
    ) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;
        tracing::debug!(database = %label, "sqlite pool opened");
        Ok(Self { pool, label })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the history log tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }

    /// Create the `overview` and `quizzes` tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the schema cannot be created.
    pub async fn create_bank_schema(&self) -> Result<(), SqliteInitError> {
        migrate::create_bank_schema(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }
}
