//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ModeError, QuizSourceError};
use quiz_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted while building the quiz catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Source(#[from] QuizSourceError),
}

impl CatalogError {
    /// Whether the bank itself is malformed (empty or without an overview).
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            CatalogError::Storage(err) => err.is_configuration(),
            CatalogError::Source(err) => matches!(
                err,
                QuizSourceError::EmptyPool { .. } | QuizSourceError::MissingOverview
            ),
        }
    }
}

/// Errors emitted by `PlayService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayError {
    #[error("no quiz source selected")]
    NoSourceSelected,
    #[error("no session in progress")]
    NoSession,
    #[error("play service already closed")]
    Closed,
    #[error("{count} log entries could not be written: {reason}")]
    LogsNotWritten { count: usize, reason: String },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Mode(#[from] ModeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
