#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryLogSink, InMemoryQuizBank, LogSink, QuizRecord, QuizStore, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
