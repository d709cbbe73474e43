#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod history_service;
pub mod play_service;

pub use quiz_core::{Clock, Entropy};

pub use catalog::{QuizCatalog, RejectedBank};
pub use config::PlaySettings;
pub use error::{CatalogError, PlayError};
pub use history_service::{HistoryService, HistoryStats};
pub use play_service::{PlayEvent, PlayService, PresentationHost};
