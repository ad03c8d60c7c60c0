//! Client-local key-value storage for relabel resumption.
//!
//! The session only ever stores one value, the last visited relabel index,
//! but the capability is a plain string map so the front end decides where
//! it lives (memory in tests, SQLite on disk).

mod memory;
mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use thiserror::Error;

/// Key under which the last visited relabel index is stored.
pub const RELABEL_INDEX_KEY: &str = "relabel_last_index";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage error during {operation}: {message}")]
    Storage { operation: String, message: String },
}

impl RepositoryError {
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Upsert.
    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;
}
