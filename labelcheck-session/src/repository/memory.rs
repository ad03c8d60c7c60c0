//! In-memory `ResumeRepository`. Contents are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RepositoryError, ResumeRepository};

#[derive(Default)]
pub struct InMemoryRepository {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ResumeRepository for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
