//! SQLite implementation of `ResumeRepository`.
//!
//! # Schema Versioning
//!
//! The database has a `schema_version` table that tracks the schema version.
//! When the schema needs to change, increment `CURRENT_SCHEMA_VERSION` and add
//! a migration in `run_migrations()`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::{RepositoryError, ResumeRepository};

const CURRENT_SCHEMA_VERSION: i64 = 1;

/// SQLite-backed key-value store.
///
/// rusqlite is synchronous, so every call runs under `spawn_blocking`.
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open or create the database at `path` and bring its schema up to date.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy();

        if path_str != ":memory:" && !path_str.is_empty() {
            if let Some(parent) = path_ref.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        RepositoryError::storage(
                            "create state directory",
                            format!("{}: {}", parent.display(), e),
                        )
                    })?;
                }
            }
        }

        let conn = Connection::open(path_ref)
            .map_err(|e| RepositoryError::storage("open database", e.to_string()))?;

        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .map_err(|e| RepositoryError::storage("configure pragmas", e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| RepositoryError::storage("create schema_version table", e.to_string()))?;

        let current_version: i64 = conn
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| RepositoryError::storage("get schema version", e.to_string()))?
            .unwrap_or(0);

        Self::run_migrations(&conn, current_version)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), RepositoryError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(RepositoryError::storage(
                "schema version",
                format!(
                    "Database schema version {} is newer than supported version {}",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }

        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS client_state (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                "#,
            )
            .map_err(|e| RepositoryError::storage("migration v1", e.to_string()))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
            params![CURRENT_SCHEMA_VERSION],
        )
        .map_err(|e| RepositoryError::storage("update schema version", e.to_string()))?;

        Ok(())
    }

    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, RepositoryError> {
        Self::new(":memory:")
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>, RepositoryError> {
    conn.lock().map_err(|_| {
        warn!("SQLite connection mutex poisoned");
        RepositoryError::storage("lock connection", "mutex poisoned")
    })
}

#[async_trait]
impl ResumeRepository for SqliteRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let conn = self.conn.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            conn.query_row(
                "SELECT value FROM client_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| RepositoryError::storage("get", e.to_string()))
        })
        .await
        .map_err(|e| RepositoryError::storage("get", e.to_string()))?
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let conn = self.conn.clone();
        let key = key.to_string();
        let value = value.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            conn.execute(
                "INSERT INTO client_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, updated_at],
            )
            .map_err(|e| RepositoryError::storage("set", e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::storage("set", e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RELABEL_INDEX_KEY;

    #[tokio::test]
    async fn test_get_returns_none_for_missing() {
        let repo = SqliteRepository::new_in_memory().unwrap();
        assert!(repo.get(RELABEL_INDEX_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get_and_overwrite() {
        let repo = SqliteRepository::new_in_memory().unwrap();
        repo.set(RELABEL_INDEX_KEY, "2").await.unwrap();
        repo.set(RELABEL_INDEX_KEY, "5").await.unwrap();
        repo.set("other", "x").await.unwrap();

        assert_eq!(
            repo.get(RELABEL_INDEX_KEY).await.unwrap().as_deref(),
            Some("5")
        );
        assert_eq!(repo.get("other").await.unwrap().as_deref(), Some("x"));
    }

    /// Values survive closing and reopening the database file.
    #[tokio::test]
    async fn test_values_persist_across_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("state").join("labelcheck-state.db");

        {
            let repo = SqliteRepository::new(&db_path).unwrap();
            repo.set(RELABEL_INDEX_KEY, "3").await.unwrap();
        }

        let reopened = SqliteRepository::new(&db_path).unwrap();
        assert_eq!(
            reopened.get(RELABEL_INDEX_KEY).await.unwrap().as_deref(),
            Some("3")
        );
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("labelcheck-state.db");
        drop(SqliteRepository::new(&db_path).unwrap());

        let conn = Connection::open(&db_path).unwrap();
        conn.execute("UPDATE schema_version SET version = 99 WHERE id = 1", [])
            .unwrap();
        drop(conn);

        let err = SqliteRepository::new(&db_path).err().unwrap();
        assert!(matches!(err, RepositoryError::Storage { ref operation, .. } if operation == "schema version"));
    }
}
