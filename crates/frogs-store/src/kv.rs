use async_trait::async_trait;
use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::instrument;

use frogs_core::{KeyValueStore, StorageError};

use crate::database::Database;
use crate::error::StoreError;

/// Key-value documents in the `kv` table.
#[derive(Clone)]
pub struct SqliteKv {
    db: Database,
}

impl SqliteKv {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.db.with_conn(|conn| {
            let keys = conn
                .prepare("SELECT key FROM kv ORDER BY key")?
                .query_map([], |row| row.get(0))?
                .collect::<Result<_, _>>()?;
            Ok(keys)
        })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKv {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self.db.with_conn(|conn| {
            Ok(conn
                .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
                .optional()?)
        })?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value, now],
            )?;
            Ok(())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv() -> SqliteKv {
        SqliteKv::new(Database::in_memory().unwrap())
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        assert_eq!(kv().get("@big_frogs_tasks").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get() {
        let kv = kv();
        kv.set("@daily_tasks", br#"{"lastDate":null}"#).await.unwrap();
        assert_eq!(
            kv.get("@daily_tasks").await.unwrap().as_deref(),
            Some(&br#"{"lastDate":null}"#[..])
        );
    }

    #[tokio::test]
    async fn set_overwrites() {
        let kv = kv();
        kv.set("k", b"one").await.unwrap();
        kv.set("k", b"two").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(kv.keys().unwrap(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let kv = kv();
        kv.set("@big_frogs_tasks", b"frogs").await.unwrap();
        kv.set("@daily_tasks", b"daily").await.unwrap();
        assert_eq!(kv.get("@big_frogs_tasks").await.unwrap(), Some(b"frogs".to_vec()));
        assert_eq!(kv.get("@daily_tasks").await.unwrap(), Some(b"daily".to_vec()));
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frogs.db");

        SqliteKv::new(Database::open(&path).unwrap())
            .set("k", b"persisted")
            .await
            .unwrap();
        let reopened = SqliteKv::new(Database::open(&path).unwrap());
        assert_eq!(reopened.get("k").await.unwrap(), Some(b"persisted".to_vec()));
    }
}
