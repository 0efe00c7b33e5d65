//! SQLite Cache
//!
//! Durable snapshot store: one row per key in a single `snapshots` table.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{CacheError, CacheKey, CacheResult, CacheStore};

pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path`
    pub fn open(path: &Path) -> CacheResult<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| CacheError::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| CacheError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
        log::debug!("[CACHE] opened {}", path.display());
        Self::with_connection(conn)
    }

    /// Cache that lives only as long as this value
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> CacheResult<Self> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn storage(e: rusqlite::Error) -> CacheError {
    CacheError::Storage(e.to_string())
}

fn run_migrations(conn: &Connection) -> CacheResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            key TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(storage)?;
    Ok(())
}

#[async_trait]
impl CacheStore for SqliteCache {
    async fn read(&self, key: CacheKey) -> CacheResult<Option<String>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT body FROM snapshots WHERE key = ?",
            params![key.as_str()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(storage)
    }

    async fn write(&self, key: CacheKey, snapshot: &str) -> CacheResult<()> {
        let conn = self.conn.lock().await;
        let now = chrono::Local::now().timestamp_millis();
        conn.execute(
            "INSERT OR REPLACE INTO snapshots (key, body, updated_at) VALUES (?, ?, ?)",
            params![key.as_str(), snapshot, now],
        )
        .map_err(storage)?;
        log::debug!("[CACHE] wrote {} ({} bytes)", key, snapshot.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{read_collection, write_collection};
    use crate::domain::{Member, Team};

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let cache = SqliteCache::open_in_memory().unwrap();
        assert_eq!(cache.read(CacheKey::Teams).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_replaces_row() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.write(CacheKey::Tasks, "[1]").await.unwrap();
        cache.write(CacheKey::Tasks, "[2]").await.unwrap();
        assert_eq!(cache.read(CacheKey::Tasks).await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(cache.read(CacheKey::Projects).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_snapshots_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        let mut team = Team::new("m1", "Eng");
        team.members.push(Member::named("Ann"));
        {
            let cache = SqliteCache::open(&path).unwrap();
            write_collection(&cache, &[team.clone()]).await.unwrap();
        }

        let reopened = SqliteCache::open(&path).unwrap();
        let teams = read_collection::<Team>(&reopened).await.unwrap();
        assert_eq!(teams, Some(vec![team]));
    }
}
