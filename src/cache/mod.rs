//! Local Cache Store
//!
//! Durable mirror of the last-known server collections. Each key holds one
//! whole-collection JSON snapshot; writing a key replaces its snapshot.
//! Nothing expires.

mod memory;
mod sqlite;
mod traits;

use thiserror::Error;

use crate::domain::{Collection, Entity};

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;
pub use traits::CacheStore;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(String),
    #[error("cached snapshot for '{key}' is unreadable: {reason}")]
    Corrupt { key: CacheKey, reason: String },
}

/// Snapshot keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Projects,
    Tasks,
    Teams,
    /// Timestamp of the last successful remote write; a signal, not data
    DataUpdated,
}

impl CacheKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Projects => "projects",
            CacheKey::Tasks => "tasks",
            CacheKey::Teams => "teams",
            CacheKey::DataUpdated => "dataUpdated",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Collection> for CacheKey {
    fn from(collection: Collection) -> Self {
        match collection {
            Collection::Projects => CacheKey::Projects,
            Collection::Tasks => CacheKey::Tasks,
            Collection::Teams => CacheKey::Teams,
        }
    }
}

/// Read the snapshot of `T`'s collection
pub async fn read_collection<T: Entity>(cache: &dyn CacheStore) -> CacheResult<Option<Vec<T>>> {
    let key = CacheKey::from(T::COLLECTION);
    match cache.read(key).await? {
        Some(body) => serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| CacheError::Corrupt {
                key,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Replace the snapshot of `T`'s collection
pub async fn write_collection<T: Entity>(cache: &dyn CacheStore, items: &[T]) -> CacheResult<()> {
    let key = CacheKey::from(T::COLLECTION);
    let body = serde_json::to_string(items).map_err(|e| CacheError::Storage(e.to_string()))?;
    cache.write(key, &body).await
}

/// Last persisted `dataUpdated` marker, in epoch milliseconds
pub async fn read_marker(cache: &dyn CacheStore) -> CacheResult<Option<i64>> {
    match cache.read(CacheKey::DataUpdated).await? {
        Some(body) => body
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| CacheError::Corrupt {
                key: CacheKey::DataUpdated,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

pub async fn write_marker(cache: &dyn CacheStore, at_millis: i64) -> CacheResult<()> {
    cache.write(CacheKey::DataUpdated, &at_millis.to_string()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Project, ProjectStatus};

    #[tokio::test]
    async fn test_collection_snapshot_round_trip() {
        let cache = MemoryCache::new();
        assert_eq!(read_collection::<Project>(&cache).await.unwrap(), None);

        let projects = vec![Project::new("p1", "Alpha").with_status(ProjectStatus::Completed)];
        write_collection(&cache, &projects).await.unwrap();
        assert_eq!(read_collection::<Project>(&cache).await.unwrap(), Some(projects));
    }

    #[tokio::test]
    async fn test_write_replaces_whole_snapshot() {
        let cache = MemoryCache::new();
        let first = vec![Project::new("p1", "Alpha"), Project::new("p2", "Beta")];
        let second = vec![Project::new("p3", "Gamma")];
        write_collection(&cache, &first).await.unwrap();
        write_collection(&cache, &second).await.unwrap();
        assert_eq!(read_collection::<Project>(&cache).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let cache = MemoryCache::new();
        cache.write(CacheKey::Projects, "{not json").await.unwrap();
        let err = read_collection::<Project>(&cache).await.unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { key: CacheKey::Projects, .. }));
    }

    #[tokio::test]
    async fn test_marker_round_trip() {
        let cache = MemoryCache::new();
        assert_eq!(read_marker(&cache).await.unwrap(), None);
        write_marker(&cache, 1_700_000_000_123).await.unwrap();
        assert_eq!(read_marker(&cache).await.unwrap(), Some(1_700_000_000_123));
    }
}
