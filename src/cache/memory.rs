//! In-memory cache, lost when the process exits.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{CacheKey, CacheResult, CacheStore};

#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshots: Mutex<HashMap<CacheKey, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn read(&self, key: CacheKey) -> CacheResult<Option<String>> {
        Ok(self.snapshots.lock().await.get(&key).cloned())
    }

    async fn write(&self, key: CacheKey, snapshot: &str) -> CacheResult<()> {
        self.snapshots.lock().await.insert(key, snapshot.to_string());
        Ok(())
    }
}
