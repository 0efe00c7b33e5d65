//! Cache Store Trait

use async_trait::async_trait;

use super::{CacheKey, CacheResult};

/// Key/value snapshot storage
///
/// Implementations store opaque JSON text; typed access goes through
/// [`read_collection`](super::read_collection) and friends.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Current snapshot for `key`, if one was ever written
    async fn read(&self, key: CacheKey) -> CacheResult<Option<String>>;

    /// Replace the snapshot for `key`
    async fn write(&self, key: CacheKey, snapshot: &str) -> CacheResult<()>;
}
