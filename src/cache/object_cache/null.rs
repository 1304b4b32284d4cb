use async_trait::async_trait;
use tracing::trace;

use crate::cache::{CacheHealth, CacheResult, ObjectCache};
use crate::declare_object_cache_plugin;
use crate::errors::Result;

declare_object_cache_plugin!("null", NullObjectCache);

/// 禁用缓存：读取总是未命中，写入不做任何事
pub struct NullObjectCache;

impl NullObjectCache {
    pub async fn from_config() -> Result<Self> {
        trace!("Using NullObjectCache: caching disabled");
        Ok(NullObjectCache)
    }
}

#[async_trait]
impl ObjectCache for NullObjectCache {
    async fn get(&self, key: &str) -> CacheResult {
        trace!("NullObjectCache.get called for key: {}", key);
        CacheResult::Miss
    }

    async fn insert(&self, key: &str, _value: String, _ttl_secs: u64) {
        trace!("NullObjectCache.insert called for key: {}", key);
    }

    async fn remove(&self, key: &str) {
        trace!("NullObjectCache.remove called for key: {}", key);
    }

    async fn remove_prefix(&self, _prefix: &str) -> u64 {
        0
    }

    async fn invalidate_all(&self) {}

    async fn health_check(&self) -> CacheHealth {
        CacheHealth::healthy(self.backend_name())
    }

    fn backend_name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_always_misses() {
        let cache = NullObjectCache::from_config().await.unwrap();
        cache.insert("k", "v".to_string(), 60).await;
        assert_eq!(cache.get("k").await, CacheResult::Miss);
        assert_eq!(cache.remove_prefix("k").await, 0);
        assert!(cache.health_check().await.is_healthy());
    }
}
