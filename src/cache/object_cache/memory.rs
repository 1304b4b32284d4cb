use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::cache::{CacheHealth, CacheResult, ObjectCache};
use crate::declare_object_cache_plugin;
use crate::errors::Result;

declare_object_cache_plugin!("memory", MemoryObjectCache);

#[derive(Clone)]
struct CachedEntry {
    body: String,
    ttl: Duration,
}

/// 按条目自身的 TTL 过期
struct EntryExpiry;

impl Expiry<String, CachedEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// moka 进程内缓存
pub struct MemoryObjectCache {
    inner: Cache<String, CachedEntry>,
    default_ttl: Duration,
}

impl MemoryObjectCache {
    pub fn new(max_capacity: u64, default_ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        debug!(
            "MemoryObjectCache initialized with max capacity: {}, default TTL: {}s",
            max_capacity, default_ttl_secs
        );
        Self {
            inner,
            default_ttl: Duration::from_secs(default_ttl_secs),
        }
    }

    pub async fn from_config() -> Result<Self> {
        let config = crate::config::get_config();
        Ok(Self::new(
            config.cache.memory.max_capacity,
            config.cache.default_ttl,
        ))
    }

    /// 当前条目数（近似值，moka 异步维护）
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[async_trait]
impl ObjectCache for MemoryObjectCache {
    async fn get(&self, key: &str) -> CacheResult {
        match self.inner.get(key).await {
            Some(entry) => CacheResult::Found(entry.body),
            None => CacheResult::Miss,
        }
    }

    async fn insert(&self, key: &str, value: String, ttl_secs: u64) {
        let ttl = if ttl_secs == 0 {
            self.default_ttl
        } else {
            Duration::from_secs(ttl_secs)
        };
        self.inner
            .insert(key.to_string(), CachedEntry { body: value, ttl })
            .await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn remove_prefix(&self, prefix: &str) -> u64 {
        let keys: Vec<String> = self
            .inner
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.as_ref().clone())
            .collect();

        for key in &keys {
            self.inner.invalidate(key).await;
        }
        trace!("Removed {} keys with prefix '{}'", keys.len(), prefix);
        keys.len() as u64
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    async fn health_check(&self) -> CacheHealth {
        CacheHealth::healthy(self.backend_name())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
