use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, error, trace};

use crate::cache::{CacheHealth, CacheResult, ObjectCache};
use crate::declare_object_cache_plugin;
use crate::errors::{PostPulseError, Result};

declare_object_cache_plugin!("redis", RedisObjectCache);

/// SCAN 每批数量
const SCAN_BATCH: usize = 200;

/// Redis 缓存
///
/// 所有键加上 `key_prefix`，`invalidate_all` 只清理本服务的前缀。
/// ConnectionManager 负责断线重连。
pub struct RedisObjectCache {
    connection: ConnectionManager,
    key_prefix: String,
}

impl RedisObjectCache {
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            PostPulseError::cache_connection(format!("Invalid Redis URL '{}': {}", url, e))
        })?;

        let mut connection = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to connect to Redis at {}: {}", url, e);
            PostPulseError::cache_connection(format!("Redis connection failed: {}", e))
        })?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| PostPulseError::cache_connection(format!("Redis ping failed: {}", e)))?;
        debug!(
            "RedisObjectCache connected ({}), prefix: '{}'",
            pong, key_prefix
        );

        Ok(Self {
            connection,
            key_prefix: key_prefix.to_string(),
        })
    }

    pub async fn from_config() -> Result<Self> {
        let config = crate::config::get_config();
        Self::connect(&config.cache.redis.url, &config.cache.redis.key_prefix).await
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 用 SCAN 找出匹配的键并分批 DEL
    async fn delete_matching(&self, pattern: &str) -> redis::RedisResult<u64> {
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = conn.del(&keys).await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }
}

/// 转义 SCAN MATCH 的通配符
fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl ObjectCache for RedisObjectCache {
    async fn get(&self, key: &str) -> CacheResult {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(self.make_key(key)).await;

        match result {
            Ok(Some(data)) => {
                trace!("Redis hit: {}", key);
                CacheResult::Found(data)
            }
            Ok(None) => {
                trace!("Redis miss: {}", key);
                CacheResult::Miss
            }
            Err(e) => {
                error!("Failed to get key '{}' from Redis: {}", key, e);
                CacheResult::Miss
            }
        }
    }

    async fn insert(&self, key: &str, value: String, ttl_secs: u64) {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<()> = conn
            .set_ex(self.make_key(key), value, ttl_secs.max(1))
            .await;

        if let Err(e) = result {
            error!("Failed to insert key '{}' into Redis: {}", key, e);
        }
    }

    async fn remove(&self, key: &str) {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<u64> = conn.del(self.make_key(key)).await;

        match result {
            Ok(0) => trace!("Key not found in Redis for removal: {}", key),
            Ok(_) => trace!("Removed key from Redis: {}", key),
            Err(e) => error!("Failed to remove key '{}' from Redis: {}", key, e),
        }
    }

    async fn remove_prefix(&self, prefix: &str) -> u64 {
        let pattern = format!("{}*", escape_glob(&self.make_key(prefix)));
        match self.delete_matching(&pattern).await {
            Ok(n) => n,
            Err(e) => {
                error!("Failed to remove prefix '{}' from Redis: {}", prefix, e);
                0
            }
        }
    }

    async fn invalidate_all(&self) {
        let pattern = format!("{}*", escape_glob(&self.key_prefix));
        match self.delete_matching(&pattern).await {
            Ok(n) => debug!("Redis invalidate_all removed {} keys", n),
            Err(e) => error!("Failed to invalidate Redis keys: {}", e),
        }
    }

    async fn health_check(&self) -> CacheHealth {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match result {
            Ok(_) => CacheHealth::healthy(self.backend_name()),
            Err(e) => CacheHealth::unhealthy(self.backend_name(), e.to_string()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("postpulse:"), "postpulse:");
        assert_eq!(escape_glob("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }
}
