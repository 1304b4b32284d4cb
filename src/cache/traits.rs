use async_trait::async_trait;
use serde::Serialize;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    /// 命中，值为序列化后的 JSON
    Found(String),
    /// 未命中（包括后端故障）
    Miss,
}

/// 后端健康状态
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub status: String,
    pub cache_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CacheHealth {
    pub fn healthy(cache_type: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            cache_type: cache_type.to_string(),
            error: None,
        }
    }

    pub fn unhealthy(cache_type: &str, error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            cache_type: cache_type.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// 键值缓存后端
///
/// 后端故障只记录日志，读取表现为 `Miss`，写入表现为空操作。
#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult;
    async fn insert(&self, key: &str, value: String, ttl_secs: u64);
    async fn remove(&self, key: &str);
    /// 删除所有以 `prefix` 开头的键，返回删除数量
    async fn remove_prefix(&self, prefix: &str) -> u64;
    async fn invalidate_all(&self);
    async fn health_check(&self) -> CacheHealth;

    /// 后端名称（memory / redis / null）
    fn backend_name(&self) -> &'static str;
}
