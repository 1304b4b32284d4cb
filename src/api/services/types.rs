//! API 请求 / 响应类型

use serde::{Deserialize, Serialize};

use crate::cache::CacheHealth;
use crate::engagement::Outcome;
use crate::storage::PostDetail;

/// 所有 JSON 响应的外层结构
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// `track-share` 请求体
#[derive(Deserialize, Clone, Debug)]
pub struct TrackShareRequest {
    pub platform: String,
    /// 数字 id 或 slug
    pub post_id: serde_json::Value,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrackReadingResponse {
    pub outcome: Outcome,
}

/// 请求时读取的站点开关，不进缓存
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SiteFlags {
    pub site_name: String,
    pub coming_soon_mode: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub detail: PostDetail,
    pub site: SiteFlags,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClearScopeParam {
    #[default]
    All,
    Post,
    Metrics,
    Details,
}

/// `POST {admin}/cache/clear`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct CacheClearRequest {
    pub scope: Option<ClearScopeParam>,
    pub post_slug: Option<String>,
}

/// `POST {admin}/cache/warm`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct CacheWarmRequest {
    #[serde(default)]
    pub clear_first: bool,
}

/// `GET {admin}/cache/stats?detailed=true&test_performance=true`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct CacheStatsQuery {
    #[serde(default)]
    pub detailed: bool,
    #[serde(default)]
    pub test_performance: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CacheClearResponse {
    pub scope: String,
}

// ============ Health ============

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    pub posts_count: Option<u64>,
    pub error: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
    pub cache: CacheHealth,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u64,
}
