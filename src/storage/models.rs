use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 博客文章（只读视图）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建文章的参数（CLI `post add`）
#[derive(Debug, Clone)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub is_published: bool,
    pub is_featured: bool,
}

/// 单篇文章的聚合指标快照
///
/// 缓存中保存的就是它的 JSON 形式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub post_id: i64,
    pub slug: String,
    pub view_count: i64,
    pub total_reading_seconds: i64,
    pub completed_reads: i64,
    pub average_reading_seconds: i64,
    pub shares: BTreeMap<String, i64>,
    pub total_shares: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MetricsSnapshot {
    /// 还没有任何统计记录时的空快照
    pub fn empty(post: &Post) -> Self {
        Self {
            post_id: post.id,
            slug: post.slug.clone(),
            view_count: 0,
            total_reading_seconds: 0,
            completed_reads: 0,
            average_reading_seconds: 0,
            shares: BTreeMap::new(),
            total_shares: 0,
            updated_at: None,
        }
    }
}

/// 文章详情（文章 + 指标），按语言缓存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub lang: String,
    pub post: Post,
    pub metrics: MetricsSnapshot,
}

/// 分享计数结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTally {
    /// 该渠道累加后的计数
    pub count: i64,
    /// 所有渠道累加后的总和
    pub total: i64,
}

/// 站点设置的部分更新
#[derive(Debug, Clone, Default)]
pub struct SiteSettingsPatch {
    pub site_name: Option<String>,
    pub tracking_enabled: Option<bool>,
    pub coming_soon_mode: Option<bool>,
}

impl SiteSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.site_name.is_none() && self.tracking_enabled.is_none() && self.coming_soon_mode.is_none()
    }
}

/// 存储后端信息（健康检查使用）
#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    pub storage_type: String,
}
