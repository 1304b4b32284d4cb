//! 缓存键生成
//!
//! 键由前缀、位置参数、按名称排序的命名参数组成，以 `:` 连接。
//! 超过 [`MAX_KEY_LEN`] 的键替换为 `<prefix>:hashed:<xxh64>`。

use xxhash_rust::xxh64::xxh64;

use crate::config::TtlTierConfig;

pub const MAX_KEY_LEN: usize = 200;

/// 文章指标快照
pub const METRICS_PREFIX: &str = "blog_post_metrics";
/// 文章详情（按语言区分）
pub const POST_DETAIL_PREFIX: &str = "blog_post_detail";

/// 缓存键构造器
#[derive(Debug, Clone)]
pub struct CacheKey {
    prefix: String,
    args: Vec<String>,
    named: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            args: Vec::new(),
            named: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.named.push((name.into(), value.to_string()));
        self
    }

    pub fn build(mut self) -> String {
        self.named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut parts = Vec::with_capacity(1 + self.args.len() + self.named.len());
        parts.push(self.prefix.clone());
        parts.extend(self.args);
        parts.extend(self.named.iter().map(|(k, v)| format!("{}:{}", k, v)));

        let key = parts.join(":");
        if key.len() > MAX_KEY_LEN {
            format!("{}:hashed:{:016x}", self.prefix, xxh64(key.as_bytes(), 0))
        } else {
            key
        }
    }
}

pub fn metrics_key(slug: &str) -> String {
    CacheKey::new(METRICS_PREFIX).arg(slug).build()
}

pub fn post_detail_key(slug: &str, lang: &str) -> String {
    CacheKey::new(POST_DETAIL_PREFIX)
        .arg(slug)
        .named("lang", lang)
        .build()
}

/// 某篇文章全部详情变体共享的前缀（尾部带 `:`，避免 `hello` 命中 `hello-world`）
pub fn post_detail_prefix(slug: &str) -> String {
    format!("{}:{}:", POST_DETAIL_PREFIX, slug)
}

/// 可被重新计算的缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WarmKey {
    Metrics { slug: String },
    PostDetail { slug: String, lang: String },
}

impl WarmKey {
    pub fn cache_key(&self) -> String {
        match self {
            WarmKey::Metrics { slug } => metrics_key(slug),
            WarmKey::PostDetail { slug, lang } => post_detail_key(slug, lang),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            WarmKey::Metrics { slug } | WarmKey::PostDetail { slug, .. } => slug,
        }
    }
}

/// TTL 分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TtlTier {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl TtlTier {
    pub fn seconds(self, tiers: &TtlTierConfig) -> u64 {
        match self {
            TtlTier::Short => tiers.short,
            TtlTier::Medium => tiers.medium,
            TtlTier::Long => tiers.long,
            TtlTier::VeryLong => tiers.very_long,
        }
    }
}

/// 指标快照使用 medium
pub const METRICS_TTL: TtlTier = TtlTier::Medium;
/// 文章详情使用 long
pub const POST_DETAIL_TTL: TtlTier = TtlTier::Long;
