//! 读穿透缓存服务
//!
//! 读取先查缓存，未命中时从存储加载并回填。写入方（阅读/分享上报）
//! 在累加计数后调用 `invalidate_post`，下一次读取会重新计算。

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::cache::keys::{
    self, CacheKey, METRICS_PREFIX, METRICS_TTL, POST_DETAIL_PREFIX, POST_DETAIL_TTL, TtlTier,
    WarmKey,
};
use crate::cache::report::{
    CacheReport, KeyCoverage, KeyState, KeyStatus, PERF_TEST_PREFIX, PerformanceReport,
    health_score,
};
use crate::cache::traits::{CacheHealth, CacheResult, ObjectCache};
use crate::config::{CacheConfig, TtlTierConfig};
use crate::errors::Result;
use crate::storage::{MetricsSnapshot, PostDetail, SeaOrmStorage};

/// CacheService 参数
#[derive(Debug, Clone)]
pub struct CacheServiceOptions {
    pub ttl: TtlTierConfig,
    pub languages: Vec<String>,
    pub warm_concurrency: usize,
}

impl Default for CacheServiceOptions {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl CacheServiceOptions {
    pub fn from_config(config: &CacheConfig) -> Self {
        let languages = if config.languages.is_empty() {
            vec!["en".to_string()]
        } else {
            config.languages.clone()
        };
        Self {
            ttl: config.ttl,
            languages,
            warm_concurrency: config.warm_concurrency.max(1),
        }
    }
}

/// 清理范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearScope {
    All,
    Post(String),
    Metrics,
    Details,
}

/// 预热结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarmReport {
    pub warmed: Vec<String>,
    /// 源数据已不存在（文章删除或下线）
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// 缓存统计
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub backend: String,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_tiers: Vec<(String, u64)>,
    pub health: CacheHealth,
}

enum WarmOutcome {
    Warmed,
    Skipped,
}

pub struct CacheService {
    backend: Arc<dyn ObjectCache>,
    storage: Arc<SeaOrmStorage>,
    options: CacheServiceOptions,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheService {
    pub fn new(
        backend: Arc<dyn ObjectCache>,
        storage: Arc<SeaOrmStorage>,
        options: CacheServiceOptions,
    ) -> Self {
        Self {
            backend,
            storage,
            options,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &Arc<dyn ObjectCache> {
        &self.backend
    }

    pub fn storage(&self) -> &Arc<SeaOrmStorage> {
        &self.storage
    }

    pub fn languages(&self) -> &[String] {
        &self.options.languages
    }

    /// 只有配置过的语言才有详情变体，失效时按这份列表逐个删除
    pub fn supports_language(&self, lang: &str) -> bool {
        self.options.languages.iter().any(|l| l == lang)
    }

    pub fn ttl_for(&self, tier: TtlTier) -> u64 {
        tier.seconds(&self.options.ttl)
    }

    /// 读取并反序列化；损坏的条目会被删除并视为未命中
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key).await {
            CacheResult::Found(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Some(value)
                }
                Err(e) => {
                    warn!("Dropping undecodable cache entry '{}': {}", key, e);
                    self.backend.remove(key).await;
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    None
                }
            },
            CacheResult::Miss => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, tier: TtlTier) {
        match serde_json::to_string(value) {
            Ok(raw) => self.backend.insert(key, raw, self.ttl_for(tier)).await,
            Err(e) => warn!("Failed to serialize cache value for '{}': {}", key, e),
        }
    }

    /// 文章指标快照（读穿透）；文章不存在或未发布返回 `None`
    pub async fn get_metrics(&self, slug: &str) -> Result<Option<MetricsSnapshot>> {
        let key = keys::metrics_key(slug);
        if let Some(snapshot) = self.lookup::<MetricsSnapshot>(&key).await {
            return Ok(Some(snapshot));
        }

        let snapshot = self.storage.load_metrics_by_slug(slug).await?;
        if let Some(ref s) = snapshot {
            self.store(&key, s, METRICS_TTL).await;
        }
        Ok(snapshot)
    }

    /// 文章详情（读穿透）
    ///
    /// 未配置的语言直接返回 `None`，不会写入缓存。
    pub async fn get_post_detail(&self, slug: &str, lang: &str) -> Result<Option<PostDetail>> {
        if !self.supports_language(lang) {
            debug!("Post detail requested in unsupported language '{}'", lang);
            return Ok(None);
        }
        let key = keys::post_detail_key(slug, lang);
        if let Some(detail) = self.lookup::<PostDetail>(&key).await {
            return Ok(Some(detail));
        }

        let detail = self.load_post_detail(slug, lang).await?;
        if let Some(ref d) = detail {
            self.store(&key, d, POST_DETAIL_TTL).await;
        }
        Ok(detail)
    }

    async fn load_post_detail(&self, slug: &str, lang: &str) -> Result<Option<PostDetail>> {
        let Some(post) = self.storage.find_published_post(slug).await? else {
            return Ok(None);
        };
        let metrics = self.storage.load_metrics(&post).await?;
        Ok(Some(PostDetail {
            lang: lang.to_string(),
            post,
            metrics,
        }))
    }

    pub async fn invalidate(&self, key: &str) {
        self.backend.remove(key).await;
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> u64 {
        self.backend.remove_prefix(prefix).await
    }

    /// 删除文章的指标快照与所有语言的详情
    pub async fn invalidate_post(&self, slug: &str) {
        self.backend.remove(&keys::metrics_key(slug)).await;
        // 长 slug 的键会被哈希，前缀扫描匹配不到，按已知语言逐个删除
        for lang in &self.options.languages {
            self.backend.remove(&keys::post_detail_key(slug, lang)).await;
        }
        let removed = self
            .backend
            .remove_prefix(&keys::post_detail_prefix(slug))
            .await;
        debug!(
            "Invalidated cache for post '{}' ({} extra detail variants)",
            slug, removed
        );
    }

    pub async fn clear(&self, scope: &ClearScope) {
        match scope {
            ClearScope::All => {
                self.backend.invalidate_all().await;
                info!("Cache cleared: all entries");
            }
            ClearScope::Post(slug) => {
                self.invalidate_post(slug).await;
                info!("Cache cleared for post '{}'", slug);
            }
            ClearScope::Metrics => {
                let n = self
                    .backend
                    .remove_prefix(&format!("{}:", METRICS_PREFIX))
                    .await;
                info!("Cache cleared: {} metrics entries", n);
            }
            ClearScope::Details => {
                let n = self
                    .backend
                    .remove_prefix(&format!("{}:", POST_DETAIL_PREFIX))
                    .await;
                info!("Cache cleared: {} post detail entries", n);
            }
        }
    }

    async fn warm_one(&self, key: &WarmKey) -> Result<WarmOutcome> {
        match key {
            WarmKey::Metrics { slug } => match self.storage.load_metrics_by_slug(slug).await? {
                Some(snapshot) => {
                    self.store(&key.cache_key(), &snapshot, METRICS_TTL).await;
                    Ok(WarmOutcome::Warmed)
                }
                None => Ok(WarmOutcome::Skipped),
            },
            WarmKey::PostDetail { slug, lang } => match self.load_post_detail(slug, lang).await? {
                Some(detail) => {
                    self.store(&key.cache_key(), &detail, POST_DETAIL_TTL).await;
                    Ok(WarmOutcome::Warmed)
                }
                None => Ok(WarmOutcome::Skipped),
            },
        }
    }

    /// 从存储重新计算每个键并写入缓存（并发度受 `warm_concurrency` 限制）
    ///
    /// 源数据不存在的键会从缓存删除并记入 `skipped`。
    pub async fn warm(&self, keys: &[WarmKey]) -> WarmReport {
        let mut seen = HashSet::new();
        // 持有所有权的键，保证返回的 future 可以交给 tokio::spawn
        let unique: Vec<WarmKey> = keys.iter().filter(|k| seen.insert(*k)).cloned().collect();

        let results: Vec<(String, Result<WarmOutcome>)> = stream::iter(unique)
            .map(|key| async move {
                let outcome = self.warm_one(&key).await;
                (key.cache_key(), outcome)
            })
            .buffer_unordered(self.options.warm_concurrency)
            .collect()
            .await;

        let mut report = WarmReport::default();
        for (cache_key, outcome) in results {
            match outcome {
                Ok(WarmOutcome::Warmed) => report.warmed.push(cache_key),
                Ok(WarmOutcome::Skipped) => {
                    self.backend.remove(&cache_key).await;
                    report.skipped.push(cache_key);
                }
                Err(e) => {
                    warn!("Failed to warm cache key '{}': {}", cache_key, e);
                    report.failed.push(cache_key);
                }
            }
        }
        report.warmed.sort();
        report.skipped.sort();
        report.failed.sort();
        report
    }

    /// 全部已发布文章在每种语言下的键集合
    pub async fn known_keys(&self) -> Result<Vec<WarmKey>> {
        let slugs = self.storage.list_published_slugs().await?;
        let mut keys = Vec::with_capacity(slugs.len() * (1 + self.options.languages.len()));
        for slug in slugs {
            keys.push(WarmKey::Metrics { slug: slug.clone() });
            for lang in &self.options.languages {
                keys.push(WarmKey::PostDetail {
                    slug: slug.clone(),
                    lang: lang.clone(),
                });
            }
        }
        Ok(keys)
    }

    pub async fn warm_all(&self, clear_first: bool) -> Result<WarmReport> {
        if clear_first {
            self.clear(&ClearScope::All).await;
        }
        let keys = self.known_keys().await?;
        let report = self.warm(&keys).await;
        info!(
            "Cache warm-up finished: {} warmed, {} skipped, {} failed",
            report.warmed.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    pub async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };

        use strum::IntoEnumIterator;
        let ttl_tiers = TtlTier::iter()
            .map(|tier| (tier.to_string(), self.ttl_for(tier)))
            .collect();

        CacheStats {
            backend: self.backend.backend_name().to_string(),
            hits,
            misses,
            hit_rate,
            ttl_tiers,
            health: self.backend.health_check().await,
        }
    }

    /// 写 / 读 / 删各 `iterations` 次临时键，测量后端往返吞吐
    pub async fn performance_test(&self, iterations: usize) -> PerformanceReport {
        let payload = serde_json::json!({ "test": true, "data": (0..100).collect::<Vec<u32>>() })
            .to_string();
        let test_keys: Vec<String> = (0..iterations)
            .map(|i| CacheKey::new(PERF_TEST_PREFIX).arg(i).build())
            .collect();
        let ttl = self.ttl_for(TtlTier::Short);

        let start = Instant::now();
        for key in &test_keys {
            self.backend.insert(key, payload.clone(), ttl).await;
        }
        let write = start.elapsed().as_secs_f64();

        let start = Instant::now();
        let mut hits = 0;
        for key in &test_keys {
            if matches!(self.backend.get(key).await, CacheResult::Found(_)) {
                hits += 1;
            }
        }
        let read = start.elapsed().as_secs_f64();

        let start = Instant::now();
        for key in &test_keys {
            self.backend.remove(key).await;
        }
        let delete = start.elapsed().as_secs_f64();

        let report = PerformanceReport::new(iterations, hits, write, read, delete);
        debug!("Cache performance test: {:?}", report);
        report
    }

    /// 检查每个已知键是否在缓存中、能否解码
    ///
    /// 直接读后端，不计入命中统计。
    pub async fn key_coverage(&self) -> Result<KeyCoverage> {
        let mut statuses = Vec::new();
        for key in self.known_keys().await? {
            let cache_key = key.cache_key();
            let (state, size_bytes) = match self.backend.get(&cache_key).await {
                CacheResult::Miss => (KeyState::NotCached, 0),
                CacheResult::Found(raw) => {
                    let decodes = match &key {
                        WarmKey::Metrics { .. } => {
                            serde_json::from_str::<MetricsSnapshot>(&raw).is_ok()
                        }
                        WarmKey::PostDetail { .. } => {
                            serde_json::from_str::<PostDetail>(&raw).is_ok()
                        }
                    };
                    let state = if decodes {
                        KeyState::Cached
                    } else {
                        KeyState::Undecodable
                    };
                    (state, raw.len())
                }
            };
            let lang = match &key {
                WarmKey::PostDetail { lang, .. } => Some(lang.clone()),
                WarmKey::Metrics { .. } => None,
            };
            statuses.push(KeyStatus {
                key: cache_key,
                slug: key.slug().to_string(),
                lang,
                state,
                size_bytes,
            });
        }
        Ok(KeyCoverage::from_statuses(statuses))
    }

    /// 统计 + 覆盖率；`detailed` 保留逐键状态，`test_performance` 额外测速并给出健康评分
    pub async fn report(&self, detailed: bool, test_performance: bool) -> Result<CacheReport> {
        let stats = self.stats().await;
        let mut coverage = self.key_coverage().await?;
        if !detailed {
            coverage.keys.clear();
        }

        let (performance, score) = if test_performance {
            let performance = self
                .performance_test(crate::cache::report::DEFAULT_PERF_ITERATIONS)
                .await;
            let score = health_score(&performance, &coverage);
            (Some(performance), Some(score))
        } else {
            (None, None)
        };

        Ok(CacheReport {
            stats,
            coverage,
            performance,
            health_score: score,
        })
    }
}
