//! 缓存诊断报告
//!
//! - 读写删往返性能测试（临时键，结束后删除）
//! - 已知键（已发布文章 × 语言）的缓存覆盖情况
//! - 0-100 健康评分
//!
//! 覆盖率直接查询后端，和命中计数不同，跨进程（redis）时 CLI 也能得到有意义的结果。

use serde::Serialize;

use crate::cache::CacheStats;

/// 性能测试临时键前缀
pub const PERF_TEST_PREFIX: &str = "blog_perf_test";
pub const DEFAULT_PERF_ITERATIONS: usize = 50;

/// 读 / 写性能分档：(ops/s 下限, 得分)
const READ_TIERS: &[(f64, f64)] = &[(1000.0, 15.0), (500.0, 12.0), (100.0, 8.0), (50.0, 4.0)];
const WRITE_TIERS: &[(f64, f64)] = &[(500.0, 15.0), (250.0, 12.0), (100.0, 8.0), (50.0, 4.0)];

const HIT_RATE_POINTS: f64 = 10.0;
const COVERAGE_POINTS: f64 = 35.0;
const FRESHNESS_POINTS: f64 = 15.0;
const QUALITY_POINTS: f64 = 10.0;

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub iterations: usize,
    pub write_ops_per_sec: f64,
    pub read_ops_per_sec: f64,
    pub delete_ops_per_sec: f64,
    pub hit_rate_percent: f64,
    pub total_secs: f64,
}

impl PerformanceReport {
    pub fn new(iterations: usize, hits: usize, write: f64, read: f64, delete: f64) -> Self {
        let rate = |secs: f64| {
            if secs > 0.0 {
                round1(iterations as f64 / secs)
            } else {
                0.0
            }
        };
        let hit_rate_percent = if iterations == 0 {
            0.0
        } else {
            round1(hits as f64 * 100.0 / iterations as f64)
        };
        Self {
            iterations,
            write_ops_per_sec: rate(write),
            read_ops_per_sec: rate(read),
            delete_ops_per_sec: rate(delete),
            hit_rate_percent,
            total_secs: ((write + read + delete) * 1000.0).round() / 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Cached,
    NotCached,
    /// 存在但无法解码，下次读取时会被丢弃
    Undecodable,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyStatus {
    pub key: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    pub state: KeyState,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyCoverage {
    pub total: usize,
    pub cached: usize,
    pub undecodable: usize,
    pub coverage_percent: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<KeyStatus>,
}

impl KeyCoverage {
    pub fn from_statuses(keys: Vec<KeyStatus>) -> Self {
        let total = keys.len();
        let cached = keys.iter().filter(|k| k.state == KeyState::Cached).count();
        let undecodable = keys
            .iter()
            .filter(|k| k.state == KeyState::Undecodable)
            .count();
        Self {
            total,
            cached,
            undecodable,
            coverage_percent: percent(cached + undecodable, total),
            keys,
        }
    }

    /// 条目可解码的比例
    pub fn quality_percent(&self) -> f64 {
        percent(self.cached, self.total)
    }
}

/// `GET {admin}/cache/stats` 与 `cache stats` 的完整输出
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub coverage: KeyCoverage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
}

/// 健康评分（0-100）
///
/// 性能 40 分（读 15、写 15、命中率 10），覆盖率 35 分，新鲜度 15 分，
/// 数据可解码 10 分。所有 TTL 档位都不超过一小时，在缓存中的条目即视为新鲜。
pub fn health_score(performance: &PerformanceReport, coverage: &KeyCoverage) -> f64 {
    let tiered = |ops: f64, tiers: &[(f64, f64)]| {
        tiers
            .iter()
            .find(|(min, _)| ops >= *min)
            .map_or(0.0, |(_, points)| *points)
    };

    let mut score = tiered(performance.read_ops_per_sec, READ_TIERS)
        + tiered(performance.write_ops_per_sec, WRITE_TIERS)
        + (performance.hit_rate_percent / 10.0).min(HIT_RATE_POINTS);

    if coverage.total > 0 {
        score += coverage.coverage_percent / 100.0 * COVERAGE_POINTS;
        score += coverage.coverage_percent / 100.0 * FRESHNESS_POINTS;
        score += coverage.quality_percent() / 100.0 * QUALITY_POINTS;
    }

    round1(score).min(100.0)
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 * 100.0 / total as f64)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
