//! 瞬时数据库错误重试
//!
//! 计数器累加是单条语句，失败后整条重放不会重复计数，
//! 所以遇到锁冲突、死锁、连接池耗尽时可以安全地重试。

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// SQLSTATE / 驱动错误码：MySQL 死锁与锁等待超时、PostgreSQL 序列化失败与死锁、SQLite BUSY/LOCKED
const TRANSIENT_CODES: &[&str] = &["1213", "1205", "40001", "40P01", "5", "6"];

const TRANSIENT_MESSAGES: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "database is locked",
    "database table is locked",
    "serialization failure",
];

/// 判断数据库错误是否为瞬时错误
pub fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => is_transient_runtime(runtime_err),
        _ => false,
    }
}

fn is_transient_runtime(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                return TRANSIENT_CODES.contains(&code.as_ref());
            }
            mentions_lock_conflict(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => mentions_lock_conflict(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn mentions_lock_conflict(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MESSAGES.iter().any(|m| lower.contains(m))
}

/// 重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    pub fn from_database_config(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }

    /// 第 `attempt` 次重试前的等待时间：指数增长、封顶，再加 0-25% 抖动
    pub fn backoff(&self, attempt: u32) -> Duration {
        use rand::RngExt;
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);
        let jitter = rand::rng().random_range(0..=capped / 4);
        Duration::from_millis(capped.saturating_add(jitter))
    }
}

/// 执行 `operation`，瞬时错误按 [`RetryConfig`] 退避重试
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if is_transient(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = config.backoff(attempt);
                warn!(
                    "'{}' failed (attempt {}/{}): {}; retrying in {:?}",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
