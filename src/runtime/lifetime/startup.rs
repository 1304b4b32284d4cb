use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::{self, CacheService, CacheServiceOptions, ObjectCache};
use crate::config::{SiteSettingsCell, StaticConfig, init_site_settings};
use crate::engagement::EngagementCollector;
use crate::storage::{SeaOrmStorage, StorageFactory};

/// 服务运行所需的全部组件
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub settings: Arc<SiteSettingsCell>,
    pub cache: Arc<CacheService>,
    pub collector: Arc<EngagementCollector>,
}

/// 按配置名创建缓存后端；连接失败时退化为 null 后端，服务照常运行
pub async fn create_cache_backend(cache_type: &str) -> Arc<dyn ObjectCache> {
    cache::register::debug_cache_registry();
    match cache::create_object_cache(cache_type).await {
        Ok(backend) => {
            info!("Using cache backend: {}", backend.backend_name());
            backend
        }
        Err(e) => {
            error!(
                "Failed to initialize '{}' cache ({}), caching disabled",
                cache_type, e
            );
            Arc::new(cache::object_cache::NullObjectCache)
        }
    }
}

/// 组装存储、站点设置、缓存和统计收集器
pub async fn build_context(config: &StaticConfig) -> Result<StartupContext> {
    let storage = StorageFactory::create_with(&config.database.database_url)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    // 多行 site_settings 会在这里直接失败
    let settings = init_site_settings(&storage)
        .await
        .context("Failed to load site settings")?;
    debug!("Site settings loaded: {:?}", settings.current());

    let backend = create_cache_backend(&config.cache.cache_type).await;
    let cache = Arc::new(CacheService::new(
        backend,
        storage.clone(),
        CacheServiceOptions::from_config(&config.cache),
    ));

    let collector = Arc::new(EngagementCollector::new(
        storage.clone(),
        cache.clone(),
        settings.clone(),
        &config.engagement,
    ));

    Ok(StartupContext {
        storage,
        settings,
        cache,
        collector,
    })
}

/// 准备服务器启动的上下文，并按需启动定时预热任务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = crate::config::get_config();
    let context = build_context(&config).await?;

    if config.cache.warm_interval_secs > 0 {
        spawn_warm_task(
            context.cache.clone(),
            Duration::from_secs(config.cache.warm_interval_secs),
        );
    } else {
        debug!("Periodic cache warm-up disabled");
    }

    info!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(context)
}

/// 定时预热：每个周期重新计算所有已知键，出错只记录日志
pub fn spawn_warm_task(cache: Arc<CacheService>, period: Duration) -> JoinHandle<()> {
    info!("Cache warm-up scheduled every {:?}", period);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match cache.warm_all(false).await {
                Ok(report) => debug!(
                    "Scheduled warm-up: {} warmed, {} skipped, {} failed",
                    report.warmed.len(),
                    report.skipped.len(),
                    report.failed.len()
                ),
                Err(e) => warn!("Scheduled cache warm-up failed: {}", e),
            }
        }
    })
}
