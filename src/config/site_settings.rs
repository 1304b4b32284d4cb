//! 站点设置单例
//!
//! `site_settings` 表只允许一行。启动时加载到进程级 `ArcSwap` 中，
//! 请求处理时无锁读取；CLI 或管理操作修改后调用 `reload` 替换。

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{PostPulseError, Result};
use crate::storage::SeaOrmStorage;

/// 站点级开关
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub tracking_enabled: bool,
    pub coming_soon_mode: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "My Blog".to_string(),
            tracking_enabled: true,
            coming_soon_mode: false,
            updated_at: Utc::now(),
        }
    }
}

/// 可热替换的站点设置
pub struct SiteSettingsCell {
    inner: ArcSwap<SiteSettings>,
}

impl SiteSettingsCell {
    pub fn new(settings: SiteSettings) -> Self {
        Self {
            inner: ArcSwap::from_pointee(settings),
        }
    }

    /// 从数据库加载
    ///
    /// - 0 行：写入默认行
    /// - 1 行：直接使用
    /// - 多行：返回错误，拒绝启动
    pub async fn load(storage: &SeaOrmStorage) -> Result<Self> {
        Ok(Self::new(load_single_row(storage).await?))
    }

    /// 当前快照
    pub fn current(&self) -> Arc<SiteSettings> {
        self.inner.load_full()
    }

    pub fn tracking_enabled(&self) -> bool {
        self.inner.load().tracking_enabled
    }

    pub fn replace(&self, settings: SiteSettings) {
        self.inner.store(Arc::new(settings));
    }

    /// 重新从数据库读取并替换
    pub async fn reload(&self, storage: &SeaOrmStorage) -> Result<()> {
        let fresh = load_single_row(storage).await?;
        self.replace(fresh);
        Ok(())
    }
}

async fn load_single_row(storage: &SeaOrmStorage) -> Result<SiteSettings> {
    let mut rows = storage.load_site_settings_rows().await?;
    match rows.len() {
        0 => {
            warn!("No site settings row found, inserting defaults");
            storage.insert_site_settings(&SiteSettings::default()).await
        }
        1 => Ok(rows.remove(0)),
        n => Err(PostPulseError::site_settings(format!(
            "site_settings must contain exactly one row, found {}",
            n
        ))),
    }
}

static SITE_SETTINGS: OnceLock<Arc<SiteSettingsCell>> = OnceLock::new();

/// 加载并注册进程级站点设置
///
/// 已初始化时直接返回现有实例并刷新其内容。
pub async fn init_site_settings(storage: &SeaOrmStorage) -> Result<Arc<SiteSettingsCell>> {
    if let Some(cell) = SITE_SETTINGS.get() {
        cell.reload(storage).await?;
        return Ok(cell.clone());
    }

    let cell = Arc::new(SiteSettingsCell::load(storage).await?);
    let current = cell.current();
    info!(
        "Site settings loaded: '{}' (tracking: {}, coming soon: {})",
        current.site_name, current.tracking_enabled, current.coming_soon_mode
    );
    Ok(SITE_SETTINGS.get_or_init(|| cell).clone())
}

pub fn get_site_settings() -> Option<Arc<SiteSettingsCell>> {
    SITE_SETTINGS.get().cloned()
}

/// 重新加载进程级站点设置（未初始化时等同于 init）
pub async fn reload_site_settings(storage: &SeaOrmStorage) -> Result<Arc<SiteSettingsCell>> {
    init_site_settings(storage).await
}
