//! site_settings 表读写
//!
//! 单行约束在 [`crate::config::SiteSettingsCell`] 加载时校验。

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, IntoActiveModel, QueryOrder};

use super::SeaOrmStorage;
use super::converters::model_to_site_settings;
use super::retry;
use crate::config::SiteSettings;
use crate::errors::{PostPulseError, Result};
use crate::storage::models::SiteSettingsPatch;

use migration::entities::site_settings;

impl SeaOrmStorage {
    pub async fn load_site_settings_rows(&self) -> Result<Vec<SiteSettings>> {
        let db = &self.db;
        let rows = retry::with_retry("load_site_settings", self.retry_config, || async {
            site_settings::Entity::find()
                .order_by_asc(site_settings::Column::Id)
                .all(db)
                .await
        })
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to load site settings: {}", e))
        })?;

        Ok(rows.into_iter().map(model_to_site_settings).collect())
    }

    pub async fn insert_site_settings(&self, settings: &SiteSettings) -> Result<SiteSettings> {
        Ok(model_to_site_settings(self.insert_site_settings_row(settings).await?))
    }

    async fn insert_site_settings_row(&self, settings: &SiteSettings) -> Result<site_settings::Model> {
        let db = &self.db;
        retry::with_retry("insert_site_settings", self.retry_config, || async {
            let row = site_settings::ActiveModel {
                site_name: Set(settings.site_name.clone()),
                tracking_enabled: Set(settings.tracking_enabled),
                coming_soon_mode: Set(settings.coming_soon_mode),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            row.insert(db).await
        })
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to insert site settings: {}", e))
        })
    }

    /// 更新唯一一行；表为空时先写入默认行，多行时拒绝
    pub async fn update_site_settings(&self, patch: &SiteSettingsPatch) -> Result<SiteSettings> {
        let db = &self.db;
        let mut rows = retry::with_retry("load_site_settings_for_update", self.retry_config, || async {
            site_settings::Entity::find().all(db).await
        })
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to load site settings: {}", e))
        })?;

        let current = match rows.len() {
            0 => {
                self.insert_site_settings_row(&SiteSettings::default())
                    .await?
            }
            1 => rows.remove(0),
            n => {
                return Err(PostPulseError::site_settings(format!(
                    "site_settings must contain exactly one row, found {}",
                    n
                )));
            }
        };

        let model = retry::with_retry("update_site_settings", self.retry_config, || async {
            let mut active = current.clone().into_active_model();
            if let Some(ref name) = patch.site_name {
                active.site_name = Set(name.clone());
            }
            if let Some(enabled) = patch.tracking_enabled {
                active.tracking_enabled = Set(enabled);
            }
            if let Some(coming_soon) = patch.coming_soon_mode {
                active.coming_soon_mode = Set(coming_soon);
            }
            active.updated_at = Set(Utc::now());
            active.update(db).await
        })
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to update site settings: {}", e))
        })?;

        Ok(model_to_site_settings(model))
    }
}
