use std::sync::Arc;

use tracing::{debug, info};

use super::channels::ShareChannel;
use super::filter::{RequestMeta, TrafficFilter};
use super::submission::{Outcome, PostRef, ReadingSubmission, ShareReceipt};
use crate::cache::CacheService;
use crate::config::{EngagementConfig, SiteSettingsCell};
use crate::errors::{PostPulseError, Result};
use crate::storage::{Post, SeaOrmStorage};

/// 校验阅读 / 分享上报并累加到存储，随后失效对应缓存
pub struct EngagementCollector {
    storage: Arc<SeaOrmStorage>,
    cache: Arc<CacheService>,
    settings: Arc<SiteSettingsCell>,
    min_dwell_seconds: u32,
    completion_threshold: u8,
    filter: TrafficFilter,
}

impl EngagementCollector {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        cache: Arc<CacheService>,
        settings: Arc<SiteSettingsCell>,
        config: &EngagementConfig,
    ) -> Self {
        Self {
            storage,
            cache,
            settings,
            min_dwell_seconds: config.min_dwell_seconds,
            completion_threshold: config.completion_threshold.min(100),
            filter: TrafficFilter::from_config(config),
        }
    }

    pub fn min_dwell_seconds(&self) -> u32 {
        self.min_dwell_seconds
    }

    /// 服务端判定是否完读：最大滚动深度严格大于阈值
    pub fn is_completed(&self, max_scroll_percent: u32) -> bool {
        max_scroll_percent > u32::from(self.completion_threshold)
    }

    /// 过滤 / 开关检查，返回 `Some` 表示忽略本次上报
    fn gate(&self, meta: &RequestMeta) -> Option<Outcome> {
        if let Some(reason) = self.filter.check(meta) {
            debug!("Engagement ignored: {:?}", reason);
            return Some(Outcome::IgnoredFiltered);
        }
        None
    }

    pub async fn record_reading(
        &self,
        submission: &ReadingSubmission,
        meta: &RequestMeta,
    ) -> Result<Outcome> {
        submission.validate().inspect_err(|e| {
            debug!("Rejected reading submission: {}", e);
        })?;

        let post = self
            .storage
            .find_published_post(&submission.post_slug)
            .await?
            .ok_or_else(|| {
                debug!("Reading submission for unknown post '{}'", submission.post_slug);
                PostPulseError::not_found(format!("Post '{}' not found", submission.post_slug))
            })?;

        if let Some(outcome) = self.gate(meta) {
            return Ok(outcome);
        }

        if submission.reading_time_seconds < self.min_dwell_seconds {
            debug!(
                "Reading of '{}' below dwell threshold ({}s < {}s)",
                post.slug, submission.reading_time_seconds, self.min_dwell_seconds
            );
            return Ok(Outcome::IgnoredBelowDwell);
        }

        if !self.settings.tracking_enabled() {
            debug!("Tracking disabled, ignoring reading of '{}'", post.slug);
            return Ok(Outcome::IgnoredTrackingDisabled);
        }

        let completed = self.is_completed(submission.max_scroll_percent);
        if completed != submission.completed_reading {
            debug!(
                "Client completion flag for '{}' ({}) disagrees with scroll depth {}%",
                post.slug, submission.completed_reading, submission.max_scroll_percent
            );
        }

        self.storage
            .increment_reading(post.id, submission.reading_time_seconds, completed)
            .await?;
        self.cache.invalidate_post(&post.slug).await;

        Ok(Outcome::Recorded)
    }

    pub async fn record_share(
        &self,
        post_ref: &PostRef,
        channel: &str,
        meta: &RequestMeta,
    ) -> Result<ShareReceipt> {
        let channel = ShareChannel::parse(channel).inspect_err(|e| {
            debug!("Rejected share: {}", e);
        })?;
        let post = self.resolve_post(post_ref).await?;

        let ignored = self.gate(meta).or_else(|| {
            (!self.settings.tracking_enabled()).then_some(Outcome::IgnoredTrackingDisabled)
        });
        if let Some(outcome) = ignored {
            let tally = self
                .storage
                .load_share_tally(post.id, channel.as_str())
                .await?;
            return Ok(ShareReceipt {
                outcome,
                count: tally.count,
                total: tally.total,
            });
        }

        let tally = self
            .storage
            .increment_share(post.id, channel.as_str())
            .await?;
        self.cache.invalidate_post(&post.slug).await;

        info!(
            "Share of '{}' via {}: {} ({} total)",
            post.slug, channel, tally.count, tally.total
        );
        Ok(ShareReceipt {
            outcome: Outcome::Recorded,
            count: tally.count,
            total: tally.total,
        })
    }

    /// 数字 id 找不到时再按 slug 查一次（纯数字 slug）
    async fn resolve_post(&self, post_ref: &PostRef) -> Result<Post> {
        let found = match post_ref {
            PostRef::Id(id) => match self.storage.find_post_by_id(*id).await? {
                Some(post) => Some(post),
                None => self.storage.find_post_by_slug(&id.to_string()).await?,
            },
            PostRef::Slug(slug) => self.storage.find_post_by_slug(slug).await?,
        };

        found
            .filter(|post| post.is_published)
            .ok_or_else(|| PostPulseError::not_found(format!("Post {} not found", post_ref)))
    }
}
