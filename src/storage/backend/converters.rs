//! 实体模型与领域模型之间的转换

use std::collections::BTreeMap;

use crate::config::SiteSettings;
use crate::storage::models::{MetricsSnapshot, Post};
use migration::entities::{post, post_metrics, post_share, site_settings};

pub fn model_to_post(model: post::Model) -> Post {
    Post {
        id: model.id,
        slug: model.slug,
        title: model.title,
        is_published: model.is_published,
        is_featured: model.is_featured,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn model_to_site_settings(model: site_settings::Model) -> SiteSettings {
    SiteSettings {
        site_name: model.site_name,
        tracking_enabled: model.tracking_enabled,
        coming_soon_mode: model.coming_soon_mode,
        updated_at: model.updated_at,
    }
}

/// 合并计数行与分享行为快照
pub fn build_snapshot(
    post: &Post,
    metrics: Option<post_metrics::Model>,
    shares: Vec<post_share::Model>,
) -> MetricsSnapshot {
    let mut snapshot = MetricsSnapshot::empty(post);

    if let Some(m) = metrics {
        snapshot.view_count = m.view_count;
        snapshot.total_reading_seconds = m.total_reading_seconds;
        snapshot.completed_reads = m.completed_reads;
        snapshot.average_reading_seconds = if m.view_count > 0 {
            m.total_reading_seconds / m.view_count
        } else {
            0
        };
        snapshot.updated_at = Some(m.updated_at);
    }

    let shares: BTreeMap<String, i64> = shares.into_iter().map(|s| (s.channel, s.count)).collect();
    snapshot.total_shares = shares.values().sum();
    snapshot.shares = shares;
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post() -> Post {
        Post {
            id: 3,
            slug: "hello-world".to_string(),
            title: "Hello".to_string(),
            is_published: true,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_without_rows_is_zeroed() {
        let s = build_snapshot(&post(), None, vec![]);
        assert_eq!(s.view_count, 0);
        assert_eq!(s.total_shares, 0);
        assert!(s.updated_at.is_none());
    }

    #[test]
    fn test_snapshot_sums_shares_and_averages() {
        let now = Utc::now();
        let metrics = post_metrics::Model {
            post_id: 3,
            view_count: 4,
            total_reading_seconds: 130,
            completed_reads: 1,
            updated_at: now,
        };
        let shares = vec![
            post_share::Model {
                id: 1,
                post_id: 3,
                channel: "twitter".to_string(),
                count: 2,
                updated_at: now,
            },
            post_share::Model {
                id: 2,
                post_id: 3,
                channel: "email".to_string(),
                count: 5,
                updated_at: now,
            },
        ];
        let s = build_snapshot(&post(), Some(metrics), shares);
        assert_eq!(s.average_reading_seconds, 32);
        assert_eq!(s.total_shares, 7);
        assert_eq!(s.shares.get("email"), Some(&5));
    }
}
