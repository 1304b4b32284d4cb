//! Engagement collector tests
//!
//! Reading / share submissions against a temporary SQLite database.

use std::sync::{Arc, Once};

use postpulse::cache::object_cache::MemoryObjectCache;
use postpulse::cache::{CacheService, CacheServiceOptions, ObjectCache};
use postpulse::config::{EngagementConfig, SiteSettings, SiteSettingsCell, StaticConfig, update_config};
use postpulse::engagement::{
    EngagementCollector, Outcome, PostRef, ReadingSubmission, RequestMeta,
};
use postpulse::errors::PostPulseError;
use postpulse::storage::{NewPost, Post, SeaOrmStorage};
use tempfile::TempDir;

static INIT: Once = Once::new();

const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

fn init_test_config() {
    INIT.call_once(|| {
        update_config(StaticConfig::default());
    });
}

struct TestEnv {
    storage: Arc<SeaOrmStorage>,
    cache: Arc<CacheService>,
    settings: Arc<SiteSettingsCell>,
    collector: EngagementCollector,
    _dir: TempDir,
}

async fn setup() -> TestEnv {
    setup_with(EngagementConfig::default()).await
}

async fn setup_with(engagement: EngagementConfig) -> TestEnv {
    init_test_config();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("engagement.db").display());
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );

    let backend: Arc<dyn ObjectCache> = Arc::new(MemoryObjectCache::new(1000, 300));
    let cache = Arc::new(CacheService::new(
        backend,
        storage.clone(),
        CacheServiceOptions::default(),
    ));
    let settings = Arc::new(SiteSettingsCell::new(SiteSettings::default()));
    let collector =
        EngagementCollector::new(storage.clone(), cache.clone(), settings.clone(), &engagement);

    TestEnv {
        storage,
        cache,
        settings,
        collector,
        _dir: dir,
    }
}

async fn add_post(storage: &SeaOrmStorage, slug: &str, published: bool) -> Post {
    storage
        .insert_post(NewPost {
            slug: slug.to_string(),
            title: format!("Title of {}", slug),
            is_published: published,
            is_featured: false,
        })
        .await
        .expect("Failed to insert post")
}

fn browser() -> RequestMeta {
    RequestMeta::new(None, Some(BROWSER_UA), Some("*/*"))
}

fn reading(slug: &str, seconds: u32, scroll: u32) -> ReadingSubmission {
    ReadingSubmission {
        post_slug: slug.to_string(),
        reading_time_seconds: seconds,
        max_scroll_percent: scroll,
        completed_reading: scroll > 80,
    }
}

#[tokio::test]
async fn test_reading_below_dwell_is_ignored() {
    let env = setup().await;
    let post = add_post(&env.storage, "dwell", true).await;

    let outcome = env
        .collector
        .record_reading(&reading("dwell", 9, 50), &browser())
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::IgnoredBelowDwell);

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.view_count, 0);
    assert_eq!(metrics.total_reading_seconds, 0);

    // 恰好等于阈值时计数
    let outcome = env
        .collector
        .record_reading(&reading("dwell", 10, 50), &browser())
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Recorded);
    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.view_count, 1);
    assert_eq!(metrics.total_reading_seconds, 10);
}

#[tokio::test]
async fn test_completion_requires_scroll_above_threshold() {
    let env = setup().await;
    let post = add_post(&env.storage, "completion", true).await;

    for scroll in [80, 81, 100] {
        env.collector
            .record_reading(&reading("completion", 30, scroll), &browser())
            .await
            .unwrap();
    }

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.view_count, 3);
    assert_eq!(metrics.completed_reads, 2);
    assert_eq!(metrics.total_reading_seconds, 90);
    assert_eq!(metrics.average_reading_seconds, 30);
}

#[tokio::test]
async fn test_client_completion_flag_is_not_trusted() {
    let env = setup().await;
    let post = add_post(&env.storage, "flag", true).await;

    let mut submission = reading("flag", 20, 40);
    submission.completed_reading = true;
    env.collector
        .record_reading(&submission, &browser())
        .await
        .unwrap();

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.completed_reads, 0);
}

#[tokio::test]
async fn test_reading_validation_errors() {
    let env = setup().await;
    add_post(&env.storage, "valid", true).await;

    let err = env
        .collector
        .record_reading(&reading("valid", 20, 101), &browser())
        .await
        .unwrap_err();
    assert!(matches!(err, PostPulseError::Validation(_)));

    let err = env
        .collector
        .record_reading(&reading("", 20, 50), &browser())
        .await
        .unwrap_err();
    assert!(matches!(err, PostPulseError::Validation(_)));
}

#[tokio::test]
async fn test_reading_unknown_or_draft_post_not_found() {
    let env = setup().await;
    add_post(&env.storage, "draft", false).await;

    for slug in ["missing", "draft"] {
        let err = env
            .collector
            .record_reading(&reading(slug, 20, 50), &browser())
            .await
            .unwrap_err();
        assert!(matches!(err, PostPulseError::NotFound(_)), "slug {}", slug);
    }
}

#[tokio::test]
async fn test_dnt_and_bots_do_not_mutate() {
    let env = setup().await;
    let post = add_post(&env.storage, "filtered", true).await;

    let dnt = RequestMeta::new(Some("1"), Some(BROWSER_UA), Some("*/*"));
    let bot = RequestMeta::new(
        None,
        Some("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"),
        Some("*/*"),
    );
    let empty = RequestMeta::new(None, None, None);
    // 真实浏览器 UA，但没有 Accept 头
    let no_accept = RequestMeta::new(None, Some(BROWSER_UA), None);

    for meta in [&dnt, &bot, &empty, &no_accept] {
        let outcome = env
            .collector
            .record_reading(&reading("filtered", 60, 100), meta)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::IgnoredFiltered);

        let receipt = env
            .collector
            .record_share(&PostRef::Slug("filtered".into()), "twitter", meta)
            .await
            .unwrap();
        assert_eq!(receipt.outcome, Outcome::IgnoredFiltered);
        assert_eq!(receipt.count, 0);
    }

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.view_count, 0);
    assert_eq!(metrics.total_shares, 0);
}

#[tokio::test]
async fn test_filters_can_be_disabled() {
    let env = setup_with(EngagementConfig {
        respect_dnt: false,
        filter_bots: false,
        ..Default::default()
    })
    .await;
    let post = add_post(&env.storage, "unfiltered", true).await;

    let outcome = env
        .collector
        .record_reading(&reading("unfiltered", 60, 100), &RequestMeta::new(Some("1"), Some("curl/8.0"), None))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Recorded);
    assert_eq!(env.storage.load_metrics(&post).await.unwrap().view_count, 1);
}

#[tokio::test]
async fn test_tracking_disabled_ignores_everything() {
    let env = setup().await;
    let post = add_post(&env.storage, "disabled", true).await;
    env.storage
        .increment_share(post.id, "email")
        .await
        .unwrap();

    env.settings.replace(SiteSettings {
        tracking_enabled: false,
        ..SiteSettings::default()
    });

    let outcome = env
        .collector
        .record_reading(&reading("disabled", 60, 100), &browser())
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::IgnoredTrackingDisabled);

    let receipt = env
        .collector
        .record_share(&PostRef::Slug("disabled".into()), "email", &browser())
        .await
        .unwrap();
    assert_eq!(receipt.outcome, Outcome::IgnoredTrackingDisabled);
    assert_eq!(receipt.count, 1);
    assert_eq!(receipt.total, 1);

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.view_count, 0);
    assert_eq!(metrics.total_shares, 1);
}

#[tokio::test]
async fn test_share_twice_counts_two() {
    let env = setup().await;
    add_post(&env.storage, "share", true).await;

    let first = env
        .collector
        .record_share(&PostRef::Slug("share".into()), "linkedin", &browser())
        .await
        .unwrap();
    assert_eq!((first.count, first.total), (1, 1));

    let second = env
        .collector
        .record_share(&PostRef::Slug("share".into()), "linkedin", &browser())
        .await
        .unwrap();
    assert_eq!(second.outcome, Outcome::Recorded);
    assert_eq!((second.count, second.total), (2, 2));

    let other = env
        .collector
        .record_share(&PostRef::Slug("share".into()), "facebook", &browser())
        .await
        .unwrap();
    assert_eq!((other.count, other.total), (1, 3));
}

#[tokio::test]
async fn test_share_channel_is_case_insensitive() {
    let env = setup().await;
    let post = add_post(&env.storage, "case", true).await;

    for channel in ["Twitter", "TWITTER", " twitter "] {
        env.collector
            .record_share(&PostRef::Slug("case".into()), channel, &browser())
            .await
            .unwrap();
    }

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.shares.get("twitter"), Some(&3));
    assert_eq!(metrics.shares.len(), 1);
}

#[tokio::test]
async fn test_unknown_channel_leaves_counters_unchanged() {
    let env = setup().await;
    let post = add_post(&env.storage, "channels", true).await;

    let err = env
        .collector
        .record_share(&PostRef::Slug("channels".into()), "myspace", &browser())
        .await
        .unwrap_err();
    assert!(matches!(err, PostPulseError::Validation(_)));

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.total_shares, 0);
    assert!(metrics.shares.is_empty());
}

#[tokio::test]
async fn test_share_by_numeric_id_and_numeric_slug() {
    let env = setup().await;
    let post = add_post(&env.storage, "by-id", true).await;
    let numeric = add_post(&env.storage, "2024", true).await;

    let receipt = env
        .collector
        .record_share(&PostRef::Id(post.id), "email", &browser())
        .await
        .unwrap();
    assert_eq!(receipt.count, 1);

    // 不存在的 id 退回按 slug 查找
    let receipt = env
        .collector
        .record_share(&PostRef::parse("2024").unwrap(), "email", &browser())
        .await
        .unwrap();
    assert_eq!(receipt.count, 1);
    assert_eq!(
        env.storage.load_metrics(&numeric).await.unwrap().total_shares,
        1
    );

    let err = env
        .collector
        .record_share(&PostRef::Id(99_999), "email", &browser())
        .await
        .unwrap_err();
    assert!(matches!(err, PostPulseError::NotFound(_)));
}

#[tokio::test]
async fn test_share_for_draft_is_not_found() {
    let env = setup().await;
    add_post(&env.storage, "unpublished", false).await;

    let err = env
        .collector
        .record_share(&PostRef::Slug("unpublished".into()), "email", &browser())
        .await
        .unwrap_err();
    assert!(matches!(err, PostPulseError::NotFound(_)));
}

#[tokio::test]
async fn test_recording_invalidates_cached_metrics() {
    let env = setup().await;
    add_post(&env.storage, "fresh", true).await;

    let before = env.cache.get_metrics("fresh").await.unwrap().unwrap();
    assert_eq!(before.view_count, 0);

    env.collector
        .record_reading(&reading("fresh", 15, 90), &browser())
        .await
        .unwrap();
    env.collector
        .record_share(&PostRef::Slug("fresh".into()), "reddit", &browser())
        .await
        .unwrap();

    let after = env.cache.get_metrics("fresh").await.unwrap().unwrap();
    assert_eq!(after.view_count, 1);
    assert_eq!(after.completed_reads, 1);
    assert_eq!(after.total_shares, 1);
}

#[tokio::test]
async fn test_concurrent_increments_are_not_lost() {
    const TASKS: usize = 30;
    const PER_TASK: usize = 5;

    let env = setup().await;
    let post = add_post(&env.storage, "busy", true).await;
    let collector = Arc::new(env.collector);

    let mut handles = Vec::with_capacity(TASKS);
    for i in 0..TASKS {
        let collector = collector.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..PER_TASK {
                if i % 2 == 0 {
                    collector
                        .record_reading(&reading("busy", 30, 50), &browser())
                        .await
                        .unwrap();
                } else {
                    collector
                        .record_share(&PostRef::Slug("busy".into()), "hackernews", &browser())
                        .await
                        .unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let metrics = env.storage.load_metrics(&post).await.unwrap();
    let per_kind = (TASKS / 2 * PER_TASK) as i64;
    assert_eq!(metrics.view_count, per_kind);
    assert_eq!(metrics.total_reading_seconds, per_kind * 30);
    assert_eq!(metrics.shares.get("hackernews"), Some(&per_kind));
    assert_eq!(metrics.total_shares, per_kind);
}
