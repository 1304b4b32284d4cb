//! Cache service tests
//!
//! Read-through, invalidation and warm-up against a temporary SQLite database.

use std::sync::{Arc, Once};
use std::time::Duration;

use postpulse::cache::object_cache::{MemoryObjectCache, NullObjectCache};
use postpulse::cache::{
    CacheResult, CacheService, CacheServiceOptions, ClearScope, ObjectCache, WarmKey,
};
use postpulse::config::{StaticConfig, TtlTierConfig, update_config};
use postpulse::runtime::lifetime::startup::spawn_warm_task;
use postpulse::storage::{MetricsSnapshot, NewPost, PostDetail, SeaOrmStorage};
use tempfile::TempDir;

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        update_config(StaticConfig::default());
    });
}

fn options(languages: &[&str]) -> CacheServiceOptions {
    CacheServiceOptions {
        ttl: TtlTierConfig::default(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        warm_concurrency: 4,
    }
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("cache.db").display());
    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");
    (Arc::new(storage), dir)
}

async fn add_post(storage: &SeaOrmStorage, slug: &str, published: bool) -> i64 {
    storage
        .insert_post(NewPost {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            is_published: published,
            is_featured: false,
        })
        .await
        .expect("Failed to insert post")
        .id
}

fn memory_backend() -> Arc<dyn ObjectCache> {
    Arc::new(MemoryObjectCache::new(1000, 300))
}

async fn cached<T: serde::de::DeserializeOwned>(backend: &Arc<dyn ObjectCache>, key: &str) -> Option<T> {
    match backend.get(key).await {
        CacheResult::Found(raw) => Some(serde_json::from_str(&raw).expect("valid cache entry")),
        CacheResult::Miss => None,
    }
}

#[tokio::test]
async fn test_metrics_read_through_populates_cache() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "hello-world", true).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en"]));

    let key = WarmKey::Metrics {
        slug: "hello-world".into(),
    }
    .cache_key();
    assert!(cached::<MetricsSnapshot>(&backend, &key).await.is_none());

    let first = service.get_metrics("hello-world").await.unwrap().unwrap();
    assert_eq!(cached::<MetricsSnapshot>(&backend, &key).await, Some(first.clone()));

    // 直接改存储，未失效前仍返回缓存值
    storage.increment_reading(first.post_id, 30, false).await.unwrap();
    let stale = service.get_metrics("hello-world").await.unwrap().unwrap();
    assert_eq!(stale.view_count, 0);

    let stats = service.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_invalidate_post_forces_miss() {
    let (storage, _dir) = create_temp_storage().await;
    let id = add_post(&storage, "invalidate-me", true).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en", "de"]));

    service.get_metrics("invalidate-me").await.unwrap();
    service.get_post_detail("invalidate-me", "en").await.unwrap();
    service.get_post_detail("invalidate-me", "de").await.unwrap();

    storage.increment_share(id, "email").await.unwrap();
    service.invalidate_post("invalidate-me").await;

    for key in [
        WarmKey::Metrics {
            slug: "invalidate-me".into(),
        },
        WarmKey::PostDetail {
            slug: "invalidate-me".into(),
            lang: "en".into(),
        },
        WarmKey::PostDetail {
            slug: "invalidate-me".into(),
            lang: "de".into(),
        },
    ] {
        assert_eq!(backend.get(&key.cache_key()).await, CacheResult::Miss);
    }

    let fresh = service.get_metrics("invalidate-me").await.unwrap().unwrap();
    assert_eq!(fresh.total_shares, 1);
    let detail = service
        .get_post_detail("invalidate-me", "de")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.metrics.total_shares, 1);
    assert_eq!(detail.lang, "de");
}

#[tokio::test]
async fn test_invalidate_post_with_hashed_keys() {
    let (storage, _dir) = create_temp_storage().await;
    let slug = "a-very-long-slug-".repeat(11);
    add_post(&storage, &slug, true).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en"]));

    service.get_post_detail(&slug, "en").await.unwrap();
    let key = WarmKey::PostDetail {
        slug: slug.clone(),
        lang: "en".into(),
    }
    .cache_key();
    assert!(matches!(backend.get(&key).await, CacheResult::Found(_)));

    service.invalidate_post(&slug).await;
    assert_eq!(backend.get(&key).await, CacheResult::Miss);
}

#[tokio::test]
async fn test_draft_posts_are_not_cached() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "draft", false).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en"]));

    assert!(service.get_metrics("draft").await.unwrap().is_none());
    assert!(service.get_post_detail("draft", "en").await.unwrap().is_none());
    assert!(service.get_metrics("never-existed").await.unwrap().is_none());

    let key = WarmKey::Metrics {
        slug: "draft".into(),
    }
    .cache_key();
    assert_eq!(backend.get(&key).await, CacheResult::Miss);
}

#[tokio::test]
async fn test_unconfigured_language_is_not_cached() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "polyglot", true).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en"]));

    assert!(service.supports_language("en"));
    assert!(!service.supports_language("fr"));
    assert!(service.get_post_detail("polyglot", "fr").await.unwrap().is_none());

    let key = WarmKey::PostDetail {
        slug: "polyglot".into(),
        lang: "fr".into(),
    }
    .cache_key();
    assert_eq!(backend.get(&key).await, CacheResult::Miss);
}

#[tokio::test]
async fn test_undecodable_entry_is_dropped() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "corrupt", true).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en"]));

    let key = WarmKey::Metrics {
        slug: "corrupt".into(),
    }
    .cache_key();
    backend.insert(&key, "{not json".to_string(), 60).await;

    let snapshot = service.get_metrics("corrupt").await.unwrap().unwrap();
    assert_eq!(snapshot.slug, "corrupt");
    assert_eq!(cached::<MetricsSnapshot>(&backend, &key).await, Some(snapshot));
}

#[tokio::test]
async fn test_warm_matches_fresh_computation() {
    let (storage, _dir) = create_temp_storage().await;
    let id = add_post(&storage, "warm-a", true).await;
    add_post(&storage, "warm-b", true).await;
    add_post(&storage, "warm-draft", false).await;
    storage.increment_reading(id, 42, true).await.unwrap();
    storage.increment_share(id, "telegram").await.unwrap();

    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en", "fr"]));

    let report = service.warm_all(false).await.unwrap();
    // 2 篇已发布文章 × (metrics + 2 种语言)
    assert_eq!(report.warmed.len(), 6);
    assert!(report.skipped.is_empty());
    assert!(report.failed.is_empty());

    for slug in ["warm-a", "warm-b"] {
        let fresh = storage.load_metrics_by_slug(slug).await.unwrap().unwrap();
        let key = WarmKey::Metrics { slug: slug.into() }.cache_key();
        assert_eq!(cached::<MetricsSnapshot>(&backend, &key).await, Some(fresh.clone()));

        for lang in ["en", "fr"] {
            let key = WarmKey::PostDetail {
                slug: slug.into(),
                lang: lang.into(),
            }
            .cache_key();
            let detail: PostDetail = cached(&backend, &key).await.unwrap();
            assert_eq!(detail.metrics, fresh);
            assert_eq!(detail.lang, lang);
        }
    }

    let draft_key = WarmKey::Metrics {
        slug: "warm-draft".into(),
    }
    .cache_key();
    assert_eq!(backend.get(&draft_key).await, CacheResult::Miss);
}

#[tokio::test]
async fn test_warm_skips_missing_slug() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "present", true).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en"]));

    let gone = WarmKey::Metrics {
        slug: "gone".into(),
    };
    // 残留的旧条目在预热时被删除
    backend.insert(&gone.cache_key(), "{}".to_string(), 60).await;

    let keys = vec![
        WarmKey::Metrics {
            slug: "present".into(),
        },
        gone.clone(),
        gone.clone(),
    ];
    let report = service.warm(&keys).await;

    assert_eq!(report.warmed, vec![keys[0].cache_key()]);
    assert_eq!(report.skipped, vec![gone.cache_key()]);
    assert!(report.failed.is_empty());
    assert_eq!(backend.get(&gone.cache_key()).await, CacheResult::Miss);
}

#[tokio::test]
async fn test_clear_scopes() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "one", true).await;
    add_post(&storage, "two", true).await;
    let backend = memory_backend();
    let service = CacheService::new(backend.clone(), storage.clone(), options(&["en"]));

    let metrics_one = WarmKey::Metrics { slug: "one".into() }.cache_key();
    let metrics_two = WarmKey::Metrics { slug: "two".into() }.cache_key();
    let detail_one = WarmKey::PostDetail {
        slug: "one".into(),
        lang: "en".into(),
    }
    .cache_key();

    service.warm_all(false).await.unwrap();
    service.clear(&ClearScope::Metrics).await;
    assert_eq!(backend.get(&metrics_one).await, CacheResult::Miss);
    assert_eq!(backend.get(&metrics_two).await, CacheResult::Miss);
    assert!(matches!(backend.get(&detail_one).await, CacheResult::Found(_)));

    service.warm_all(false).await.unwrap();
    service.clear(&ClearScope::Post("one".into())).await;
    assert_eq!(backend.get(&metrics_one).await, CacheResult::Miss);
    assert_eq!(backend.get(&detail_one).await, CacheResult::Miss);
    assert!(matches!(backend.get(&metrics_two).await, CacheResult::Found(_)));

    service.clear(&ClearScope::Details).await;
    assert!(matches!(backend.get(&metrics_two).await, CacheResult::Found(_)));

    let report = service.warm_all(true).await.unwrap();
    assert_eq!(report.warmed.len(), 4);
    service.clear(&ClearScope::All).await;
    assert_eq!(backend.get(&metrics_two).await, CacheResult::Miss);
}

#[tokio::test]
async fn test_null_backend_still_correct() {
    let (storage, _dir) = create_temp_storage().await;
    let id = add_post(&storage, "uncached", true).await;
    let service = CacheService::new(
        Arc::new(NullObjectCache),
        storage.clone(),
        options(&["en"]),
    );

    assert_eq!(
        service.get_metrics("uncached").await.unwrap().unwrap().view_count,
        0
    );
    storage.increment_reading(id, 20, false).await.unwrap();
    // 无需失效即可看到最新值
    assert_eq!(
        service.get_metrics("uncached").await.unwrap().unwrap().view_count,
        1
    );

    let report = service.warm_all(true).await.unwrap();
    assert_eq!(report.warmed.len(), 2);

    let stats = service.stats().await;
    assert_eq!(stats.backend, "null");
    assert_eq!(stats.hits, 0);
    assert!(stats.health.is_healthy());
}

#[tokio::test]
async fn test_warm_all_runs_on_spawned_task() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "spawned", true).await;
    let backend = memory_backend();
    let service = Arc::new(CacheService::new(
        backend.clone(),
        storage.clone(),
        options(&["en"]),
    ));

    let worker = service.clone();
    let report = tokio::spawn(async move { worker.warm_all(true).await })
        .await
        .expect("warm task panicked")
        .unwrap();
    assert_eq!(report.warmed.len(), 2);

    let key = WarmKey::Metrics {
        slug: "spawned".into(),
    }
    .cache_key();
    assert!(matches!(backend.get(&key).await, CacheResult::Found(_)));
}

#[tokio::test]
async fn test_scheduled_warm_task_populates_cache() {
    let (storage, _dir) = create_temp_storage().await;
    add_post(&storage, "scheduled", true).await;
    let backend = memory_backend();
    let service = Arc::new(CacheService::new(
        backend.clone(),
        storage.clone(),
        options(&["en"]),
    ));

    let key = WarmKey::PostDetail {
        slug: "scheduled".into(),
        lang: "en".into(),
    }
    .cache_key();
    assert_eq!(backend.get(&key).await, CacheResult::Miss);

    let handle = spawn_warm_task(service, Duration::from_millis(20));
    let mut found = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if matches!(backend.get(&key).await, CacheResult::Found(_)) {
            found = true;
            break;
        }
    }
    handle.abort();
    assert!(found, "scheduled warm-up never populated the cache");
}
