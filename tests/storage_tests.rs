//! Storage backend tests
//!
//! Tests for SeaOrmStorage using temporary SQLite databases.

use std::sync::Once;

use postpulse::config::{SiteSettings, SiteSettingsCell, StaticConfig, update_config};
use postpulse::errors::PostPulseError;
use postpulse::storage::backend::{SeaOrmStorage, infer_backend_from_url};
use postpulse::storage::{NewPost, SiteSettingsPatch};
use tempfile::TempDir;

// 确保 config 只初始化一次
static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        update_config(StaticConfig::default());
    });
}

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

fn new_post(slug: &str, published: bool) -> NewPost {
    NewPost {
        slug: slug.to_string(),
        title: format!("Post {}", slug),
        is_published: published,
        is_featured: false,
    }
}

#[test]
fn test_infer_backend_from_url() {
    assert_eq!(infer_backend_from_url("sqlite://data.db").unwrap(), "sqlite");
    assert_eq!(
        infer_backend_from_url("postgres://user:pw@localhost/blog").unwrap(),
        "postgres"
    );
    assert_eq!(
        infer_backend_from_url("mysql://user:pw@localhost/blog").unwrap(),
        "mysql"
    );
    assert!(infer_backend_from_url("ftp://nope").is_err());
}

#[tokio::test]
async fn test_insert_and_find_posts() {
    let (storage, _dir) = create_temp_storage().await;

    let post = storage.insert_post(new_post("hello-world", true)).await.unwrap();
    assert!(post.id > 0);
    storage.insert_post(new_post("draft", false)).await.unwrap();

    let by_slug = storage.find_post_by_slug("hello-world").await.unwrap().unwrap();
    assert_eq!(by_slug.id, post.id);
    assert_eq!(by_slug.title, "Post hello-world");
    let by_id = storage.find_post_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(by_id.slug, "hello-world");

    assert!(storage.find_published_post("draft").await.unwrap().is_none());
    assert!(storage.find_post_by_slug("draft").await.unwrap().is_some());

    assert_eq!(storage.count_posts().await.unwrap(), 2);
    assert_eq!(storage.list_posts().await.unwrap().len(), 2);
    assert_eq!(
        storage.list_published_slugs().await.unwrap(),
        vec!["hello-world".to_string()]
    );
}

#[tokio::test]
async fn test_duplicate_slug_rejected() {
    let (storage, _dir) = create_temp_storage().await;

    storage.insert_post(new_post("twice", true)).await.unwrap();
    let err = storage.insert_post(new_post("twice", true)).await.unwrap_err();
    assert!(matches!(err, PostPulseError::Validation(_)));
}

#[tokio::test]
async fn test_metrics_start_empty_and_accumulate() {
    let (storage, _dir) = create_temp_storage().await;
    let post = storage.insert_post(new_post("counted", true)).await.unwrap();

    let empty = storage.load_metrics(&post).await.unwrap();
    assert_eq!(empty.view_count, 0);
    assert_eq!(empty.average_reading_seconds, 0);
    assert!(empty.updated_at.is_none());

    storage.increment_reading(post.id, 20, false).await.unwrap();
    storage.increment_reading(post.id, 41, true).await.unwrap();

    let metrics = storage.load_metrics(&post).await.unwrap();
    assert_eq!(metrics.view_count, 2);
    assert_eq!(metrics.total_reading_seconds, 61);
    assert_eq!(metrics.completed_reads, 1);
    assert_eq!(metrics.average_reading_seconds, 30);
    assert!(metrics.updated_at.is_some());
}

#[tokio::test]
async fn test_share_tally() {
    let (storage, _dir) = create_temp_storage().await;
    let post = storage.insert_post(new_post("shared", true)).await.unwrap();

    let tally = storage.load_share_tally(post.id, "email").await.unwrap();
    assert_eq!((tally.count, tally.total), (0, 0));

    storage.increment_share(post.id, "email").await.unwrap();
    let tally = storage.increment_share(post.id, "copy").await.unwrap();
    assert_eq!((tally.count, tally.total), (1, 2));

    let tally = storage.load_share_tally(post.id, "email").await.unwrap();
    assert_eq!((tally.count, tally.total), (1, 2));
}

#[tokio::test]
async fn test_site_settings_defaults_inserted() {
    let (storage, _dir) = create_temp_storage().await;

    assert!(storage.load_site_settings_rows().await.unwrap().is_empty());
    let cell = SiteSettingsCell::load(&storage).await.unwrap();
    assert!(cell.tracking_enabled());
    assert_eq!(storage.load_site_settings_rows().await.unwrap().len(), 1);

    // 再次加载不会插入第二行
    SiteSettingsCell::load(&storage).await.unwrap();
    assert_eq!(storage.load_site_settings_rows().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_two_site_settings_rows_fail() {
    let (storage, _dir) = create_temp_storage().await;

    storage
        .insert_site_settings(&SiteSettings::default())
        .await
        .unwrap();
    storage
        .insert_site_settings(&SiteSettings::default())
        .await
        .unwrap();

    let err = SiteSettingsCell::load(&storage).await.err().unwrap();
    assert!(matches!(err, PostPulseError::SiteSettings(_)));

    let err = storage
        .update_site_settings(&SiteSettingsPatch {
            tracking_enabled: Some(false),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PostPulseError::SiteSettings(_)));
}

#[tokio::test]
async fn test_update_site_settings_and_reload() {
    let (storage, _dir) = create_temp_storage().await;
    let cell = SiteSettingsCell::load(&storage).await.unwrap();

    let updated = storage
        .update_site_settings(&SiteSettingsPatch {
            site_name: Some("Field Notes".into()),
            tracking_enabled: Some(false),
            coming_soon_mode: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.site_name, "Field Notes");
    assert!(!updated.tracking_enabled);
    assert!(!updated.coming_soon_mode);

    // 重新加载前仍是旧值
    assert!(cell.tracking_enabled());
    cell.reload(&storage).await.unwrap();
    assert!(!cell.tracking_enabled());
    assert_eq!(cell.current().site_name, "Field Notes");
}
