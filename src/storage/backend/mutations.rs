//! Mutation operations for SeaOrmStorage
//!
//! 计数器只增不减，每次累加都是一条 `INSERT .. ON CONFLICT DO UPDATE`，
//! 并发写入不会丢失更新。

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set,
    DatabaseBackend, EntityTrait, ExprTrait,
    sea_query::{Expr, IntoColumnRef, OnConflict},
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::model_to_post;
use super::retry;
use crate::errors::{PostPulseError, Result};
use crate::storage::models::{NewPost, Post, ShareTally};

use migration::entities::{post, post_metrics, post_share};

/// `column = column + <新插入行的同名列>`
///
/// SQLite/PostgreSQL 用 `excluded.column`，MySQL 用 `VALUES(column)`。
fn accumulate<C: IntoColumnRef>(backend: DatabaseBackend, column: C, name: &str) -> Expr {
    let incoming = match backend {
        DatabaseBackend::MySql => format!("VALUES({})", name),
        _ => format!("excluded.{}", name),
    };
    Expr::col(column).add(Expr::cust(incoming))
}

impl SeaOrmStorage {
    /// 一次阅读：view_count +1，阅读时长 +seconds，`completed` 时 completed_reads +1
    pub async fn increment_reading(&self, post_id: i64, seconds: u32, completed: bool) -> Result<()> {
        let db = &self.db;
        let backend = db.get_database_backend();

        let mut on_conflict = OnConflict::column(post_metrics::Column::PostId);
        for (column, name) in [
            (post_metrics::Column::ViewCount, "view_count"),
            (post_metrics::Column::TotalReadingSeconds, "total_reading_seconds"),
            (post_metrics::Column::CompletedReads, "completed_reads"),
        ] {
            on_conflict.value(column, accumulate(backend, column, name));
        }
        on_conflict.update_column(post_metrics::Column::UpdatedAt);

        retry::with_retry(
            &format!("increment_reading({})", post_id),
            self.retry_config,
            || async {
                let row = post_metrics::ActiveModel {
                    post_id: Set(post_id),
                    view_count: Set(1),
                    total_reading_seconds: Set(i64::from(seconds)),
                    completed_reads: Set(if completed { 1 } else { 0 }),
                    updated_at: Set(Utc::now()),
                };
                post_metrics::Entity::insert(row)
                    .on_conflict(on_conflict.clone())
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to record reading: {}", e))
        })?;

        debug!(
            "Reading recorded for post {}: +{}s (completed: {})",
            post_id, seconds, completed
        );
        Ok(())
    }

    /// 分享计数 +1，返回该渠道计数与全部渠道总和
    pub async fn increment_share(&self, post_id: i64, channel: &str) -> Result<ShareTally> {
        let db = &self.db;
        let backend = db.get_database_backend();

        let on_conflict = OnConflict::columns([post_share::Column::PostId, post_share::Column::Channel])
            .value(
                post_share::Column::Count,
                accumulate(backend, post_share::Column::Count, "count"),
            )
            .update_column(post_share::Column::UpdatedAt)
            .to_owned();

        retry::with_retry(
            &format!("increment_share({}, {})", post_id, channel),
            self.retry_config,
            || async {
                let row = post_share::ActiveModel {
                    post_id: Set(post_id),
                    channel: Set(channel.to_string()),
                    count: Set(1),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                };
                post_share::Entity::insert(row)
                    .on_conflict(on_conflict.clone())
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| PostPulseError::database_operation(format!("Failed to record share: {}", e)))?;

        let tally = self.load_share_tally(post_id, channel).await?;

        debug!(
            "Share recorded for post {} via {}: {} ({} total)",
            post_id, channel, tally.count, tally.total
        );
        Ok(tally)
    }

    /// 新建文章；slug 已存在时返回校验错误
    pub async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
        if self.find_post_by_slug(&new_post.slug).await?.is_some() {
            return Err(PostPulseError::validation(format!(
                "Post '{}' already exists",
                new_post.slug
            )));
        }

        let db = &self.db;
        let now = Utc::now();
        let model = retry::with_retry(
            &format!("insert_post({})", new_post.slug),
            self.retry_config,
            || async {
                let row = post::ActiveModel {
                    slug: Set(new_post.slug.clone()),
                    title: Set(new_post.title.clone()),
                    is_published: Set(new_post.is_published),
                    is_featured: Set(new_post.is_featured),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                post::Entity::insert(row).exec_with_returning(db).await
            },
        )
        .await
        .map_err(|e| PostPulseError::database_operation(format!("Failed to insert post: {}", e)))?;

        info!("Post created: {} (id {})", model.slug, model.id);
        Ok(model_to_post(model))
    }
}
