//! Query operations for SeaOrmStorage

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::SeaOrmStorage;
use super::converters::{build_snapshot, model_to_post};
use super::retry;
use crate::errors::{PostPulseError, Result};
use crate::storage::models::{MetricsSnapshot, Post, ShareTally};

use migration::entities::{post, post_metrics, post_share};

impl SeaOrmStorage {
    pub async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let db = &self.db;
        let model = retry::with_retry(
            &format!("find_post_by_slug({})", slug),
            self.retry_config,
            || async {
                post::Entity::find()
                    .filter(post::Column::Slug.eq(slug))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| PostPulseError::database_operation(format!("Failed to load post: {}", e)))?;

        Ok(model.map(model_to_post))
    }

    pub async fn find_post_by_id(&self, id: i64) -> Result<Option<Post>> {
        let db = &self.db;
        let model = retry::with_retry(
            &format!("find_post_by_id({})", id),
            self.retry_config,
            || async { post::Entity::find_by_id(id).one(db).await },
        )
        .await
        .map_err(|e| PostPulseError::database_operation(format!("Failed to load post: {}", e)))?;

        Ok(model.map(model_to_post))
    }

    /// 查找已发布文章；未发布与不存在都返回 `None`
    pub async fn find_published_post(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self
            .find_post_by_slug(slug)
            .await?
            .filter(|p| p.is_published))
    }

    /// 全部文章，按创建时间倒序
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let db = &self.db;
        let models = retry::with_retry("list_posts", self.retry_config, || async {
            post::Entity::find()
                .order_by_desc(post::Column::CreatedAt)
                .all(db)
                .await
        })
        .await
        .map_err(|e| PostPulseError::database_operation(format!("Failed to list posts: {}", e)))?;

        Ok(models.into_iter().map(model_to_post).collect())
    }

    /// 已发布文章的 slug（缓存预热的键集合来源）
    pub async fn list_published_slugs(&self) -> Result<Vec<String>> {
        let db = &self.db;
        retry::with_retry("list_published_slugs", self.retry_config, || async {
            post::Entity::find()
                .select_only()
                .column(post::Column::Slug)
                .filter(post::Column::IsPublished.eq(true))
                .order_by_desc(post::Column::CreatedAt)
                .into_tuple::<String>()
                .all(db)
                .await
        })
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to list published posts: {}", e))
        })
    }

    pub async fn count_posts(&self) -> Result<u64> {
        let db = &self.db;
        retry::with_retry("count_posts", self.retry_config, || async {
            post::Entity::find().count(db).await
        })
        .await
        .map_err(|e| PostPulseError::database_operation(format!("Failed to count posts: {}", e)))
    }

    /// 读取文章当前的聚合指标
    pub async fn load_metrics(&self, post: &Post) -> Result<MetricsSnapshot> {
        let db = &self.db;
        let post_id = post.id;

        let metrics = retry::with_retry(
            &format!("load_metrics({})", post_id),
            self.retry_config,
            || async { post_metrics::Entity::find_by_id(post_id).one(db).await },
        )
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to load metrics: {}", e))
        })?;

        let shares = retry::with_retry(
            &format!("load_shares({})", post_id),
            self.retry_config,
            || async {
                post_share::Entity::find()
                    .filter(post_share::Column::PostId.eq(post_id))
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| PostPulseError::database_operation(format!("Failed to load shares: {}", e)))?;

        Ok(build_snapshot(post, metrics, shares))
    }

    /// 按 slug 读取指标；文章不存在或未发布时返回 `None`
    pub async fn load_metrics_by_slug(&self, slug: &str) -> Result<Option<MetricsSnapshot>> {
        match self.find_published_post(slug).await? {
            Some(post) => Ok(Some(self.load_metrics(&post).await?)),
            None => Ok(None),
        }
    }

    /// 某渠道的分享计数以及全部渠道总和
    pub async fn load_share_tally(&self, post_id: i64, channel: &str) -> Result<ShareTally> {
        let db = &self.db;
        let counts: Vec<(String, i64)> = retry::with_retry(
            &format!("load_share_counts({})", post_id),
            self.retry_config,
            || async {
                post_share::Entity::find()
                    .select_only()
                    .column(post_share::Column::Channel)
                    .column(post_share::Column::Count)
                    .filter(post_share::Column::PostId.eq(post_id))
                    .into_tuple::<(String, i64)>()
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            PostPulseError::database_operation(format!("Failed to load share counts: {}", e))
        })?;

        let count = counts
            .iter()
            .find(|(c, _)| c == channel)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        let total = counts.iter().map(|(_, n)| *n).sum();
        Ok(ShareTally { count, total })
    }
}
