use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 创建 post_metrics 表（每篇文章一行，只做原子累加）
        manager
            .create_table(
                Table::create()
                    .table(PostMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostMetrics::PostId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PostMetrics::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PostMetrics::TotalReadingSeconds)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PostMetrics::CompletedReads)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PostMetrics::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. 创建 post_shares 表
        manager
            .create_table(
                Table::create()
                    .table(PostShares::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostShares::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostShares::PostId).big_integer().not_null())
                    .col(ColumnDef::new(PostShares::Channel).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PostShares::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PostShares::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：(post_id, channel)，ON CONFLICT 累加依赖它
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_post_shares_post_channel")
                    .table(PostShares::Table)
                    .col(PostShares::PostId)
                    .col(PostShares::Channel)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_post_shares_post_channel")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PostShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostMetrics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PostMetrics {
    #[sea_orm(iden = "post_metrics")]
    Table,
    PostId,
    ViewCount,
    TotalReadingSeconds,
    CompletedReads,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PostShares {
    #[sea_orm(iden = "post_shares")]
    Table,
    Id,
    PostId,
    Channel,
    Count,
    UpdatedAt,
}
