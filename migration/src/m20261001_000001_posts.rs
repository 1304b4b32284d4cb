use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 posts 表
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::Slug).string_len(200).not_null())
                    .col(ColumnDef::new(Post::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Post::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Post::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Post::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // slug 唯一索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_slug")
                    .table(Post::Table)
                    .col(Post::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 发布状态 + 创建时间（预热查询使用）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_published_created")
                    .table(Post::Table)
                    .col(Post::IsPublished)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_posts_published_created").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_posts_slug").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Post {
    #[sea_orm(iden = "posts")]
    Table,
    Id,
    Slug,
    Title,
    IsPublished,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}
