pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261001_000001_posts;
mod m20261001_000002_engagement_counters;
mod m20261001_000003_site_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_posts::Migration),
            Box::new(m20261001_000002_engagement_counters::Migration),
            Box::new(m20261001_000003_site_settings::Migration),
        ]
    }
}
