pub mod post;
pub mod post_metrics;
pub mod post_share;
pub mod site_settings;

pub use post::Entity as PostEntity;
pub use post_metrics::Entity as PostMetricsEntity;
pub use post_share::Entity as PostShareEntity;
pub use site_settings::Entity as SiteSettingsEntity;
