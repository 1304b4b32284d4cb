mod cache;
mod config_gen;
mod posts;
mod settings;

pub use cache::{cache_clear, cache_stats, cache_warm, clear_scope_from_target};
pub use config_gen::config_generate;
pub use posts::{post_add, post_list, show_metrics};
pub use settings::{settings_set, settings_show};
