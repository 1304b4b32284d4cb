mod r#impl;
mod site_settings;
mod structs;

pub use r#impl::{get_config, init_config, init_config_from, update_config};
pub use site_settings::{
    SiteSettings, SiteSettingsCell, get_site_settings, init_site_settings, reload_site_settings,
};
pub use structs::*;
