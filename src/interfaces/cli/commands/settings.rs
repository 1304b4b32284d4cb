//! settings show / set

use colored::Colorize;

use crate::config::{SiteSettings, SiteSettingsCell};
use crate::interfaces::cli::CliError;
use crate::storage::{SeaOrmStorage, SiteSettingsPatch};

fn print_settings(settings: &SiteSettings) {
    let flag = |on: bool| if on { "on".green() } else { "off".red() };
    println!("{}", "Site settings:".bold().green());
    println!("  site name:      {}", settings.site_name.cyan());
    println!("  tracking:       {}", flag(settings.tracking_enabled));
    println!("  coming soon:    {}", flag(settings.coming_soon_mode));
    println!(
        "  {}",
        format!(
            "updated {}",
            settings.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .dimmed()
    );
}

pub async fn settings_show(storage: &SeaOrmStorage) -> Result<(), CliError> {
    // 与服务启动相同的加载路径：多行时报错
    let cell = SiteSettingsCell::load(storage).await?;
    print_settings(&cell.current());
    Ok(())
}

pub async fn settings_set(
    storage: &SeaOrmStorage,
    tracking_enabled: Option<bool>,
    coming_soon: Option<bool>,
    site_name: Option<String>,
) -> Result<(), CliError> {
    let patch = SiteSettingsPatch {
        site_name: site_name.map(|s| s.trim().to_string()),
        tracking_enabled,
        coming_soon_mode: coming_soon,
    };
    if patch.is_empty() {
        return Err(CliError::ParseError(
            "Nothing to update: pass --tracking-enabled, --coming-soon or --site-name".to_string(),
        ));
    }
    if patch.site_name.as_deref() == Some("") {
        return Err(CliError::ParseError("Site name cannot be empty".to_string()));
    }

    let updated = storage.update_site_settings(&patch).await?;
    println!("{} Site settings updated", "✓".bold().green());
    print_settings(&updated);
    println!(
        "{} {}",
        "ℹ".bold().blue(),
        "A running server picks this up after POST {admin}/settings/reload or a restart.".dimmed()
    );
    Ok(())
}
