//! CLI interface module

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cache::{CacheService, CacheServiceOptions};
use crate::cli::{CacheCommands, Commands, ConfigCommands, PostCommands, SettingsCommands};
use crate::runtime::lifetime::startup::create_cache_backend;
use crate::storage::{SeaOrmStorage, StorageFactory};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::PostPulseError> for CliError {
    fn from(err: crate::errors::PostPulseError) -> Self {
        match err {
            crate::errors::PostPulseError::Validation(msg) => CliError::ParseError(msg),
            crate::errors::PostPulseError::NotFound(msg) => CliError::CommandError(msg),
            other => CliError::StorageError(other.to_string()),
        }
    }
}

async fn open_storage() -> Result<Arc<SeaOrmStorage>, CliError> {
    StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))
}

async fn open_cache(storage: Arc<SeaOrmStorage>) -> Arc<CacheService> {
    let config = crate::config::get_config();
    let backend = create_cache_backend(&config.cache.cache_type).await;
    Arc::new(CacheService::new(
        backend,
        storage,
        CacheServiceOptions::from_config(&config.cache),
    ))
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` 由 main 处理，不会到达这里。
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // config generate 不需要数据库
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return commands::config_generate(output_path, force).await;
    }

    let storage = open_storage().await?;

    match cmd {
        Commands::Cache { action } => {
            let cache = open_cache(storage).await;
            match action {
                CacheCommands::Clear { target } => commands::cache_clear(&cache, target).await,
                CacheCommands::Warm { clear_first, stats } => {
                    commands::cache_warm(&cache, clear_first, stats).await
                }
                CacheCommands::Stats {
                    detailed,
                    test_performance,
                } => commands::cache_stats(&cache, detailed, test_performance).await,
            }
        }

        Commands::Post { action } => match action {
            PostCommands::Add {
                slug,
                title,
                published,
                featured,
            } => commands::post_add(&storage, slug, title, published, featured).await,
            PostCommands::List => commands::post_list(&storage).await,
        },

        Commands::Metrics { slug } => commands::show_metrics(&storage, &slug).await,

        Commands::Settings { action } => match action {
            SettingsCommands::Show => commands::settings_show(&storage).await,
            SettingsCommands::Set {
                tracking_enabled,
                coming_soon,
                site_name,
            } => {
                commands::settings_set(&storage, tracking_enabled, coming_soon, site_name).await
            }
        },

        Commands::Config { .. } => unreachable!("handled above"),
        Commands::Serve => unreachable!("serve is handled in main"),
    }
}
