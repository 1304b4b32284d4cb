//! Command-line interface definitions using clap

use clap::{Args, Parser, Subcommand};

/// PostPulse - reading analytics and cache service for a blog
#[derive(Parser)]
#[command(name = "postpulse")]
#[command(version)]
#[command(about = "Reading analytics, share tracking and cache maintenance for a blog", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },

    /// Manage posts known to the service
    Post {
        #[command(subcommand)]
        action: PostCommands,
    },

    /// Show engagement metrics of a post
    Metrics {
        /// Post slug
        slug: String,
    },

    /// Site settings (single row)
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct ClearTarget {
    /// Clear everything (default)
    #[arg(long)]
    pub all: bool,

    /// Clear one post (metrics + every language variant)
    #[arg(long, value_name = "SLUG")]
    pub post_slug: Option<String>,

    /// Clear all metrics snapshots
    #[arg(long)]
    pub metrics: bool,

    /// Clear all post detail entries
    #[arg(long)]
    pub details: bool,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove cache entries
    Clear {
        #[command(flatten)]
        target: ClearTarget,
    },

    /// Recompute cache entries for every published post
    Warm {
        /// Clear the cache before warming
        #[arg(long)]
        clear_first: bool,

        /// Print cache statistics afterwards
        #[arg(long)]
        stats: bool,
    },

    /// Show cache statistics and key coverage
    Stats {
        /// List the status of every known cache key
        #[arg(long)]
        detailed: bool,

        /// Run a write/read/delete round trip and compute a health score
        #[arg(long)]
        test_performance: bool,
    },
}

#[derive(Subcommand)]
pub enum PostCommands {
    /// Register a post
    Add {
        slug: String,
        title: String,

        #[arg(long)]
        published: bool,

        #[arg(long)]
        featured: bool,
    },

    /// List posts
    List,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print current site settings
    Show,

    /// Update site settings
    Set {
        #[arg(long, value_name = "BOOL")]
        tracking_enabled: Option<bool>,

        #[arg(long, value_name = "BOOL")]
        coming_soon: Option<bool>,

        #[arg(long)]
        site_name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a sample configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite without asking
        #[arg(long)]
        force: bool,
    },
}
