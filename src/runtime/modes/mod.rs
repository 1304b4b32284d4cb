//! Mode routing
//!
//! 没有子命令或 `serve` 时运行 HTTP 服务器，其余子命令走 CLI。

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    Server,
    Cli,
}

/// Decide which mode a parsed command runs in
pub fn detect_mode(command: Option<&Commands>) -> Mode {
    match command {
        None | Some(Commands::Serve) => Mode::Server,
        Some(_) => Mode::Cli,
    }
}
