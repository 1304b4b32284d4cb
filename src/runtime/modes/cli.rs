//! CLI mode
//!
//! This module contains the CLI mode startup logic.
//! It delegates to the actual CLI implementation.

use crate::cli::Commands;
use crate::interfaces::cli::{CliError, run_cli_command};

/// Run CLI mode
///
/// Errors are printed here; the caller only decides the exit code.
pub async fn run_cli(command: Commands) -> Result<(), CliError> {
    let result = run_cli_command(command).await;
    if let Err(ref e) = result {
        eprintln!("{}", e.format_colored());
    }
    result
}
