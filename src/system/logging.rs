//! Logging system initialization
//!
//! 根据 `[logging]` 配置初始化 tracing：输出到控制台、单文件或按天轮转的文件，
//! 格式为 text 或 json。

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;

const DEFAULT_LOG_FILE: &str = "postpulse.log";

fn build_writer(config: &LoggingConfig) -> Result<Box<dyn std::io::Write + Send + Sync>> {
    let Some(log_file) = config.file.as_deref().filter(|f| !f.is_empty()) else {
        return Ok(Box::new(std::io::stdout()));
    };

    if config.enable_rotation {
        let path = Path::new(log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);
        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups.max(1) as usize)
            .build(dir)
            .with_context(|| format!("Failed to create rolling log appender in {:?}", dir))?;
        Ok(Box::new(appender))
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file))?;
        Ok(Box::new(file))
    }
}

/// 初始化日志
///
/// 返回的 `WorkerGuard` 必须在程序运行期间保持存活，否则缓冲的日志会丢失。
/// 重复初始化（例如测试中）会返回错误而不是 panic。
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let writer = build_writer(config)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    // RUST_LOG 优先于配置文件
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let to_console = config.file.as_ref().is_none_or(|f| f.is_empty());
    let builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(to_console);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.log");
        let config = LoggingConfig {
            file: Some(path.to_string_lossy().to_string()),
            enable_rotation: false,
            ..Default::default()
        };
        assert!(build_writer(&config).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_console_writer_when_unset() {
        let config = LoggingConfig {
            file: Some(String::new()),
            ..Default::default()
        };
        assert!(build_writer(&config).is_ok());
    }
}
