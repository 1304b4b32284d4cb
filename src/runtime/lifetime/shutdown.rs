use sea_orm::DatabaseConnection;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// 关闭超时时间（秒）
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待 Ctrl+C，然后在超时内关闭数据库连接池
///
/// 计数器都是同步写入的，没有需要落盘的缓冲区。
pub async fn listen_for_shutdown(db: DatabaseConnection) {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining..."),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }

    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), db.close()).await {
        Ok(Ok(())) => info!("Database connections closed"),
        Ok(Err(e)) => error!("Failed to close database connections: {}", e),
        Err(_) => error!(
            "Shutdown timed out after {} seconds, exiting anyway",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
