//! Server mode
//!
//! 组装组件并启动 HTTP 服务器，Ctrl+C 时优雅退出。

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{AppStartTime, configure_routes, json_config, not_found};
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::default();

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let config = crate::config::get_config();
    let api_config = config.api.clone();
    let payload_limit = config.server.payload_limit;
    let workers = config.server.workers.clamp(1, 32);

    if api_config.admin_token.is_empty() {
        info!("Admin API is disabled (api.admin_token is empty)");
    } else {
        info!("Admin API available at: {}", api_config.admin_prefix);
    }
    info!("Health API available at: {}", api_config.health_prefix);

    let storage = startup.storage.clone();
    let settings = startup.settings.clone();
    let cache = startup.cache.clone();
    let collector = startup.collector.clone();
    let db_for_shutdown = storage.get_db().clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(collector.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(json_config(payload_limit))
            .configure(|cfg| configure_routes(cfg, &api_config))
            .default_service(web::to(not_found))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(workers);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{} ({} workers)", bind_address, workers);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
