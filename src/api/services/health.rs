use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use crate::cache::CacheService;
use crate::storage::SeaOrmStorage;

use super::error_code::ErrorCode;
use super::helpers::json_response;
use super::types::{HealthChecks, HealthResponse, HealthStorageCheck};

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl Default for AppStartTime {
    fn default() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

/// Health Service
///
/// 只有存储不可用时判为 unhealthy；缓存故障会降级到存储，只在结果中报告。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        cache: web::Data<Arc<CacheService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = storage.backend_name().to_string();
        let storage_status =
            match tokio::time::timeout(Duration::from_secs(5), storage.count_posts()).await {
                Ok(Ok(count)) => HealthStorageCheck {
                    status: "healthy".to_string(),
                    backend,
                    posts_count: Some(count),
                    error: None,
                },
                Ok(Err(e)) => {
                    error!("Storage health check failed: {}", e);
                    HealthStorageCheck {
                        status: "unhealthy".to_string(),
                        backend,
                        posts_count: None,
                        error: Some(format!("database error: {}", e)),
                    }
                }
                Err(_) => {
                    error!("Storage health check timeout");
                    HealthStorageCheck {
                        status: "unhealthy".to_string(),
                        backend,
                        posts_count: None,
                        error: Some("timeout".to_string()),
                    }
                }
            };

        let cache_status = cache.backend().health_check().await;

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let is_healthy = storage_status.status == "healthy";

        let data = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
            checks: HealthChecks {
                storage: storage_status,
                cache: cache_status,
            },
            response_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}s",
            start_time.elapsed(),
            data.status,
            uptime
        );

        if is_healthy {
            json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
        } else {
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Service Unavailable",
                Some(data),
            )
        }
    }

    // 简单的就绪检查，只返回 200 状态码
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");
        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置（挂在 `health_prefix` 之下）
pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
