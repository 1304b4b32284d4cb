//! 管理端点：缓存清理 / 预热 / 统计，站点设置重载
//!
//! 全部挂在 `admin_prefix` 下，由 [`crate::api::middleware::AdminAuth`] 保护。

use std::sync::Arc;

use actix_web::{HttpResponse, http::StatusCode, web};
use tracing::{info, warn};

use crate::cache::{CacheService, ClearScope};
use crate::config::SiteSettingsCell;
use crate::engagement::submission::validate_slug;
use crate::errors::{PostPulseError, Result};

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_response, success_response};
use super::types::{
    CacheClearRequest, CacheClearResponse, CacheStatsQuery, CacheWarmRequest, ClearScopeParam,
};

pub struct AdminService;

impl AdminService {
    fn resolve_scope(request: &CacheClearRequest) -> Result<ClearScope> {
        let slug = request
            .post_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (request.scope.clone(), slug) {
            (None, Some(slug)) | (Some(ClearScopeParam::Post), Some(slug)) => {
                validate_slug(slug)?;
                Ok(ClearScope::Post(slug.to_string()))
            }
            (Some(ClearScopeParam::Post), None) => Err(PostPulseError::validation(
                "post_slug is required when scope is 'post'",
            )),
            (None, None) | (Some(ClearScopeParam::All), _) => Ok(ClearScope::All),
            (Some(ClearScopeParam::Metrics), _) => Ok(ClearScope::Metrics),
            (Some(ClearScopeParam::Details), _) => Ok(ClearScope::Details),
        }
    }

    /// `POST {admin}/cache/clear`
    pub async fn clear_cache(
        cache: web::Data<Arc<CacheService>>,
        body: Option<web::Json<CacheClearRequest>>,
    ) -> HttpResponse {
        let request = body.map(|b| b.into_inner()).unwrap_or_default();
        let scope = match Self::resolve_scope(&request) {
            Ok(scope) => scope,
            Err(e) => return api_result::<(), _>(Err(e)),
        };

        cache.clear(&scope).await;
        info!("Admin API: cache cleared ({:?})", scope);
        success_response(CacheClearResponse {
            scope: format!("{:?}", scope),
        })
    }

    /// `POST {admin}/cache/warm`
    pub async fn warm_cache(
        cache: web::Data<Arc<CacheService>>,
        body: Option<web::Json<CacheWarmRequest>>,
    ) -> HttpResponse {
        let request = body.map(|b| b.into_inner()).unwrap_or_default();
        match cache.warm_all(request.clear_first).await {
            Ok(report) if report.failed.is_empty() => success_response(report),
            Ok(report) => {
                warn!("Admin API: {} cache keys failed to warm", report.failed.len());
                super::helpers::json_response(
                    StatusCode::OK,
                    ErrorCode::CacheWarmFailed,
                    "Some cache keys failed to warm",
                    Some(report),
                )
            }
            Err(e) => api_result::<(), _>(Err(e)),
        }
    }

    /// `GET {admin}/cache/stats`
    pub async fn cache_stats(
        cache: web::Data<Arc<CacheService>>,
        query: web::Query<CacheStatsQuery>,
    ) -> HttpResponse {
        api_result(cache.report(query.detailed, query.test_performance).await)
    }

    /// `GET {admin}/settings`
    pub async fn get_settings(settings: web::Data<Arc<SiteSettingsCell>>) -> HttpResponse {
        success_response(settings.current().as_ref().clone())
    }

    /// `POST {admin}/settings/reload`
    pub async fn reload_settings(
        settings: web::Data<Arc<SiteSettingsCell>>,
        cache: web::Data<Arc<CacheService>>,
    ) -> HttpResponse {
        match settings.reload(cache.storage()).await {
            Ok(()) => {
                info!("Admin API: site settings reloaded");
                success_response(settings.current().as_ref().clone())
            }
            Err(e) => api_result::<(), _>(Err(e)),
        }
    }
}

/// 未配置 admin token 时整个前缀返回 404
pub fn admin_disabled_response() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not Found")
}

pub fn admin_routes() -> actix_web::Scope {
    web::scope("")
        .route("/cache/clear", web::post().to(AdminService::clear_cache))
        .route("/cache/warm", web::post().to(AdminService::warm_cache))
        .route("/cache/stats", web::get().to(AdminService::cache_stats))
        .route("/settings", web::get().to(AdminService::get_settings))
        .route(
            "/settings/reload",
            web::post().to(AdminService::reload_settings),
        )
}
