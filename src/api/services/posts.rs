//! 文章指标 / 详情读取（经过缓存）

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::{debug, trace};

use crate::cache::CacheService;
use crate::config::{SiteSettingsCell, get_site_settings};
use crate::engagement::submission::validate_slug;
use crate::errors::PostPulseError;

use super::helpers::{api_result, error_from_postpulse, not_found, success_response};
use super::types::{PostDetailResponse, SiteFlags};

pub struct PostService;

impl PostService {
    /// `GET /blog/api/metrics/{slug}`
    pub async fn get_metrics(
        path: web::Path<String>,
        cache: web::Data<Arc<CacheService>>,
    ) -> HttpResponse {
        let slug = path.into_inner();
        trace!("metrics requested for {}", slug);
        if let Err(e) = validate_slug(&slug) {
            return error_from_postpulse(&e);
        }

        api_result(cache.get_metrics(&slug).await.and_then(|snapshot| {
            snapshot.ok_or_else(|| PostPulseError::not_found(format!("Post '{}' not found", slug)))
        }))
    }

    /// `GET /{lang}/blog/api/posts/{slug}`
    pub async fn get_post_detail(
        path: web::Path<(String, String)>,
        cache: web::Data<Arc<CacheService>>,
        settings: Option<web::Data<Arc<SiteSettingsCell>>>,
    ) -> HttpResponse {
        let (lang, slug) = path.into_inner();
        // 与按语言前缀路由一致：未配置的语言视为不存在的路径
        if !cache.supports_language(&lang) {
            debug!("Unsupported language prefix '{}'", lang);
            return not_found().await;
        }
        if let Err(e) = validate_slug(&slug) {
            return error_from_postpulse(&e);
        }

        let detail = match cache.get_post_detail(&slug, &lang).await {
            Ok(Some(detail)) => detail,
            Ok(None) => {
                return error_from_postpulse(&PostPulseError::not_found(format!(
                    "Post '{}' not found",
                    slug
                )));
            }
            Err(e) => return error_from_postpulse(&e),
        };

        // 开关每次请求实时读取
        let current = settings
            .map(|cell| cell.current())
            .or_else(|| get_site_settings().map(|cell| cell.current()))
            .unwrap_or_default();

        success_response(PostDetailResponse {
            detail,
            site: SiteFlags {
                site_name: current.site_name.clone(),
                coming_soon_mode: current.coming_soon_mode,
            },
        })
    }
}

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/blog/api/metrics/{slug}",
        web::get().to(PostService::get_metrics),
    )
    .route(
        "/{lang}/blog/api/posts/{slug}",
        web::get().to(PostService::get_post_detail),
    );
}
