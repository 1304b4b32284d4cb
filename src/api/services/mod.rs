pub mod admin;
pub mod assets;
pub mod engagement;
pub mod error_code;
pub mod health;
mod helpers;
pub mod posts;
pub mod types;

use actix_web::web;

pub use admin::{AdminService, admin_routes};
pub use assets::{AssetService, asset_routes};
pub use engagement::{EngagementService, engagement_routes};
pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{
    api_result, error_from_postpulse, error_response, json_config, json_response, not_found,
    success_response,
};
pub use posts::{PostService, post_routes};
pub use types::*;

use crate::api::middleware::AdminAuth;
use crate::config::ApiConfig;

/// 注册全部路由；服务器和集成测试共用
///
/// 调用方负责通过 `app_data` 注入存储、缓存、统计收集器和站点设置。
pub fn configure_routes(cfg: &mut web::ServiceConfig, api: &ApiConfig) {
    cfg.service(
        web::scope(&api.admin_prefix)
            .wrap(AdminAuth::new(api.admin_token.clone()))
            .service(admin_routes()),
    )
    .service(web::scope(&api.health_prefix).service(health_routes()))
    .configure(asset_routes)
    .configure(engagement_routes)
    .configure(post_routes);
}
