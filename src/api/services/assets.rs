use actix_web::{HttpResponse, web};
use rust_embed::Embed;
use tracing::{error, trace};

// 浏览器端上报脚本，编译时嵌入
#[derive(Embed)]
#[folder = "assets/"]
struct BeaconAssets;

pub const READING_SCRIPT: &str = "reading-analytics.js";

pub struct AssetService;

impl AssetService {
    /// 渲染脚本：替换阈值占位符，与服务端配置保持一致
    pub fn render_reading_script() -> Option<String> {
        let asset = BeaconAssets::get(READING_SCRIPT)?;
        let config = crate::config::get_config();
        let script = String::from_utf8_lossy(&asset.data)
            .replace(
                "%MIN_DWELL_SECONDS%",
                &config.engagement.min_dwell_seconds.to_string(),
            )
            .replace(
                "%COMPLETION_THRESHOLD%",
                &config.engagement.completion_threshold.to_string(),
            );
        Some(script)
    }

    pub async fn reading_script() -> HttpResponse {
        trace!("Serving {}", READING_SCRIPT);
        match Self::render_reading_script() {
            Some(script) => HttpResponse::Ok()
                .content_type("application/javascript; charset=utf-8")
                .append_header(("Cache-Control", "public, max-age=3600"))
                .body(script),
            None => {
                error!("Embedded asset {} is missing", READING_SCRIPT);
                HttpResponse::NotFound().finish()
            }
        }
    }
}

pub fn asset_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/static/blog/js/reading-analytics.js",
        web::get().to(AssetService::reading_script),
    );
}
