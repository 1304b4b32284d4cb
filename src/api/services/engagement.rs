//! 阅读 / 分享上报端点

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::trace;

use crate::engagement::{EngagementCollector, PostRef, ReadingSubmission, RequestMeta};

use super::helpers::{api_result, error_from_postpulse};
use super::types::{TrackReadingResponse, TrackShareRequest};

pub struct EngagementService;

impl EngagementService {
    /// `POST [/{lang}]/blog/api/track-reading/`
    pub async fn track_reading(
        req: HttpRequest,
        collector: web::Data<Arc<EngagementCollector>>,
        body: web::Json<ReadingSubmission>,
    ) -> impl Responder {
        let submission = body.into_inner();
        trace!(
            "track-reading: {} ({}s, {}%)",
            submission.post_slug, submission.reading_time_seconds, submission.max_scroll_percent
        );

        let meta = RequestMeta::from_request(&req);
        api_result(
            collector
                .record_reading(&submission, &meta)
                .await
                .map(|outcome| TrackReadingResponse { outcome }),
        )
    }

    /// `POST /blog/api/track-share/`
    pub async fn track_share(
        req: HttpRequest,
        collector: web::Data<Arc<EngagementCollector>>,
        body: web::Json<TrackShareRequest>,
    ) -> HttpResponse {
        let request = body.into_inner();
        let post_ref = match PostRef::from_json(&request.post_id) {
            Ok(r) => r,
            Err(e) => return error_from_postpulse(&e),
        };
        trace!("track-share: {} via {}", post_ref, request.platform);

        let meta = RequestMeta::from_request(&req);
        api_result(
            collector
                .record_share(&post_ref, &request.platform, &meta)
                .await,
        )
    }
}

pub fn engagement_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/blog/api/track-reading/",
        web::post().to(EngagementService::track_reading),
    )
    .route(
        "/blog/api/track-share/",
        web::post().to(EngagementService::track_share),
    )
    .route(
        "/{lang}/blog/api/track-reading/",
        web::post().to(EngagementService::track_reading),
    );
}
