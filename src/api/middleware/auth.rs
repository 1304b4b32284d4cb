use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header::CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info, trace};

use crate::api::services::admin::admin_disabled_response;
use crate::api::services::error_from_postpulse;
use crate::errors::PostPulseError;

/// Admin 认证中间件
///
/// 只接受 `Authorization: Bearer <api.admin_token>`。token 为空时整个前缀按不存在处理。
#[derive(Clone)]
pub struct AdminAuth {
    token: Arc<str>,
}

impl AdminAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }

    pub fn from_config() -> Self {
        Self::new(crate::config::get_config().api.admin_token.clone())
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddleware {
            service: Rc::new(service),
            token: self.token.clone(),
        }))
    }
}

pub struct AdminAuthMiddleware<S> {
    service: Rc<S>,
    token: Arc<str>,
}

impl<S, B> AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn reject(req: ServiceRequest, response: HttpResponse) -> ServiceResponse<EitherBody<B>> {
        req.into_response(response.map_into_right_body())
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<&str> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
    }

    fn token_matches(expected: &str, provided: &str) -> bool {
        expected.as_bytes().ct_eq(provided.as_bytes()).into()
    }
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let token = self.token.clone();

        Box::pin(async move {
            if token.is_empty() {
                debug!("Admin token not configured - returning 404");
                return Ok(Self::reject(req, admin_disabled_response()));
            }

            if req.method() == Method::OPTIONS {
                return Ok(Self::reject(
                    req,
                    HttpResponse::NoContent()
                        .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                        .finish(),
                ));
            }

            let authorized = Self::extract_bearer_token(&req)
                .is_some_and(|provided| Self::token_matches(&token, provided));

            if !authorized {
                info!("Admin authentication failed - invalid or missing token");
                return Ok(Self::reject(
                    req,
                    error_from_postpulse(&PostPulseError::unauthorized(
                        "Unauthorized: Invalid or missing token",
                    )),
                ));
            }

            trace!("Admin authentication successful");
            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}
