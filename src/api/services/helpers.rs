//! API 帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, error::InternalError, web};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::errors::PostPulseError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 PostPulseError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_postpulse(err: &PostPulseError) -> HttpResponse {
    let status = err.http_status();
    match status {
        s if s.is_server_error() => error!("Request failed: {}", err),
        StatusCode::UNAUTHORIZED => warn!("Request rejected: {}", err),
        _ => debug!("Request rejected: {}", err),
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<PostPulseError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_postpulse(&e.into()),
    }
}

/// JSON 解析失败时返回统一的 400 包装
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req: &HttpRequest| {
            debug!("Malformed JSON payload: {}", err);
            let response =
                error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &err.to_string());
            InternalError::from_response(err, response).into()
        })
}

/// 未匹配路由
pub async fn not_found() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response("data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_from_postpulse_status_mapping() {
        assert_eq!(
            error_from_postpulse(&PostPulseError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_from_postpulse(&PostPulseError::not_found("gone")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_from_postpulse(&PostPulseError::database_operation("down")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_api_result() {
        let ok: Result<u32, PostPulseError> = Ok(1);
        assert_eq!(api_result(ok).status(), StatusCode::OK);
        let err: Result<u32, PostPulseError> = Err(PostPulseError::validation("x"));
        assert_eq!(api_result(err).status(), StatusCode::BAD_REQUEST);
    }
}
