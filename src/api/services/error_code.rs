//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::PostPulseError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 阅读 / 分享统计
/// - 4000-4099: 缓存
/// - 5000-5099: 站点设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 统计 3000-3099
    PostNotFound = 3000,

    // 缓存 4000-4099
    CacheUnavailable = 4000,
    CacheWarmFailed = 4001,

    // 站点设置 5000-5099
    SiteSettingsInvalid = 5000,
}

impl From<&PostPulseError> for ErrorCode {
    fn from(err: &PostPulseError) -> Self {
        match err {
            PostPulseError::Validation(_) => ErrorCode::BadRequest,
            PostPulseError::NotFound(_) => ErrorCode::PostNotFound,
            PostPulseError::Unauthorized(_) => ErrorCode::Unauthorized,
            PostPulseError::DatabaseConnection(_) | PostPulseError::DatabaseOperation(_) => {
                ErrorCode::ServiceUnavailable
            }
            PostPulseError::CacheConnection(_) | PostPulseError::CachePluginNotFound(_) => {
                ErrorCode::CacheUnavailable
            }
            PostPulseError::SiteSettings(_) => ErrorCode::SiteSettingsInvalid,
            PostPulseError::DatabaseConfig(_)
            | PostPulseError::FileOperation(_)
            | PostPulseError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
