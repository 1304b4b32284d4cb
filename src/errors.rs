use std::fmt;

#[derive(Debug, Clone)]
pub enum PostPulseError {
    CacheConnection(String),
    CachePluginNotFound(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    SiteSettings(String),
    Unauthorized(String),
}

impl PostPulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PostPulseError::CacheConnection(_) => "E001",
            PostPulseError::CachePluginNotFound(_) => "E002",
            PostPulseError::DatabaseConfig(_) => "E003",
            PostPulseError::DatabaseConnection(_) => "E004",
            PostPulseError::DatabaseOperation(_) => "E005",
            PostPulseError::FileOperation(_) => "E006",
            PostPulseError::Validation(_) => "E007",
            PostPulseError::NotFound(_) => "E008",
            PostPulseError::Serialization(_) => "E009",
            PostPulseError::SiteSettings(_) => "E010",
            PostPulseError::Unauthorized(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PostPulseError::CacheConnection(_) => "Cache Connection Error",
            PostPulseError::CachePluginNotFound(_) => "Cache Plugin Not Found",
            PostPulseError::DatabaseConfig(_) => "Database Configuration Error",
            PostPulseError::DatabaseConnection(_) => "Database Connection Error",
            PostPulseError::DatabaseOperation(_) => "Database Operation Error",
            PostPulseError::FileOperation(_) => "File Operation Error",
            PostPulseError::Validation(_) => "Validation Error",
            PostPulseError::NotFound(_) => "Resource Not Found",
            PostPulseError::Serialization(_) => "Serialization Error",
            PostPulseError::SiteSettings(_) => "Site Settings Error",
            PostPulseError::Unauthorized(_) => "Unauthorized",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PostPulseError::CacheConnection(msg)
            | PostPulseError::CachePluginNotFound(msg)
            | PostPulseError::DatabaseConfig(msg)
            | PostPulseError::DatabaseConnection(msg)
            | PostPulseError::DatabaseOperation(msg)
            | PostPulseError::FileOperation(msg)
            | PostPulseError::Validation(msg)
            | PostPulseError::NotFound(msg)
            | PostPulseError::Serialization(msg)
            | PostPulseError::SiteSettings(msg)
            | PostPulseError::Unauthorized(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    ///
    /// 存储层错误统一返回 503，调用方可以稍后重试。
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            PostPulseError::Validation(_) => StatusCode::BAD_REQUEST,
            PostPulseError::NotFound(_) => StatusCode::NOT_FOUND,
            PostPulseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PostPulseError::DatabaseConnection(_) | PostPulseError::DatabaseOperation(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PostPulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PostPulseError {}

// 便捷的构造函数
impl PostPulseError {
    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        PostPulseError::CacheConnection(msg.into())
    }

    pub fn cache_plugin_not_found<T: Into<String>>(msg: T) -> Self {
        PostPulseError::CachePluginNotFound(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        PostPulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        PostPulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        PostPulseError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        PostPulseError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PostPulseError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PostPulseError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PostPulseError::Serialization(msg.into())
    }

    pub fn site_settings<T: Into<String>>(msg: T) -> Self {
        PostPulseError::SiteSettings(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        PostPulseError::Unauthorized(msg.into())
    }
}

impl From<sea_orm::DbErr> for PostPulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        PostPulseError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for PostPulseError {
    fn from(err: std::io::Error) -> Self {
        PostPulseError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PostPulseError {
    fn from(err: serde_json::Error) -> Self {
        PostPulseError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for PostPulseError {
    fn from(err: redis::RedisError) -> Self {
        PostPulseError::CacheConnection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PostPulseError>;
