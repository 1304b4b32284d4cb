use serde::{Deserialize, Serialize};

/// 环境变量前缀，分隔符为 `__`，例如 `PP__SERVER__PORT=9999`
pub const ENV_PREFIX: &str = "PP";

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - database: 数据库连接与重试
/// - cache: 缓存后端、TTL 分级、预热
/// - logging: 日志输出
/// - engagement: 阅读统计阈值与过滤开关
/// - api: 管理接口与健康检查路由
///
/// 站点开关（tracking_enabled / coming_soon_mode）存储在数据库中，
/// 参见 [`crate::config::SiteSettingsCell`]。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config 文件 > 默认值
    pub fn load(path: &str) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 与 [`StaticConfig::load`] 相同，但把错误交给调用方
    pub fn try_load(path: &str) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cache.languages")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<StaticConfig>()
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// 请求体上限（字节），beacon 负载很小
    #[serde(default = "default_payload_limit")]
    pub payload_limit: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 缓存系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 后端名称：memory / redis / null
    #[serde(rename = "type")]
    #[serde(default = "default_cache_type")]
    pub cache_type: String,
    /// 未指定 TTL 的条目使用此值（秒）
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    #[serde(default)]
    pub ttl: TtlTierConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    /// 后台预热间隔（秒），0 表示关闭
    #[serde(default)]
    pub warm_interval_secs: u64,
    #[serde(default = "default_warm_concurrency")]
    pub warm_concurrency: usize,
    /// 文章详情缓存的语言变体
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

/// TTL 分级（秒）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TtlTierConfig {
    #[serde(default = "default_ttl_short")]
    pub short: u64,
    #[serde(default = "default_ttl_medium")]
    pub medium: u64,
    #[serde(default = "default_ttl_long")]
    pub long: u64,
    #[serde(default = "default_ttl_very_long")]
    pub very_long: u64,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_capacity")]
    pub max_capacity: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 阅读统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// 低于此停留时长的上报会被接受但忽略
    #[serde(default = "default_min_dwell_seconds")]
    pub min_dwell_seconds: u32,
    /// 滚动深度严格大于此值才算读完
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: u8,
    #[serde(default = "default_true")]
    pub respect_dnt: bool,
    #[serde(default = "default_true")]
    pub filter_bots: bool,
}

/// 管理接口与健康检查配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 为空时禁用管理接口
    #[serde(default)]
    pub admin_token: String,
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    #[serde(default = "default_health_prefix")]
    pub health_prefix: String,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_payload_limit() -> usize {
    16 * 1024
}

fn default_database_url() -> String {
    "sqlite://postpulse.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_cache_type() -> String {
    "memory".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_ttl_short() -> u64 {
    300
}

fn default_ttl_medium() -> u64 {
    900
}

fn default_ttl_long() -> u64 {
    1800
}

fn default_ttl_very_long() -> u64 {
    3600
}

fn default_warm_concurrency() -> usize {
    8
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    "postpulse:".to_string()
}

fn default_memory_capacity() -> u64 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_min_dwell_seconds() -> u32 {
    10
}

fn default_completion_threshold() -> u8 {
    80
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_health_prefix() -> String {
    "/health".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_workers(),
            payload_limit: default_payload_limit(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            default_ttl: default_cache_ttl(),
            ttl: TtlTierConfig::default(),
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
            warm_interval_secs: 0,
            warm_concurrency: default_warm_concurrency(),
            languages: default_languages(),
        }
    }
}

impl Default for TtlTierConfig {
    fn default() -> Self {
        Self {
            short: default_ttl_short(),
            medium: default_ttl_medium(),
            long: default_ttl_long(),
            very_long: default_ttl_very_long(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_memory_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            min_dwell_seconds: default_min_dwell_seconds(),
            completion_threshold: default_completion_threshold(),
            respect_dnt: true,
            filter_bots: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            admin_prefix: default_admin_prefix(),
            health_prefix: default_health_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.engagement.min_dwell_seconds, 10);
        assert_eq!(config.engagement.completion_threshold, 80);
        assert_eq!(config.cache.ttl.short, 300);
        assert_eq!(config.cache.ttl.medium, 900);
        assert_eq!(config.cache.ttl.long, 1800);
        assert_eq!(config.cache.ttl.very_long, 3600);
        assert_eq!(config.cache.cache_type, "memory");
        assert!(config.api.admin_token.is_empty());
    }

    #[test]
    fn test_sample_config_roundtrips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[engagement]"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.cache.languages, vec!["en".to_string()]);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [cache]
            type = "null"

            [engagement]
            min_dwell_seconds = 5
            "#,
        )
        .unwrap();
        assert_eq!(parsed.cache.cache_type, "null");
        assert_eq!(parsed.cache.default_ttl, 300);
        assert_eq!(parsed.engagement.min_dwell_seconds, 5);
        assert!(parsed.engagement.respect_dnt);
    }

    #[test]
    fn test_try_load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nport = 9191\n").unwrap();

        let config = StaticConfig::try_load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9191);
    }
}
