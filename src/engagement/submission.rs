use serde::{Deserialize, Serialize};

use crate::errors::{PostPulseError, Result};

/// slug 最大长度，与 posts.slug 列宽一致
pub const MAX_SLUG_LEN: usize = 200;

/// 浏览器上报的一次阅读会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingSubmission {
    pub post_slug: String,
    pub reading_time_seconds: u32,
    pub max_scroll_percent: u32,
    /// 客户端自己判断的完读标记，只用于日志比对
    #[serde(default)]
    pub completed_reading: bool,
}

impl ReadingSubmission {
    pub fn validate(&self) -> Result<()> {
        validate_slug(&self.post_slug)?;
        if self.max_scroll_percent > 100 {
            return Err(PostPulseError::validation(format!(
                "max_scroll_percent must be within 0..=100, got {}",
                self.max_scroll_percent
            )));
        }
        Ok(())
    }
}

/// slug 只允许 ASCII 字母数字、`-` 和 `_`
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(PostPulseError::validation("post_slug cannot be empty"));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(PostPulseError::validation(format!(
            "post_slug exceeds {} characters",
            MAX_SLUG_LEN
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(PostPulseError::validation(format!(
            "post_slug contains invalid characters: {}",
            slug
        )));
    }
    Ok(())
}

/// 上报的处理结果
///
/// 被忽略的上报同样返回 200，客户端无需区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Recorded,
    IgnoredBelowDwell,
    IgnoredTrackingDisabled,
    IgnoredFiltered,
}

impl Outcome {
    pub fn is_recorded(self) -> bool {
        matches!(self, Outcome::Recorded)
    }
}

/// 分享上报的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShareReceipt {
    pub outcome: Outcome,
    pub count: i64,
    pub total: i64,
}

/// `track-share` 里的 `post_id`：数字 id 或 slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    Id(i64),
    Slug(String),
}

impl PostRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Ok(id) = raw.parse::<i64>() {
            return Ok(PostRef::Id(id));
        }
        validate_slug(raw)?;
        Ok(PostRef::Slug(raw.to_string()))
    }

    /// 接受 JSON 数字或字符串
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(PostRef::Id)
                .ok_or_else(|| PostPulseError::validation(format!("Invalid post_id: {}", n))),
            serde_json::Value::String(s) => Self::parse(s),
            other => Err(PostPulseError::validation(format!(
                "post_id must be a number or a slug, got {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PostRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostRef::Id(id) => write!(f, "#{}", id),
            PostRef::Slug(slug) => f.write_str(slug),
        }
    }
}
