//! DNT / 爬虫流量过滤
//!
//! 被过滤的请求照常返回 200，只是不累加计数。

use woothee::parser::Parser;

use crate::config::EngagementConfig;

/// 常见爬虫 / 监测工具的 UA 片段（小写匹配）
const BOT_PATTERNS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "curl",
    "wget",
    "googlebot",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "whatsapp",
    "telegrambot",
    "applebot",
    "amazonbot",
    "lighthouse",
    "pagespeed",
    "gtmetrix",
    "pingdom",
];

/// 短于此长度的 UA 视为脚本
const MIN_BROWSER_UA_LEN: usize = 20;

/// 从请求中提取的过滤依据
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub dnt: Option<String>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
}

impl RequestMeta {
    pub fn new(dnt: Option<&str>, user_agent: Option<&str>, accept: Option<&str>) -> Self {
        Self {
            dnt: dnt.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            accept: accept.map(str::to_string),
        }
    }

    pub fn from_request(req: &actix_web::HttpRequest) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            dnt: header("DNT"),
            user_agent: header("User-Agent"),
            accept: header("Accept"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    DoNotTrack,
    Bot,
}

#[derive(Debug, Clone, Copy)]
pub struct TrafficFilter {
    respect_dnt: bool,
    filter_bots: bool,
}

impl TrafficFilter {
    pub fn new(respect_dnt: bool, filter_bots: bool) -> Self {
        Self {
            respect_dnt,
            filter_bots,
        }
    }

    pub fn from_config(config: &EngagementConfig) -> Self {
        Self::new(config.respect_dnt, config.filter_bots)
    }

    /// 返回 `Some(reason)` 表示该请求不计数
    pub fn check(&self, meta: &RequestMeta) -> Option<FilterReason> {
        if self.respect_dnt && meta.dnt.as_deref().map(str::trim) == Some("1") {
            return Some(FilterReason::DoNotTrack);
        }
        if self.filter_bots && looks_automated(meta) {
            return Some(FilterReason::Bot);
        }
        None
    }
}

/// 浏览器总会带 `Accept`（`sendBeacon` / `fetch` 为 `*/*`），缺失即视为脚本
fn looks_automated(meta: &RequestMeta) -> bool {
    let missing_accept = meta.accept.as_deref().is_none_or(|a| a.trim().is_empty());
    missing_accept || is_likely_bot(meta.user_agent.as_deref().unwrap_or(""))
}

pub fn is_likely_bot(user_agent: &str) -> bool {
    let ua = user_agent.trim().to_lowercase();
    if ua.len() < MIN_BROWSER_UA_LEN {
        return true;
    }
    if BOT_PATTERNS.iter().any(|p| ua.contains(p)) {
        return true;
    }
    Parser::new()
        .parse(user_agent)
        .map(|result| result.category == "crawler")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn test_browser_passes() {
        let filter = TrafficFilter::new(true, true);
        assert_eq!(filter.check(&RequestMeta::new(None, Some(CHROME), Some("*/*"))), None);
        assert_eq!(filter.check(&RequestMeta::new(Some("0"), Some(CHROME), Some("*/*"))), None);
    }

    #[test]
    fn test_dnt_filtered() {
        let filter = TrafficFilter::new(true, true);
        assert_eq!(
            filter.check(&RequestMeta::new(Some("1"), Some(CHROME), Some("*/*"))),
            Some(FilterReason::DoNotTrack)
        );
        let lenient = TrafficFilter::new(false, true);
        assert_eq!(lenient.check(&RequestMeta::new(Some("1"), Some(CHROME), Some("*/*"))), None);
    }

    #[test]
    fn test_bots_filtered() {
        assert!(is_likely_bot(""));
        assert!(is_likely_bot("curl/8.4.0"));
        assert!(is_likely_bot(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
        ));
        assert!(is_likely_bot(
            "Mozilla/5.0 (Linux; Android 11) Chrome-Lighthouse PageSpeed Insights"
        ));
        assert!(!is_likely_bot(CHROME));

        let filter = TrafficFilter::new(true, true);
        assert_eq!(
            filter.check(&RequestMeta::default()),
            Some(FilterReason::Bot)
        );
        let lenient = TrafficFilter::new(true, false);
        assert_eq!(lenient.check(&RequestMeta::default()), None);
    }

    #[test]
    fn test_missing_accept_filtered() {
        let filter = TrafficFilter::new(true, true);
        assert_eq!(
            filter.check(&RequestMeta::new(None, Some(CHROME), None)),
            Some(FilterReason::Bot)
        );
        assert_eq!(
            filter.check(&RequestMeta::new(None, Some(CHROME), Some("  "))),
            Some(FilterReason::Bot)
        );
        assert_eq!(
            filter.check(&RequestMeta::new(None, Some(CHROME), Some("application/json"))),
            None
        );
    }
}
