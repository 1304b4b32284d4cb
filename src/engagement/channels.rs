use std::str::FromStr;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::errors::{PostPulseError, Result};

/// 允许的分享渠道
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ShareChannel {
    Twitter,
    Facebook,
    Linkedin,
    Reddit,
    Hackernews,
    Email,
    Whatsapp,
    Telegram,
    Copy,
}

impl ShareChannel {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        ShareChannel::from_str(&normalized).map_err(|_| {
            PostPulseError::validation(format!("Unsupported share platform: '{}'", raw))
        })
    }

    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_all_channels_roundtrip() {
        let names: Vec<String> = ShareChannel::iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "twitter",
                "facebook",
                "linkedin",
                "reddit",
                "hackernews",
                "email",
                "whatsapp",
                "telegram",
                "copy"
            ]
        );
        for channel in ShareChannel::iter() {
            assert_eq!(ShareChannel::parse(channel.as_str()).unwrap(), channel);
        }
    }

    #[test]
    fn test_as_str_outlives_value() {
        let name: &'static str = {
            let channel = ShareChannel::parse("HackerNews").unwrap();
            channel.as_str()
        };
        assert_eq!(name, "hackernews");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ShareChannel::parse("Twitter").unwrap(), ShareChannel::Twitter);
        assert_eq!(ShareChannel::parse(" LINKEDIN ").unwrap(), ShareChannel::Linkedin);
    }

    #[test]
    fn test_unknown_channel_rejected() {
        assert!(matches!(
            ShareChannel::parse("myspace"),
            Err(PostPulseError::Validation(_))
        ));
        assert!(ShareChannel::parse("").is_err());
    }
}
