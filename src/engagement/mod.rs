//! 阅读与分享统计
//!
//! 浏览器脚本上报 → [`EngagementCollector`] 校验 → 存储原子累加 → 失效缓存。

pub mod channels;
pub mod collector;
pub mod filter;
pub mod session;
pub mod submission;

pub use channels::ShareChannel;
pub use collector::EngagementCollector;
pub use filter::{FilterReason, RequestMeta, TrafficFilter, is_likely_bot};
pub use session::ReadingSession;
pub use submission::{Outcome, PostRef, ReadingSubmission, ShareReceipt};
