//! 阅读会话状态机
//!
//! 与 `assets/reading-analytics.js` 的逻辑一一对应：
//! 滚动深度只增不减；停留时间达到最小值后每 60 秒上报一次；
//! 页面隐藏或卸载时无条件发送一次 beacon。

use super::submission::ReadingSubmission;

/// 周期上报间隔（秒）
pub const FLUSH_INTERVAL_SECS: u32 = 60;

#[derive(Debug, Clone)]
pub struct ReadingSession {
    post_slug: String,
    min_dwell_seconds: u32,
    completion_threshold: u8,
    dwell_seconds: u32,
    max_scroll_percent: u32,
    last_flush_at: Option<u32>,
}

impl ReadingSession {
    pub fn new(post_slug: impl Into<String>, min_dwell_seconds: u32, completion_threshold: u8) -> Self {
        Self {
            post_slug: post_slug.into(),
            min_dwell_seconds,
            completion_threshold,
            dwell_seconds: 0,
            max_scroll_percent: 0,
            last_flush_at: None,
        }
    }

    /// 记录一次滚动位置；超出 0..=100 的值会被截断
    pub fn observe_scroll(&mut self, percent: f64) {
        let clamped = percent.clamp(0.0, 100.0).round() as u32;
        self.max_scroll_percent = self.max_scroll_percent.max(clamped);
    }

    pub fn tick(&mut self, seconds: u32) {
        self.dwell_seconds = self.dwell_seconds.saturating_add(seconds);
    }

    pub fn dwell_seconds(&self) -> u32 {
        self.dwell_seconds
    }

    pub fn max_scroll_percent(&self) -> u32 {
        self.max_scroll_percent
    }

    pub fn should_flush_periodic(&self) -> bool {
        if self.dwell_seconds < self.min_dwell_seconds {
            return false;
        }
        match self.last_flush_at {
            None => self.dwell_seconds >= FLUSH_INTERVAL_SECS,
            Some(at) => self.dwell_seconds.saturating_sub(at) >= FLUSH_INTERVAL_SECS,
        }
    }

    /// 周期上报：满足条件时返回要发送的载荷并记录发送时刻
    pub fn flush_periodic(&mut self) -> Option<ReadingSubmission> {
        if !self.should_flush_periodic() {
            return None;
        }
        self.last_flush_at = Some(self.dwell_seconds);
        Some(self.to_submission())
    }

    /// visibilitychange(hidden) / pagehide
    pub fn on_hide(&mut self) -> ReadingSubmission {
        self.last_flush_at = Some(self.dwell_seconds);
        self.to_submission()
    }

    pub fn to_submission(&self) -> ReadingSubmission {
        ReadingSubmission {
            post_slug: self.post_slug.clone(),
            reading_time_seconds: self.dwell_seconds,
            max_scroll_percent: self.max_scroll_percent,
            completed_reading: self.max_scroll_percent > u32::from(self.completion_threshold),
        }
    }
}
