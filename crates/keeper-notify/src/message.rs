//! Operator message templates (Telegram Markdown).

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Renders timestamps in the operator's configured UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct MessageClock {
    offset: FixedOffset,
}

impl MessageClock {
    /// Offsets outside chrono's range fall back to UTC.
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    /// `YYYY-MM-DD HH:MM` in the configured offset.
    pub fn format(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn now(&self) -> String {
        self.format(Utc::now())
    }
}

pub fn offline(app: &str, url: &str, reason: &str, at: &str) -> String {
    format!(
        "⚠️ *App offline*\n\nApp: {app}\nURL: {url}\nTrigger: {reason}\nTime: {at}\n\nAttempting restart..."
    )
}

pub fn restarted(app: &str, url: &str, at: &str) -> String {
    format!("✅ *App restarted*\n\nApp: {app}\nURL: {url}\nTime: {at}")
}

pub fn start_timeout(app: &str, url: &str, at: &str, error: &str) -> String {
    format!(
        "❌ *Restart failed (start timed out)*\n\nApp: {app}\nURL: {url}\nTime: {at}\n\nError: {error}"
    )
}

pub fn still_unhealthy(app: &str, url: &str, at: &str) -> String {
    format!("❌ *Restart failed (URL still unreachable)*\n\nApp: {app}\nURL: {url}\nTime: {at}")
}
