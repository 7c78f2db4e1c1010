//! keeper-notify — operator notifications.
//!
//! Delivery is best-effort: a [`Notifier`] never returns an error, it
//! logs delivery failures and moves on. When Telegram is not configured
//! the [`NoopNotifier`] is used.

pub mod message;
pub mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use keeper_core::TelegramConfig;
use tracing::debug;

pub use message::MessageClock;
pub use telegram::TelegramNotifier;

/// Sink for operator-facing messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`. Failures are logged, never raised.
    async fn notify(&self, message: &str);
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _message: &str) {
        debug!("notifications not configured, message dropped");
    }
}

/// Pick the notifier for the configured destination.
pub fn from_config(http: reqwest::Client, telegram: Option<&TelegramConfig>) -> Arc<dyn Notifier> {
    match telegram.and_then(|t| t.destination()) {
        Some((bot_token, chat_id)) => Arc::new(TelegramNotifier::new(http, bot_token, chat_id)),
        None => Arc::new(NoopNotifier),
    }
}
