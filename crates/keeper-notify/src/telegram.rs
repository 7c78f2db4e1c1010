//! Telegram Bot API delivery.

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::Notifier;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(http: reqwest::Client, bot_token: &str, chat_id: &str) -> Self {
        Self {
            http,
            api_base: TELEGRAM_API.to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    /// Point at a different Bot API host.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    async fn send(&self, message: &str) -> Result<(), String> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let description = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("description").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or_default();
        Err(format!("{} {description}", status.as_u16()))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        match self.send(message).await {
            Ok(()) => info!(chat_id = %self.chat_id, "telegram message sent"),
            Err(e) => error!(chat_id = %self.chat_id, error = %e, "telegram delivery failed"),
        }
    }
}
