//! Chat notifier for alerts
//!
//! Delivery is best-effort; the recorder ignores failures after logging them.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::utils::env_opt;

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Telegram bot `sendMessage`
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(base_url: &str, token: String, chat_id: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            chat_id,
        }
    }

    /// Notifier from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`; `None` unless both are set
    pub fn from_env(base_url: &str, timeout: Duration) -> Option<Self> {
        let token = env_opt(BOT_TOKEN_ENV)?;
        let chat_id = env_opt(CHAT_ID_ENV)?;
        Some(Self::new(base_url, token, chat_id, timeout))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "notifier returned status {}",
                response.status()
            ));
        }
        debug!("Alert forwarded to chat {}", self.chat_id);
        Ok(())
    }
}
