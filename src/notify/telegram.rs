// src/notify/telegram.rs

//! Telegram Bot API notification backend.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::notify::Notifier;

/// Sends messages through a Telegram bot.
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    owner: String,
    subscribers: Vec<String>,
}

impl TelegramNotifier {
    pub fn new(
        client: reqwest::Client,
        token: impl Into<String>,
        owner: impl Into<String>,
        subscribers: Vec<String>,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            owner: owner.into(),
            subscribers,
        }
    }

    /// Build a notifier from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_OWNER_ID`.
    /// `TELEGRAM_SUBSCRIBERS` (comma-separated chat ids) is optional and
    /// defaults to the owner alone. Returns `None` when the credentials
    /// are not configured.
    pub fn from_env(client: &reqwest::Client) -> Option<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let owner = std::env::var("TELEGRAM_OWNER_ID").ok()?;
        let subscribers = match std::env::var("TELEGRAM_SUBSCRIBERS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => vec![owner.clone()],
        };
        Some(Self::new(client.clone(), token, owner, subscribers))
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::notify(format!(
                "Telegram API returned {} for chat {}",
                response.status(),
                chat_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_to_owner(&self, message: &str) -> Result<()> {
        self.send_message(&self.owner, message).await
    }

    async fn send_to_all(&self, message: &str) -> Result<()> {
        for chat_id in &self.subscribers {
            self.send_message(chat_id, message).await?;
        }
        Ok(())
    }
}
