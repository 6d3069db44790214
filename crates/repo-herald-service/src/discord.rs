//! # Discord REST Connector
//!
//! Implements the chat delivery traits over the Discord REST API. Each
//! session wraps its own HTTP client and bot-token authorization header;
//! the readiness probe is a `GET /users/@me` call, which is what the
//! deliverer races against its timeout.

use async_trait::async_trait;
use repo_herald_core::{
    ChannelId, ChatConnector, ChatSession, DeliveryError, ForumId, SecretValue, TargetKind,
};
use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

/// Production Discord REST API base URL
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Discord channel type for guild forums
const CHANNEL_TYPE_GUILD_FORUM: u8 = 15;

/// Discord limit on message content length
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Discord limit on thread name length
const MAX_THREAD_NAME_LENGTH: usize = 100;

// ============================================================================
// Connector
// ============================================================================

/// Opens single-use Discord REST sessions
#[derive(Debug, Clone)]
pub struct DiscordRestConnector {
    api_base: String,
}

impl DiscordRestConnector {
    /// Create a connector against the production Discord API
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Create a connector against a custom API base (tests)
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

impl Default for DiscordRestConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatConnector for DiscordRestConnector {
    async fn connect(&self, token: &SecretValue) -> Result<Box<dyn ChatSession>, DeliveryError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DeliveryError::Transport {
                message: format!("failed to construct HTTP client: {}", e),
            })?;

        Ok(Box::new(DiscordRestSession {
            client,
            api_base: self.api_base.clone(),
            authorization: format!("Bot {}", token.expose_secret()),
            closed: false,
        }))
    }
}

// ============================================================================
// Session
// ============================================================================

/// One live Discord REST session
pub struct DiscordRestSession {
    client: reqwest::Client,
    api_base: String,
    authorization: String,
    closed: bool,
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    #[serde(rename = "type")]
    channel_type: u8,
}

impl DiscordRestSession {
    async fn post_json(
        &self,
        url: String,
        payload: serde_json::Value,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, &self.authorization)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(DeliveryError::Send {
            message: format!("{} returned {}: {}", url, status, detail),
        })
    }
}

#[async_trait]
impl ChatSession for DiscordRestSession {
    #[instrument(skip(self))]
    async fn wait_ready(&self) -> Result<(), DeliveryError> {
        let url = format!("{}/users/@me", self.api_base);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        match response.status() {
            status if status.is_success() => {
                debug!("Discord session ready");
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(DeliveryError::Authentication {
                    message: format!("Discord rejected the bot token ({})", response.status()),
                })
            }
            status => Err(DeliveryError::Transport {
                message: format!("readiness probe returned {}", status),
            }),
        }
    }

    #[instrument(skip(self))]
    async fn target_kind(&self, target: &str) -> Result<TargetKind, DeliveryError> {
        let url = format!("{}/channels/{}", self.api_base, target);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DeliveryError::TargetNotFound {
                target: target.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(DeliveryError::Transport {
                message: format!("channel lookup returned {}", response.status()),
            });
        }

        let info: ChannelInfo = response.json().await.map_err(|e| DeliveryError::Transport {
            message: format!("malformed channel response: {}", e),
        })?;

        if info.channel_type == CHANNEL_TYPE_GUILD_FORUM {
            Ok(TargetKind::Forum)
        } else {
            Ok(TargetKind::Text)
        }
    }

    #[instrument(skip(self, text))]
    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel.as_str());
        let payload = json!({ "content": truncate(text, MAX_MESSAGE_LENGTH) });

        self.post_json(url, payload).await
    }

    #[instrument(skip(self, body))]
    async fn create_forum_post(
        &self,
        forum: &ForumId,
        title: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let url = format!("{}/channels/{}/threads", self.api_base, forum.as_str());
        let payload = json!({
            "name": truncate(title, MAX_THREAD_NAME_LENGTH),
            "message": { "content": truncate(body, MAX_MESSAGE_LENGTH) },
        });

        self.post_json(url, payload).await
    }

    async fn close(&mut self) -> Result<(), DeliveryError> {
        if self.closed {
            return Err(DeliveryError::SessionClosed);
        }
        self.closed = true;
        debug!("Discord session closed");
        Ok(())
    }
}

/// Truncate to the platform limit, counting characters the way Discord does
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    text.chars().take(limit).collect()
}

#[cfg(test)]
#[path = "discord_tests.rs"]
mod tests;
