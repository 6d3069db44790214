//! # Notification Delivery Module
//!
//! Owns the lifecycle of a single chat delivery session:
//!
//! 1. **Disconnected** → authenticate with the bot token
//! 2. **Connecting** → wait for readiness, racing a fixed timeout
//! 3. **Ready** → resolve the target and check its capability
//! 4. **Sending** → post the message or create the forum thread
//! 5. **Closing** → release the session, unconditionally
//!
//! Sessions are never reused: every delivery opens and tears down its own
//! session, so no connection state is shared between concurrent
//! invocations. Releasing the session on every exit path is a hard
//! invariant; a failed close is logged but never overrides the primary
//! delivery outcome.

use crate::notification::NotificationIntent;
use crate::secrets::SecretValue;
use crate::{ChannelId, ForumId};
use async_trait::async_trait;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};

/// Default bound on the connect-and-wait-for-ready step
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Core Types
// ============================================================================

/// Capability of a resolved delivery target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Plain channel accepting text messages
    Text,
    /// Forum channel accepting new discussion threads
    Forum,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Forum => write!(f, "forum"),
        }
    }
}

// ============================================================================
// Interface Traits
// ============================================================================

/// Interface for opening chat sessions
///
/// `connect` performs the cheap session construction; the potentially slow
/// wait-for-ready handshake happens on the returned session so the caller
/// can bound it with a timeout while still holding a session to tear down.
#[async_trait]
pub trait ChatConnector: Send + Sync {
    /// Authenticate and open a new single-use session
    async fn connect(&self, token: &SecretValue) -> Result<Box<dyn ChatSession>, DeliveryError>;
}

/// A live chat session, exclusively owned by one delivery call
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Wait until the platform reports the session ready
    async fn wait_ready(&self) -> Result<(), DeliveryError>;

    /// Resolve a target id to its capability
    ///
    /// # Errors
    /// - [`DeliveryError::TargetNotFound`] when resolution returns empty
    async fn target_kind(&self, target: &str) -> Result<TargetKind, DeliveryError>;

    /// Post a text message to a plain channel
    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), DeliveryError>;

    /// Create a new discussion thread in a forum with an opening message
    async fn create_forum_post(
        &self,
        forum: &ForumId,
        title: &str,
        body: &str,
    ) -> Result<(), DeliveryError>;

    /// Release the session
    ///
    /// Called exactly once per session, on every exit path.
    async fn close(&mut self) -> Result<(), DeliveryError>;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors while delivering a notification
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Chat session was not ready within {seconds}s")]
    ReadyTimeout { seconds: u64 },

    #[error("Chat authentication failed: {message}")]
    Authentication { message: String },

    #[error("Delivery target not found: {target}")]
    TargetNotFound { target: String },

    #[error("Delivery target {target} is a {actual} target, expected {expected}")]
    WrongTargetType {
        target: String,
        expected: TargetKind,
        actual: TargetKind,
    },

    #[error("Failed to send notification: {message}")]
    Send { message: String },

    #[error("Chat transport error: {message}")]
    Transport { message: String },

    #[error("Chat session already closed")]
    SessionClosed,
}

// ============================================================================
// Delivery State Machine
// ============================================================================

/// Drives the session state machine for one notification
///
/// The connector is an injected dependency; the deliverer itself holds no
/// session state and is safe to share across concurrent invocations.
pub struct NotificationDeliverer {
    connector: Arc<dyn ChatConnector>,
    ready_timeout: Duration,
}

impl NotificationDeliverer {
    /// Create a deliverer with the default ready timeout
    pub fn new(connector: Arc<dyn ChatConnector>) -> Self {
        Self::with_ready_timeout(connector, DEFAULT_READY_TIMEOUT)
    }

    /// Create a deliverer with a custom ready timeout
    pub fn with_ready_timeout(connector: Arc<dyn ChatConnector>, ready_timeout: Duration) -> Self {
        Self {
            connector,
            ready_timeout,
        }
    }

    /// Deliver one notification through a fresh session
    ///
    /// Opens a session, waits for readiness under the configured timeout,
    /// sends, and releases the session before returning, regardless of
    /// which step failed.
    #[instrument(skip(self, token, intent), fields(target = %intent.target()))]
    pub async fn deliver(
        &self,
        token: &SecretValue,
        intent: &NotificationIntent,
    ) -> Result<(), DeliveryError> {
        let mut session = self.connector.connect(token).await?;

        let outcome = match tokio::time::timeout(self.ready_timeout, session.wait_ready()).await {
            Err(_) => Err(DeliveryError::ReadyTimeout {
                seconds: self.ready_timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(())) => Self::send(session.as_ref(), intent).await,
        };

        // Closing is unconditional. A close failure must not mask the
        // delivery outcome.
        if let Err(close_error) = session.close().await {
            warn!(error = %close_error, "Failed to release chat session");
        } else {
            debug!("Chat session released");
        }

        if outcome.is_ok() {
            info!(target = %intent.target(), "Notification delivered");
        }

        outcome
    }

    async fn send(
        session: &dyn ChatSession,
        intent: &NotificationIntent,
    ) -> Result<(), DeliveryError> {
        match intent {
            NotificationIntent::ChannelMessage { channel, text } => {
                match session.target_kind(channel.as_str()).await? {
                    TargetKind::Text => session.post_message(channel, text).await,
                    actual => Err(DeliveryError::WrongTargetType {
                        target: channel.to_string(),
                        expected: TargetKind::Text,
                        actual,
                    }),
                }
            }
            NotificationIntent::ForumPost { forum, title, body } => {
                match session.target_kind(forum.as_str()).await? {
                    TargetKind::Forum => session.create_forum_post(forum, title, body).await,
                    actual => Err(DeliveryError::WrongTargetType {
                        target: forum.to_string(),
                        expected: TargetKind::Forum,
                        actual,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
