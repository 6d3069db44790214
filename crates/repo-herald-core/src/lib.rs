//! # Repo-Herald Core
//!
//! Core business logic for the Repo-Herald webhook-to-chat relay.
//!
//! This crate contains the domain logic for interpreting GitHub webhook
//! payloads, classifying them into notifications, resolving per-repository
//! delivery routes, and driving a single-use chat delivery session.
//!
//! ## Architecture
//!
//! The core follows clean architecture principles:
//! - Business logic depends only on trait abstractions
//! - Infrastructure implementations are injected at runtime
//! - All external dependencies (secret stores, chat platforms) are
//!   abstracted behind traits
//!
//! ## Usage
//!
//! ```rust
//! use repo_herald_core::{ChannelId, RepositoryName};
//!
//! let repository = RepositoryName::new("acme/widgets").unwrap();
//! assert_eq!(repository.short_name(), "widgets");
//! let channel = ChannelId::new("123456789012345678").unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// GitHub repository identifier in `owner/name` form
///
/// The full name is the lookup key for the per-repository routing table.
/// The short name (the part after the last `/`) is used cosmetically in
/// rendered notification text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Create new repository name with validation
    ///
    /// # Validation Rules
    /// - Must not be empty
    /// - Must contain exactly one `/` separating owner and name
    /// - Neither owner nor name may be empty
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::Required {
                field: "repository".to_string(),
            });
        }

        let mut parts = value.splitn(2, '/');
        let owner = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(ValidationError::InvalidFormat {
                field: "repository".to_string(),
                message: "must be in 'owner/name' form".to_string(),
            });
        }

        Ok(Self(value))
    }

    /// Get the full `owner/name` representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the repository name without the owner prefix
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RepositoryName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Chat channel identifier (snowflake-style numeric string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    /// Create new channel ID with validation
    ///
    /// Channel IDs are numeric strings of 1-20 digits, matching the
    /// snowflake format used by the chat platform.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_snowflake("channel_id", &value)?;
        Ok(Self(value))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Forum channel identifier (snowflake-style numeric string)
///
/// A forum is a parent channel in which discussion threads are created on
/// demand; release notifications target forums when one is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForumId(String);

impl ForumId {
    /// Create new forum ID with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_snowflake("forum_id", &value)?;
        Ok(Self(value))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ForumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ForumId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

fn validate_snowflake(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 20 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length: 20,
        });
    }

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCharacters {
            field: field.to_string(),
            invalid_chars: "non-numeric".to_string(),
        });
    }

    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Error type for input validation failures
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' has invalid format: {message}")]
    InvalidFormat { field: String, message: String },

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    TooLong { field: String, max_length: usize },

    #[error("Field '{field}' contains invalid characters: {invalid_chars}")]
    InvalidCharacters {
        field: String,
        invalid_chars: String,
    },
}

// ============================================================================
// Module declarations
// ============================================================================

/// Webhook payload model and parsing
pub mod event;

/// Event classification and notification formatting
pub mod notification;

/// Per-repository routing configuration
pub mod routing;

/// Secret store boundary for relay configuration
pub mod secrets;

/// Configuration provider resolving the relay configuration per call
pub mod provider;

/// Chat delivery session traits and the delivery state machine
pub mod delivery;

/// Secret store adapters for infrastructure implementations
pub mod adapters;

// Re-export key types for convenience
pub use delivery::{
    ChatConnector, ChatSession, DeliveryError, NotificationDeliverer, TargetKind,
};
pub use event::{
    EventAction, EventEntity, IssueDetails, PayloadError, PullRequestDetails, ReleaseDetails,
    WebhookPayload,
};
pub use notification::{classify, NotificationIntent};
pub use provider::{ConfigError, ConfigurationProvider, SecretConfigurationProvider};
pub use routing::{RelayConfigError, RelayConfiguration, RepoRoute};
pub use secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
