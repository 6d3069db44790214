//! # Webhook Payload Module
//!
//! Parses raw GitHub webhook bodies into the typed payload model used by
//! the classifier.
//!
//! GitHub does not carry an explicit entity discriminator in the payload;
//! the entity kind is inferred from which optional top-level field is
//! populated. That inference happens exactly once, here, with a fixed
//! precedence (issue, then pull request, then release) so that a payload
//! unexpectedly carrying multiple entity fields always resolves the same
//! way.

use crate::{RepositoryName, ValidationError};
use serde::Deserialize;

// ============================================================================
// Core Types
// ============================================================================

/// Webhook action verb, matched exactly and case-sensitively
///
/// Issues and pull requests use "opened"; releases use "created". Any
/// other value is carried through as [`EventAction::Other`] and yields no
/// notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    Opened,
    Reopened,
    Closed,
    Created,
    Other(String),
}

impl EventAction {
    /// Parse the raw action string (exact, case-sensitive match)
    pub fn parse(value: &str) -> Self {
        match value {
            "opened" => Self::Opened,
            "reopened" => Self::Reopened,
            "closed" => Self::Closed,
            "created" => Self::Created,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the raw action string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Reopened => "reopened",
            Self::Closed => "closed",
            Self::Created => "created",
            Self::Other(value) => value,
        }
    }
}

/// Issue fields used in rendered notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDetails {
    pub title: String,
    pub author: String,
    pub url: String,
}

/// Pull request fields used in rendered notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDetails {
    pub title: String,
    pub author: String,
    pub url: String,
}

/// Release fields used in rendered notifications and forum posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDetails {
    pub tag: String,
    pub author: String,
    pub url: String,
    pub body: String,
}

/// The GitHub object the webhook event concerns
///
/// Explicit tagged union; the variant is fixed at parse time by
/// [`WebhookPayload::from_slice`] and never re-inferred downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEntity {
    Issue(IssueDetails),
    PullRequest(PullRequestDetails),
    Release(ReleaseDetails),
    /// No recognized entity field was present in the payload
    None,
}

impl EventEntity {
    /// Get entity type string for logging
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Issue(_) => "issue",
            Self::PullRequest(_) => "pull_request",
            Self::Release(_) => "release",
            Self::None => "none",
        }
    }
}

/// Typed webhook payload after parsing
///
/// Immutable value object; constructed once per invocation from the raw
/// request body and discarded when the call completes.
#[derive(Debug, Clone)]
pub struct WebhookPayload {
    action: EventAction,
    repository: RepositoryName,
    entity: EventEntity,
}

impl WebhookPayload {
    /// Parse a raw JSON webhook body
    ///
    /// # Errors
    /// - [`PayloadError::Json`] when the body is not valid JSON or does not
    ///   match the expected field shapes
    /// - [`PayloadError::MissingRepository`] when `repository.full_name` is
    ///   absent
    /// - [`PayloadError::InvalidRepository`] when the repository name is not
    ///   in `owner/name` form
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        let raw: RawPayload = serde_json::from_slice(body)?;

        let repository = raw
            .repository
            .and_then(|r| r.full_name)
            .ok_or(PayloadError::MissingRepository)?;
        let repository =
            RepositoryName::new(repository).map_err(PayloadError::InvalidRepository)?;

        let action = EventAction::parse(raw.action.as_deref().unwrap_or_default());

        // Entity precedence: issue, then pull request, then release. A
        // well-formed GitHub payload carries at most one of these fields.
        let entity = if let Some(issue) = raw.issue {
            EventEntity::Issue(IssueDetails {
                title: issue.title,
                author: issue.user.login,
                url: issue.html_url,
            })
        } else if let Some(pull_request) = raw.pull_request {
            EventEntity::PullRequest(PullRequestDetails {
                title: pull_request.title,
                author: pull_request.user.login,
                url: pull_request.html_url,
            })
        } else if let Some(release) = raw.release {
            EventEntity::Release(ReleaseDetails {
                tag: release.tag_name,
                author: release.author.login,
                url: release.html_url,
                body: release.body.unwrap_or_default(),
            })
        } else {
            EventEntity::None
        };

        Ok(Self {
            action,
            repository,
            entity,
        })
    }

    /// Get the event action
    pub fn action(&self) -> &EventAction {
        &self.action
    }

    /// Get the repository the event concerns
    pub fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Get the event entity
    pub fn entity(&self) -> &EventEntity {
        &self.entity
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors while parsing a webhook body
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload has no repository.full_name field")]
    MissingRepository,

    #[error("Payload repository name is invalid: {0}")]
    InvalidRepository(#[source] ValidationError),
}

// ============================================================================
// Raw wire shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPayload {
    action: Option<String>,
    repository: Option<RawRepository>,
    issue: Option<RawItem>,
    pull_request: Option<RawItem>,
    release: Option<RawRelease>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: String,
    user: RawUser,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    tag_name: String,
    // Releases attribute the event to `author`; accept `user` as well for
    // relay-test payloads that mirror the issue shape.
    #[serde(alias = "user")]
    author: RawUser,
    html_url: String,
    body: Option<String>,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
