//! # Routing Configuration Module
//!
//! Defines the per-repository delivery routes and the unified relay
//! configuration parsed from a single secret blob.
//!
//! An earlier evolution of the relay split this across two stores: a
//! document store keyed by repository name for the routes plus a separate
//! secret for the bot token. The unified single-blob form replaced that
//! split for operational simplicity and is the only form supported here.

use crate::secrets::SecretValue;
use crate::{ChannelId, ForumId, RepositoryName, ValidationError};
use serde::Deserialize;
use std::collections::HashMap;

// ============================================================================
// Core Types
// ============================================================================

/// Delivery route for a single repository
///
/// Invariant: when a forum is configured, release-creation events target
/// the forum; every other notification targets the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoute {
    channel: ChannelId,
    forum: Option<ForumId>,
}

impl RepoRoute {
    /// Create a new route
    pub fn new(channel: ChannelId, forum: Option<ForumId>) -> Self {
        Self { channel, forum }
    }

    /// Get the plain text channel for this repository
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Get the release forum for this repository, if configured
    pub fn forum(&self) -> Option<&ForumId> {
        self.forum.as_ref()
    }
}

/// Complete relay configuration resolved per invocation
///
/// Owned by the request handler for the duration of one call; never cached
/// across calls. Every invocation re-reads and re-parses the secret blob.
#[derive(Debug)]
pub struct RelayConfiguration {
    bot_token: SecretValue,
    routes: HashMap<RepositoryName, RepoRoute>,
}

impl RelayConfiguration {
    /// Parse the unified configuration blob
    ///
    /// Expected shape:
    ///
    /// ```json
    /// {
    ///   "bot_token": "...",
    ///   "repositories": {
    ///     "owner/name": { "channel_id": "123", "forum_id": "456" }
    ///   }
    /// }
    /// ```
    ///
    /// `forum_id` is optional per repository.
    ///
    /// # Errors
    /// - [`RelayConfigError::Json`] when the blob is not valid JSON
    /// - [`RelayConfigError::MissingToken`] when the bot token is empty
    /// - [`RelayConfigError::InvalidRoute`] when a repository key or route
    ///   field fails validation
    pub fn from_json(blob: &str) -> Result<Self, RelayConfigError> {
        let raw: RawRelayConfiguration = serde_json::from_str(blob)?;

        if raw.bot_token.is_empty() {
            return Err(RelayConfigError::MissingToken);
        }

        let mut routes = HashMap::with_capacity(raw.repositories.len());
        for (repository, route) in raw.repositories {
            let name = RepositoryName::new(repository.clone()).map_err(|source| {
                RelayConfigError::InvalidRoute {
                    repository: repository.clone(),
                    source,
                }
            })?;

            let channel = ChannelId::new(route.channel_id).map_err(|source| {
                RelayConfigError::InvalidRoute {
                    repository: repository.clone(),
                    source,
                }
            })?;

            let forum = route
                .forum_id
                .map(ForumId::new)
                .transpose()
                .map_err(|source| RelayConfigError::InvalidRoute {
                    repository,
                    source,
                })?;

            routes.insert(name, RepoRoute::new(channel, forum));
        }

        Ok(Self {
            bot_token: SecretValue::from_string(raw.bot_token),
            routes,
        })
    }

    /// Get the chat authentication token
    pub fn bot_token(&self) -> &SecretValue {
        &self.bot_token
    }

    /// Look up the route for a repository, if one is configured
    pub fn route_for(&self, repository: &RepositoryName) -> Option<&RepoRoute> {
        self.routes.get(repository)
    }

    /// Number of configured repository routes
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors while parsing the unified configuration blob
#[derive(Debug, thiserror::Error)]
pub enum RelayConfigError {
    #[error("Configuration blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration has no bot token")]
    MissingToken,

    #[error("Invalid route for repository '{repository}': {source}")]
    InvalidRoute {
        repository: String,
        #[source]
        source: ValidationError,
    },
}

// ============================================================================
// Raw wire shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRelayConfiguration {
    bot_token: String,
    #[serde(default)]
    repositories: HashMap<String, RawRepoRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRepoRoute {
    channel_id: String,
    forum_id: Option<String>,
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
