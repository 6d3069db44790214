//! # Configuration Provider Module
//!
//! Resolves the relay configuration for a single invocation: one secret
//! blob fetched by a fixed name, parsed into [`RelayConfiguration`].
//!
//! Configuration is deliberately re-read on every call. The relay trades
//! per-call latency for correctness: there is no cache to invalidate when
//! an operator rotates the token or edits a route.

use crate::routing::{RelayConfigError, RelayConfiguration};
use crate::secrets::{SecretName, SecretStore, SecretStoreError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

// ============================================================================
// Interface Traits
// ============================================================================

/// Interface for resolving the relay configuration per call
#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    /// Load a fresh configuration
    ///
    /// # Errors
    /// - [`ConfigError::SecretNotFound`] - the backing store has no value
    ///   under the configured key
    /// - [`ConfigError::SecretMalformed`] - the blob does not parse into
    ///   the expected shape
    /// - [`ConfigError::Store`] - any other store failure
    async fn load(&self) -> Result<RelayConfiguration, ConfigError>;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors while resolving the relay configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration secret not found: {name}")]
    SecretNotFound { name: String },

    #[error("Configuration secret is malformed: {0}")]
    SecretMalformed(#[from] RelayConfigError),

    #[error("Secret store failure: {0}")]
    Store(SecretStoreError),
}

// ============================================================================
// Default Implementation
// ============================================================================

/// Configuration provider backed by a single secret blob
///
/// The store is an injected dependency; the provider holds no connection
/// state of its own and is safe to share across concurrent invocations.
pub struct SecretConfigurationProvider {
    store: Arc<dyn SecretStore>,
    secret_name: SecretName,
}

impl SecretConfigurationProvider {
    /// Create a provider reading the given secret from the given store
    pub fn new(store: Arc<dyn SecretStore>, secret_name: SecretName) -> Self {
        Self { store, secret_name }
    }
}

#[async_trait]
impl ConfigurationProvider for SecretConfigurationProvider {
    #[instrument(skip(self), fields(secret_name = %self.secret_name))]
    async fn load(&self) -> Result<RelayConfiguration, ConfigError> {
        let blob = self
            .store
            .get_secret(&self.secret_name)
            .await
            .map_err(|e| match e {
                SecretStoreError::NotFound { name } => ConfigError::SecretNotFound { name },
                other => ConfigError::Store(other),
            })?;

        let configuration = RelayConfiguration::from_json(blob.expose_secret())?;

        debug!(
            routes = configuration.route_count(),
            "Loaded relay configuration"
        );

        Ok(configuration)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
