//! # In-Memory Secret Store
//!
//! Thread-safe in-memory implementation for testing and local development.

use crate::secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// In-memory secret store backed by a HashMap
///
/// Thread-safe and suitable for unit/integration tests and for local runs
/// where the relay configuration is injected through the environment.
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    secrets: Arc<RwLock<HashMap<SecretName, SecretValue>>>,
}

impl MemorySecretStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store pre-populated with secrets
    pub fn with_secrets(secrets: HashMap<SecretName, SecretValue>) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(secrets)),
        }
    }

    /// Add or replace a secret
    pub fn add_secret(&self, name: SecretName, value: SecretValue) {
        self.secrets.write().unwrap().insert(name, value);
    }

    /// Remove a secret
    pub fn remove_secret(&self, name: &SecretName) {
        self.secrets.write().unwrap().remove(name);
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError> {
        self.secrets
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "memory_secret_store_tests.rs"]
mod tests;
