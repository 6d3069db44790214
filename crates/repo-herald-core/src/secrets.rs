//! # Secret Store Module
//!
//! The boundary to the backing secret store. The relay performs a single
//! read-only lookup of one blob by a fixed key per invocation; no caching
//! or rotation handling lives here.

use async_trait::async_trait;
use std::{fmt, str::FromStr};
use zeroize::Zeroize;

// ============================================================================
// Core Types
// ============================================================================

/// Secret identifier with naming convention validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretName(String);

impl SecretName {
    /// Create new secret name with validation
    ///
    /// # Validation Rules
    /// - Must be 1-127 characters
    /// - Must contain only alphanumeric characters and hyphens
    pub fn new(name: impl Into<String>) -> Result<Self, SecretStoreError> {
        let name = name.into();

        if name.is_empty() {
            return Err(SecretStoreError::InvalidName {
                name,
                reason: "secret name cannot be empty".to_string(),
            });
        }

        if name.len() > 127 {
            return Err(SecretStoreError::InvalidName {
                name,
                reason: "secret name exceeds 127 character limit".to_string(),
            });
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(SecretStoreError::InvalidName {
                name,
                reason: "secret name contains invalid characters".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SecretName {
    type Err = SecretStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Secure container for secret values
///
/// Never included in Debug output or logs; the backing memory is zeroed
/// when the value is dropped.
#[derive(Clone)]
pub struct SecretValue {
    inner: String,
}

impl SecretValue {
    /// Create secret value from string
    pub fn from_string(value: String) -> Self {
        Self { inner: value }
    }

    /// Get secret as string (only for immediate use)
    ///
    /// # Security Warning
    /// The returned string contains the actual secret value. Use
    /// immediately and avoid storing in variables.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Check if secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get secret length without exposing content
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl Drop for SecretValue {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

// ============================================================================
// Interface Traits
// ============================================================================

/// Interface for read-only secret retrieval
///
/// Implementations handle backend-specific authentication and transport.
/// The relay never writes, lists, or rotates secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret by name
    ///
    /// # Errors
    /// - [`SecretStoreError::NotFound`] - no value exists under the name
    /// - [`SecretStoreError::AccessDenied`] - insufficient permissions
    /// - [`SecretStoreError::Unavailable`] - backing store unreachable
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError>;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors from secret store operations
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    #[error("Secret not found: {name}")]
    NotFound { name: String },

    #[error("Access denied to secret '{name}': {reason}")]
    AccessDenied { name: String, reason: String },

    #[error("Secret store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Invalid secret name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Secret store internal error: {message}")]
    Internal { message: String },
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
