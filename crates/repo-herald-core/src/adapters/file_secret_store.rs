//! # File Secret Store
//!
//! Reads secrets from files in a directory, one file per secret, named
//! after the secret. Matches the layout produced by mounting a Kubernetes
//! secret as a volume.

use crate::secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Secret store backed by a directory of secret files
pub struct FileSecretStore {
    directory: PathBuf,
}

impl FileSecretStore {
    /// Create a store reading from the given directory
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError> {
        let path = self.directory.join(name.as_str());

        debug!(path = %path.display(), "Reading secret file");

        match tokio::fs::read_to_string(&path).await {
            // Mounted secret files commonly carry a trailing newline.
            Ok(contents) => Ok(SecretValue::from_string(
                contents.trim_end_matches('\n').to_string(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SecretStoreError::NotFound {
                    name: name.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(SecretStoreError::AccessDenied {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(SecretStoreError::Unavailable {
                message: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }
}

#[cfg(test)]
#[path = "file_secret_store_tests.rs"]
mod tests;
