//! # Azure Key Vault Secret Store
//!
//! Production Azure Key Vault integration using the Azure SDK with
//! DefaultAzureCredential (managed identity in Azure, Azure CLI locally).

use crate::secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};
use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_identity::DefaultAzureCredential;
use azure_security_keyvault::SecretClient;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Azure Key Vault secret store with managed identity authentication
pub struct AzureKeyVaultSecretStore {
    client: SecretClient,
}

impl AzureKeyVaultSecretStore {
    /// Create new Key Vault store for the given vault URL
    ///
    /// # Errors
    /// Returns [`SecretStoreError::Internal`] if the vault URL is empty or
    /// the client cannot be constructed.
    #[instrument]
    pub fn new(vault_url: &str) -> Result<Self, SecretStoreError> {
        if vault_url.is_empty() {
            return Err(SecretStoreError::Internal {
                message: "vault_url is required".to_string(),
            });
        }

        info!(vault_url = %vault_url, "Initializing Azure Key Vault secret store");

        let credential = Arc::new(DefaultAzureCredential::default());
        Self::with_credential(vault_url, credential)
    }

    /// Create store with a custom credential
    ///
    /// Useful for testing or custom authentication scenarios.
    pub fn with_credential(
        vault_url: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, SecretStoreError> {
        let client =
            SecretClient::new(vault_url, credential).map_err(|e| SecretStoreError::Internal {
                message: format!("failed to create Key Vault client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Map Azure SDK errors onto the store error taxonomy
    fn map_azure_error(name: &SecretName, error: azure_core::Error) -> SecretStoreError {
        let error_string = error.to_string();

        if error_string.contains("404") || error_string.contains("NotFound") {
            SecretStoreError::NotFound {
                name: name.to_string(),
            }
        } else if error_string.contains("403")
            || error_string.contains("Forbidden")
            || error_string.contains("Unauthorized")
        {
            SecretStoreError::AccessDenied {
                name: name.to_string(),
                reason: error_string,
            }
        } else if error_string.contains("503")
            || error_string.contains("ServiceUnavailable")
            || error_string.contains("unavailable")
            || error_string.contains("timeout")
            || error_string.contains("Timeout")
        {
            SecretStoreError::Unavailable {
                message: error_string,
            }
        } else {
            SecretStoreError::Internal {
                message: error_string,
            }
        }
    }
}

#[async_trait]
impl SecretStore for AzureKeyVaultSecretStore {
    #[instrument(skip(self))]
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError> {
        debug!(secret_name = %name, "Fetching secret from Azure Key Vault");

        match self.client.get(name.as_str()).await {
            Ok(secret) => {
                info!(secret_name = %name, "Successfully retrieved secret from Key Vault");
                Ok(SecretValue::from_string(secret.value))
            }
            Err(e) => {
                error!(secret_name = %name, error = %e, "Failed to retrieve secret from Key Vault");
                Err(Self::map_azure_error(name, e))
            }
        }
    }
}
