//! # Secret Store Adapters
//!
//! Infrastructure implementations of the [`SecretStore`] trait.
//!
//! [`SecretStore`]: crate::secrets::SecretStore

mod memory_secret_store;
pub use memory_secret_store::MemorySecretStore;

mod file_secret_store;
pub use file_secret_store::FileSecretStore;

#[cfg(feature = "azure")]
mod azure_key_vault;
#[cfg(feature = "azure")]
pub use azure_key_vault::AzureKeyVaultSecretStore;
