//! Tests for service configuration and router construction.

use super::*;

fn memory_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.secrets.backend = SecretBackend::Memory;
    config.secrets.literal_value = Some(r#"{ "bot_token": "t", "repositories": {} }"#.to_string());
    config
}

#[test]
fn test_default_config_is_valid() {
    // Defaults select the file backend with a default directory, so an
    // unconfigured environment still validates.
    assert!(ServiceConfig::default().validate().is_ok());
}

#[test]
fn test_default_server_settings() {
    let config = ServiceConfig::default();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.webhook.endpoint_path, "/webhook");
    assert_eq!(config.delivery.ready_timeout_seconds, 10);
    assert_eq!(config.delivery.api_base, discord::DEFAULT_API_BASE);
}

#[test]
fn test_zero_port_is_invalid() {
    let mut config = ServiceConfig::default();
    config.server.port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_endpoint_path_must_be_absolute() {
    let mut config = ServiceConfig::default();
    config.webhook.endpoint_path = "webhook".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_ready_timeout_is_invalid() {
    let mut config = ServiceConfig::default();
    config.delivery.ready_timeout_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_memory_backend_requires_literal_value() {
    let mut config = ServiceConfig::default();
    config.secrets.backend = SecretBackend::Memory;
    config.secrets.literal_value = None;
    assert!(config.validate().is_err());

    assert!(memory_config().validate().is_ok());
}

#[test]
fn test_file_backend_requires_directory() {
    let mut config = ServiceConfig::default();
    config.secrets.backend = SecretBackend::File;
    config.secrets.directory = None;
    assert!(config.validate().is_err());
}

#[test]
fn test_azure_backend_requires_vault_url() {
    let mut config = ServiceConfig::default();
    config.secrets.backend = SecretBackend::Azure;
    config.secrets.vault_url = None;
    assert!(config.validate().is_err());

    config.secrets.vault_url = Some("https://example.vault.azure.net".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_deserializes_from_empty_document() {
    let config: ServiceConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.secrets.secret_name, "repo-herald-relay-config");
}

#[test]
fn test_secret_backend_deserializes_lowercase() {
    let config: ServiceConfig =
        serde_json::from_str(r#"{ "secrets": { "backend": "memory" } }"#).unwrap();
    assert_eq!(config.secrets.backend, SecretBackend::Memory);
}

#[test]
fn test_router_builds_with_configured_webhook_path() {
    use repo_herald_core::{ChatConnector, ChatSession, DeliveryError, SecretValue};
    use repo_herald_core::{ConfigurationProvider, RelayConfiguration};

    struct NeverProvider;

    #[async_trait::async_trait]
    impl ConfigurationProvider for NeverProvider {
        async fn load(
            &self,
        ) -> Result<RelayConfiguration, repo_herald_core::ConfigError> {
            Err(repo_herald_core::ConfigError::SecretNotFound {
                name: "unused".to_string(),
            })
        }
    }

    struct NeverConnector;

    #[async_trait::async_trait]
    impl ChatConnector for NeverConnector {
        async fn connect(
            &self,
            _token: &SecretValue,
        ) -> Result<Box<dyn ChatSession>, DeliveryError> {
            Err(DeliveryError::Transport {
                message: "unused".to_string(),
            })
        }
    }

    let mut config = memory_config();
    config.webhook.endpoint_path = "/hooks/github".to_string();

    let state = AppState::new(
        config,
        Arc::new(NeverProvider),
        Arc::new(NotificationDeliverer::new(Arc::new(NeverConnector))),
        ServiceMetrics::new().unwrap(),
    );

    let _router = create_router(state);
}
