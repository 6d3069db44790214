//! # Repo-Herald Service
//!
//! Binary entry point for the Repo-Herald HTTP service.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes logging
//! - Constructs the secret store, configuration provider, Discord
//!   connector and notification deliverer explicitly
//! - Starts the HTTP server from repo-herald-service

use anyhow::{anyhow, Context};
use repo_herald_core::adapters::{FileSecretStore, MemorySecretStore};
use repo_herald_core::{
    NotificationDeliverer, SecretConfigurationProvider, SecretName, SecretStore, SecretValue,
};
use repo_herald_service::{
    discord::DiscordRestConnector, start_server, SecretBackend, ServiceConfig, ServiceError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order, later sources override earlier ones):
    //  1. /etc/repo-herald/service.yaml     system-wide defaults
    //  2. ./config/service.yaml             deployment-local override
    //  3. Path given by RH_CONFIG_FILE env  operator-specified file
    //  4. Environment variables prefixed RH__ (double-underscore separator)
    //     e.g. RH__SERVER__PORT=9090 sets server.port = 9090
    //
    // All fields carry serde defaults, so an entirely unconfigured
    // environment yields a valid config. A malformed file or an
    // uncoercible environment variable IS a hard error because it
    // indicates deliberate-but-broken operator configuration.
    // -------------------------------------------------------------------------
    let service_config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("repo-herald: configuration error: {:#}", e);
            std::process::exit(3);
        }
    };

    init_logging(&service_config);

    info!("Starting Repo-Herald Service");

    let (provider, deliverer) = match build_components(&service_config) {
        Ok(components) => components,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Failed to construct service components; aborting");
            std::process::exit(3);
        }
    };

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        backend = ?service_config.secrets.backend,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(service_config, provider, deliverer).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }
}

// ============================================================================
// Private helpers
// ============================================================================

/// Load and validate the service configuration
fn load_configuration() -> anyhow::Result<ServiceConfig> {
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/repo-herald/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    if let Ok(explicit_path) = std::env::var("RH_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }
    }

    let config = config_builder
        .add_source(config::Environment::with_prefix("RH").separator("__"))
        .build()
        .context("failed to build configuration")?;

    let service_config: ServiceConfig = config
        .try_deserialize()
        .context("could not deserialize service configuration")?;

    service_config
        .validate()
        .context("service configuration is invalid")?;

    Ok(service_config)
}

/// Initialize the tracing subscriber from the logging section
fn init_logging(config: &ServiceConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "repo_herald_service={level},repo_herald_core={level},tower_http=info",
            level = config.logging.level
        ))
    });

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Construct the configuration provider and deliverer from the config
///
/// All collaborators are built here and injected; nothing service-wide is
/// resolved through globals.
fn build_components(
    config: &ServiceConfig,
) -> anyhow::Result<(Arc<SecretConfigurationProvider>, Arc<NotificationDeliverer>)> {
    let secret_name = SecretName::new(&config.secrets.secret_name)
        .context("secrets.secret_name is not a valid secret name")?;

    let store = build_secret_store(config, &secret_name)?;
    let provider = Arc::new(SecretConfigurationProvider::new(store, secret_name));

    let connector = DiscordRestConnector::with_api_base(config.delivery.api_base.clone());
    let deliverer = Arc::new(NotificationDeliverer::with_ready_timeout(
        Arc::new(connector),
        Duration::from_secs(config.delivery.ready_timeout_seconds),
    ));

    Ok((provider, deliverer))
}

/// Construct the configured secret store backend
fn build_secret_store(
    config: &ServiceConfig,
    secret_name: &SecretName,
) -> anyhow::Result<Arc<dyn SecretStore>> {
    match config.secrets.backend {
        SecretBackend::Memory => {
            let blob = config
                .secrets
                .literal_value
                .clone()
                .ok_or_else(|| anyhow!("secrets.literal_value is required for the memory backend"))?;

            let store = MemorySecretStore::new();
            store.add_secret(secret_name.clone(), SecretValue::from_string(blob));
            info!("Using in-memory secret store");
            Ok(Arc::new(store))
        }
        SecretBackend::File => {
            let directory = config
                .secrets
                .directory
                .clone()
                .ok_or_else(|| anyhow!("secrets.directory is required for the file backend"))?;

            info!(directory = %directory, "Using file secret store");
            Ok(Arc::new(FileSecretStore::new(directory)))
        }
        #[cfg(feature = "azure")]
        SecretBackend::Azure => {
            let vault_url = config
                .secrets
                .vault_url
                .clone()
                .ok_or_else(|| anyhow!("secrets.vault_url is required for the azure backend"))?;

            let store = repo_herald_core::adapters::AzureKeyVaultSecretStore::new(&vault_url)
                .context("failed to construct Azure Key Vault secret store")?;
            info!(vault_url = %vault_url, "Using Azure Key Vault secret store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "azure"))]
        SecretBackend::Azure => Err(anyhow!(
            "the azure secret backend requires building with the 'azure' feature"
        )),
    }
}
