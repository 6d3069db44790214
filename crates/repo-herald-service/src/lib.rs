//! # Repo-Herald HTTP Service
//!
//! HTTP server receiving GitHub webhooks and relaying them as chat
//! notifications.
//!
//! This service provides:
//! - GitHub webhook endpoint with per-repository routing
//! - Health and readiness endpoints
//! - Prometheus metrics endpoint
//!
//! The webhook handler is stateless: every request loads a fresh relay
//! configuration from the secret store and opens its own delivery session.

// Public modules
pub mod discord;
pub mod errors;
pub mod metrics;
pub mod responses;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use errors::RelayHandlerError;
use metrics::ServiceMetrics;
use repo_herald_core::{classify, ConfigurationProvider, NotificationDeliverer, WebhookPayload};
use responses::{HealthResponse, ReadinessResponse, RelayResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Provider resolving the relay configuration per request
    pub provider: Arc<dyn ConfigurationProvider>,

    /// Delivery state machine driving chat sessions
    pub deliverer: Arc<NotificationDeliverer>,

    /// Metrics collector for observability
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        provider: Arc<dyn ConfigurationProvider>,
        deliverer: Arc<NotificationDeliverer>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            config,
            provider,
            deliverer,
            metrics,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook endpoint settings
    pub webhook: WebhookConfig,

    /// Secret store settings
    pub secrets: SecretsConfig,

    /// Chat delivery settings
    pub delivery: DeliveryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate the configuration at startup
    ///
    /// # Errors
    /// Returns [`ServiceConfigError::Invalid`] describing the first
    /// offending field.
    pub fn validate(&self) -> Result<(), ServiceConfigError> {
        if self.server.port == 0 {
            return Err(ServiceConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        if !self.webhook.endpoint_path.starts_with('/') {
            return Err(ServiceConfigError::Invalid {
                message: "webhook.endpoint_path must start with '/'".to_string(),
            });
        }

        if self.delivery.ready_timeout_seconds == 0 {
            return Err(ServiceConfigError::Invalid {
                message: "delivery.ready_timeout_seconds must be non-zero".to_string(),
            });
        }

        if self.delivery.api_base.is_empty() {
            return Err(ServiceConfigError::Invalid {
                message: "delivery.api_base must not be empty".to_string(),
            });
        }

        match self.secrets.backend {
            SecretBackend::Memory => {
                if self.secrets.literal_value.is_none() {
                    return Err(ServiceConfigError::Invalid {
                        message: "secrets.literal_value is required for the memory backend"
                            .to_string(),
                    });
                }
            }
            SecretBackend::File => {
                if self.secrets.directory.is_none() {
                    return Err(ServiceConfigError::Invalid {
                        message: "secrets.directory is required for the file backend".to_string(),
                    });
                }
            }
            SecretBackend::Azure => {
                if self.secrets.vault_url.is_none() {
                    return Err(ServiceConfigError::Invalid {
                        message: "secrets.vault_url is required for the azure backend".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

/// Webhook endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook endpoint path
    pub endpoint_path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/webhook".to_string(),
        }
    }
}

/// Secret store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// In-memory store seeded from `secrets.literal_value` (local runs)
    Memory,
    /// Directory of secret files, Kubernetes-mount style
    File,
    /// Azure Key Vault (requires the `azure` cargo feature)
    Azure,
}

/// Secret store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Which backend to construct
    pub backend: SecretBackend,

    /// Name of the secret holding the relay configuration blob
    pub secret_name: String,

    /// Relay configuration blob for the memory backend
    pub literal_value: Option<String>,

    /// Secret file directory for the file backend
    pub directory: Option<String>,

    /// Vault URL for the azure backend
    pub vault_url: Option<String>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            backend: SecretBackend::File,
            secret_name: "repo-herald-relay-config".to_string(),
            literal_value: None,
            directory: Some("/etc/repo-herald/secrets".to_string()),
            vault_url: None,
        }
    }
}

/// Chat delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Bound on the connect-and-wait-for-ready step in seconds
    pub ready_timeout_seconds: u64,

    /// Base URL of the chat platform REST API
    pub api_base: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            ready_timeout_seconds: 10,
            api_base: discord::DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes =
        Router::new().route(&state.config.webhook.endpoint_path, post(handle_webhook));

    let health_routes = Router::new()
        .route("/health", get(handle_health_check))
        .route("/ready", get(handle_readiness_check));

    let observability_routes = Router::new().route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(observability_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
pub async fn start_server(
    config: ServiceConfig,
    provider: Arc<dyn ConfigurationProvider>,
    deliverer: Arc<NotificationDeliverer>,
) -> Result<(), ServiceError> {
    let metrics = ServiceMetrics::new().map_err(|e| {
        ServiceError::Configuration(ServiceConfigError::Invalid {
            message: format!("Failed to initialize metrics: {}", e),
        })
    })?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let shutdown_timeout = std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);

    let state = AppState::new(config, provider, deliverer, metrics);
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: address.clone(),
                message: e.to_string(),
            })?;

    info!(address = %address, "Starting HTTP server");

    let shutdown_signal = async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to install Ctrl+C signal handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to install SIGTERM signal handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!(
                    timeout_seconds = shutdown_timeout.as_secs(),
                    "Received SIGINT, initiating graceful shutdown"
                );
            },
            _ = terminate => {
                info!(
                    timeout_seconds = shutdown_timeout.as_secs(),
                    "Received SIGTERM, initiating graceful shutdown"
                );
            },
        }
    };

    // In-flight requests complete before shutdown; new connections are
    // refused as soon as the signal arrives.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Webhook Handler
// ============================================================================

/// Handle GitHub webhook requests
///
/// The full relay pipeline runs inline: parse, load configuration, route,
/// classify, deliver. Unroutable repositories and unclassified events exit
/// early without opening a chat session.
#[instrument(skip(state, body))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, RelayHandlerError> {
    state.metrics.webhooks_received_total.inc();

    if body.is_empty() {
        return Err(RelayHandlerError::MissingBody);
    }

    let payload = WebhookPayload::from_slice(&body)?;

    let configuration = state.provider.load().await?;

    let route = configuration.route_for(payload.repository()).ok_or_else(|| {
        RelayHandlerError::RouteNotFound {
            repository: payload.repository().to_string(),
        }
    })?;

    let Some(intent) = classify(&payload, route) else {
        info!(
            repository = %payload.repository(),
            action = payload.action().as_str(),
            entity = payload.entity().entity_type(),
            "Event does not map to a notification, skipping"
        );
        state.metrics.notifications_skipped_total.inc();
        return Ok(Json(RelayResponse::skipped()));
    };

    match state
        .deliverer
        .deliver(configuration.bot_token(), &intent)
        .await
    {
        Ok(()) => {
            info!(repository = %payload.repository(), "Notification relayed");
            state.metrics.notifications_delivered_total.inc();
            Ok(Json(RelayResponse::delivered()))
        }
        Err(e) => {
            state.metrics.notifications_failed_total.inc();
            Err(RelayHandlerError::Delivery(e))
        }
    }
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Basic health check endpoint
#[instrument(skip_all)]
async fn handle_health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check for load balancers
///
/// The relay holds no warm state; if the process answers, it is ready.
#[instrument(skip_all)]
async fn handle_readiness_check(State(_state): State<AppState>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse { ready: true })
}

// ============================================================================
// Observability Handlers
// ============================================================================

/// Prometheus metrics endpoint
#[instrument(skip_all)]
async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .encode()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============================================================================
// Error Types
// ============================================================================

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ServiceConfigError),
}

/// Service configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
