//! Common test utilities for repo-herald-service integration tests
//!
//! This module provides:
//! - Mock implementations of the configuration provider and chat connector
//! - Helpers for building the router under test and posting webhook bodies

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use repo_herald_core::{
    ChannelId, ChatConnector, ChatSession, ConfigError, ConfigurationProvider, DeliveryError,
    ForumId, NotificationDeliverer, RelayConfiguration, SecretValue, TargetKind,
};
use repo_herald_service::metrics::ServiceMetrics;
use repo_herald_service::responses::RelayResponse;
use repo_herald_service::{create_router, AppState, ServiceConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Duration;
use tower::ServiceExt;

// ============================================================================
// Mock Configuration Provider
// ============================================================================

enum ProviderBehavior {
    Blob(String),
    SecretNotFound,
}

/// Mock configuration provider parsing a fixed blob on every load
pub struct MockConfigurationProvider {
    behavior: Mutex<ProviderBehavior>,
    load_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockConfigurationProvider {
    /// Provider serving the given configuration blob
    pub fn with_blob(blob: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(ProviderBehavior::Blob(blob.into())),
            load_calls: AtomicUsize::new(0),
        })
    }

    /// Provider whose backing secret does not exist
    pub fn missing_secret() -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(ProviderBehavior::SecretNotFound),
            load_calls: AtomicUsize::new(0),
        })
    }

    pub fn load_count(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ConfigurationProvider for MockConfigurationProvider {
    async fn load(&self) -> Result<RelayConfiguration, ConfigError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);

        match &*self.behavior.lock().unwrap() {
            ProviderBehavior::Blob(blob) => Ok(RelayConfiguration::from_json(blob)?),
            ProviderBehavior::SecretNotFound => Err(ConfigError::SecretNotFound {
                name: "relay-config".to_string(),
            }),
        }
    }
}

// ============================================================================
// Recording Chat Connector
// ============================================================================

/// One delivered item as observed by the recording session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentItem {
    Message { channel: String, text: String },
    Thread { forum: String, title: String, body: String },
}

/// Shared observation log for everything the deliverer did
#[derive(Default)]
pub struct ConnectorLog {
    pub connect_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    pub sent: Mutex<Vec<SentItem>>,
}

/// Recording chat connector with scriptable target kinds
pub struct RecordingConnector {
    targets: Mutex<HashMap<String, TargetKind>>,
    ready_delay: Mutex<Option<Duration>>,
    log: Arc<ConnectorLog>,
}

#[allow(dead_code)]
impl RecordingConnector {
    pub fn new() -> (Arc<Self>, Arc<ConnectorLog>) {
        let log = Arc::new(ConnectorLog::default());
        let connector = Arc::new(Self {
            targets: Mutex::new(HashMap::new()),
            ready_delay: Mutex::new(None),
            log: Arc::clone(&log),
        });
        (connector, log)
    }

    /// Register a resolvable target and its capability
    pub fn add_target(&self, id: &str, kind: TargetKind) {
        self.targets.lock().unwrap().insert(id.to_string(), kind);
    }

    /// Make the readiness handshake hang for the given duration
    pub fn set_ready_delay(&self, delay: Duration) {
        *self.ready_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait::async_trait]
impl ChatConnector for RecordingConnector {
    async fn connect(&self, _token: &SecretValue) -> Result<Box<dyn ChatSession>, DeliveryError> {
        self.log.connect_calls.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(RecordingSession {
            targets: self.targets.lock().unwrap().clone(),
            ready_delay: *self.ready_delay.lock().unwrap(),
            log: Arc::clone(&self.log),
        }))
    }
}

struct RecordingSession {
    targets: HashMap<String, TargetKind>,
    ready_delay: Option<Duration>,
    log: Arc<ConnectorLog>,
}

#[async_trait::async_trait]
impl ChatSession for RecordingSession {
    async fn wait_ready(&self) -> Result<(), DeliveryError> {
        if let Some(delay) = self.ready_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn target_kind(&self, target: &str) -> Result<TargetKind, DeliveryError> {
        self.targets
            .get(target)
            .copied()
            .ok_or_else(|| DeliveryError::TargetNotFound {
                target: target.to_string(),
            })
    }

    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), DeliveryError> {
        self.log.sent.lock().unwrap().push(SentItem::Message {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn create_forum_post(
        &self,
        forum: &ForumId,
        title: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        self.log.sent.lock().unwrap().push(SentItem::Thread {
            forum: forum.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DeliveryError> {
        self.log.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Router Builders
// ============================================================================

/// Build the router under test with the given collaborators
#[allow(dead_code)]
pub fn test_router(
    provider: Arc<dyn ConfigurationProvider>,
    connector: Arc<dyn ChatConnector>,
    ready_timeout: Duration,
) -> Router {
    let deliverer = Arc::new(NotificationDeliverer::with_ready_timeout(
        connector,
        ready_timeout,
    ));
    let state = AppState::new(
        ServiceConfig::default(),
        provider,
        deliverer,
        ServiceMetrics::new().unwrap(),
    );
    create_router(state)
}

/// Default ready timeout for tests where the handshake is instantaneous
#[allow(dead_code)]
pub const TEST_READY_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Request Helpers
// ============================================================================

/// POST a webhook body and decode the relay response
#[allow(dead_code)]
pub async fn post_webhook(router: Router, body: &str) -> (StatusCode, RelayResponse) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: RelayResponse = serde_json::from_slice(&bytes).unwrap();

    (status, parsed)
}

/// GET a path and return the status and raw body
#[allow(dead_code)]
pub async fn get_path(router: Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
