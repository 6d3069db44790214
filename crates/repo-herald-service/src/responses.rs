//! Response types for the HTTP service.

use serde::{Deserialize, Serialize};

/// Webhook relay response
///
/// The same `{ message, error? }` shape is used for success, skip and
/// failure outcomes; `error` is only present on failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayResponse {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    /// Response for a delivered notification
    pub fn delivered() -> Self {
        Self {
            message: "Notification delivered".to_string(),
            error: None,
        }
    }

    /// Response for an event that maps to no notification
    pub fn skipped() -> Self {
        Self {
            message: "Event skipped, no notification configured for this action".to_string(),
            error: None,
        }
    }

    /// Response for a failed relay attempt
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}
