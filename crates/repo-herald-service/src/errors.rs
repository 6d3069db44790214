//! Error types for the HTTP service

use crate::responses::RelayResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use repo_herald_core::{ConfigError, DeliveryError, PayloadError};
use tracing::{error, warn};

/// Webhook handler errors with HTTP status code mapping
///
/// - `400 Bad Request`: empty request body;
/// - `404 Not Found`: repository absent from the routing table;
/// - `500 Internal Server Error`: payload parse failures, configuration
///   load failures and delivery failures.
///
/// A malformed payload maps to 500 rather than 400 on purpose; the
/// endpoint is only reachable by the configured webhook sender, so a parse
/// failure indicates a relay-side defect rather than a bad client.
///
/// The endpoint is ops-facing, so error detail is carried in the response
/// body rather than sanitized away.
#[derive(Debug, thiserror::Error)]
pub enum RelayHandlerError {
    /// Request arrived without a body
    #[error("Request body is required")]
    MissingBody,

    /// Webhook payload could not be parsed
    #[error("Failed to parse webhook payload: {0}")]
    Payload(#[from] PayloadError),

    /// Relay configuration could not be loaded
    #[error("Failed to load relay configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// No route is configured for the repository
    #[error("No notification route configured for repository {repository}")]
    RouteNotFound { repository: String },

    /// Notification could not be delivered
    #[error("Failed to deliver notification: {0}")]
    Delivery(#[from] DeliveryError),
}

impl IntoResponse for RelayHandlerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingBody => {
                warn!("Webhook request without a body");
                (StatusCode::BAD_REQUEST, "Request body is required")
            }
            Self::Payload(e) => {
                error!(error = %e, "Failed to parse webhook payload");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse webhook payload",
                )
            }
            Self::Configuration(e) => {
                error!(error = %e, "Failed to load relay configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to load relay configuration",
                )
            }
            Self::RouteNotFound { repository } => {
                warn!(repository = %repository, "Repository is not routed");
                (
                    StatusCode::NOT_FOUND,
                    "Repository is not configured for notifications",
                )
            }
            Self::Delivery(e) => {
                error!(error = %e, "Failed to deliver notification");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to deliver notification",
                )
            }
        };

        let body = RelayResponse::failure(message, self.to_string());

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
