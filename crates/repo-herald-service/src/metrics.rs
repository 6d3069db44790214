//! Metrics collection for the relay service.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Service metrics for observability
///
/// Counters live in an owned registry rather than the process-global one,
/// so multiple instances (one per test router) never collide on
/// registration.
#[derive(Debug)]
pub struct ServiceMetrics {
    registry: Registry,

    /// Webhook requests received, regardless of outcome
    pub webhooks_received_total: IntCounter,

    /// Notifications successfully delivered to the chat platform
    pub notifications_delivered_total: IntCounter,

    /// Events that mapped to no notification
    pub notifications_skipped_total: IntCounter,

    /// Delivery attempts that failed
    pub notifications_failed_total: IntCounter,
}

impl ServiceMetrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let webhooks_received_total = IntCounter::new(
            "webhooks_received_total",
            "Total webhook requests received",
        )?;
        let notifications_delivered_total = IntCounter::new(
            "notifications_delivered_total",
            "Notifications delivered to the chat platform",
        )?;
        let notifications_skipped_total = IntCounter::new(
            "notifications_skipped_total",
            "Webhook events that mapped to no notification",
        )?;
        let notifications_failed_total = IntCounter::new(
            "notifications_failed_total",
            "Notification delivery failures",
        )?;

        registry.register(Box::new(webhooks_received_total.clone()))?;
        registry.register(Box::new(notifications_delivered_total.clone()))?;
        registry.register(Box::new(notifications_skipped_total.clone()))?;
        registry.register(Box::new(notifications_failed_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            webhooks_received_total,
            notifications_delivered_total,
            notifications_skipped_total,
            notifications_failed_total,
        }))
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
