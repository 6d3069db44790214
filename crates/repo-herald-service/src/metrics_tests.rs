//! Tests for the metrics registry.

use super::*;

#[test]
fn test_counters_start_at_zero() {
    let metrics = ServiceMetrics::new().unwrap();

    assert_eq!(metrics.webhooks_received_total.get(), 0);
    assert_eq!(metrics.notifications_delivered_total.get(), 0);
    assert_eq!(metrics.notifications_skipped_total.get(), 0);
    assert_eq!(metrics.notifications_failed_total.get(), 0);
}

#[test]
fn test_encode_renders_all_counters() {
    let metrics = ServiceMetrics::new().unwrap();
    metrics.webhooks_received_total.inc();
    metrics.notifications_delivered_total.inc();

    let rendered = metrics.encode().unwrap();

    assert!(rendered.contains("webhooks_received_total 1"));
    assert!(rendered.contains("notifications_delivered_total 1"));
    assert!(rendered.contains("notifications_skipped_total 0"));
    assert!(rendered.contains("notifications_failed_total 0"));
}

#[test]
fn test_instances_do_not_collide() {
    // Each instance owns its registry, so building several is fine.
    let first = ServiceMetrics::new().unwrap();
    let second = ServiceMetrics::new().unwrap();

    first.webhooks_received_total.inc();
    assert_eq!(second.webhooks_received_total.get(), 0);
}
