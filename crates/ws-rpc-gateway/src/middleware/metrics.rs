//! Gateway counters.
//!
//! Exposed as JSON on `/metrics` and as Prometheus text on
//! `/metrics/prometheus`.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway metrics
#[derive(Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_error: AtomicU64,

    // Subscription counters
    pub subscribe_total: AtomicU64,
    pub unsubscribe_total: AtomicU64,

    // Inbound limit counters
    pub rate_limit_rejected: AtomicU64,
    pub oversize_rejected: AtomicU64,

    // WebSocket counters
    pub websocket_connections: AtomicU64,
    pub websocket_connections_total: AtomicU64,

    // Fan-out counters
    pub events_received: AtomicU64,
    pub notifications_sent: AtomicU64,
    pub send_failures: AtomicU64,
    pub dropped_not_found: AtomicU64,
    pub dropped_store_error: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reply to a client request
    pub fn record_request(&self, success: bool) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_subscribe(&self) {
        self.subscribe_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsubscribe(&self) {
        self.unsubscribe_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record rate limit rejection
    pub fn record_rate_limit_rejection(&self) {
        self.rate_limit_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_oversize_rejection(&self) {
        self.oversize_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record WebSocket connection
    pub fn record_ws_connect(&self) {
        self.websocket_connections.fetch_add(1, Ordering::Relaxed);
        self.websocket_connections_total
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record WebSocket disconnection
    pub fn record_ws_disconnect(&self) {
        self.websocket_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_event(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one push attempt
    pub fn record_push(&self, delivered: bool) {
        if delivered {
            self.notifications_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.send_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_not_found(&self) {
        self.dropped_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.dropped_store_error.fetch_add(1, Ordering::Relaxed);
    }

    fn counters(&self) -> [(&'static str, &'static str, &'static str, u64); 14] {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        [
            ("requests_total", "counter", "Replies sent for client requests", load(&self.requests_total)),
            ("requests_success_total", "counter", "Successful requests", load(&self.requests_success)),
            ("requests_error_total", "counter", "Failed requests", load(&self.requests_error)),
            ("subscribe_total", "counter", "Accepted subscribe calls", load(&self.subscribe_total)),
            ("unsubscribe_total", "counter", "Accepted unsubscribe calls", load(&self.unsubscribe_total)),
            ("rate_limit_rejected_total", "counter", "Rate limited messages", load(&self.rate_limit_rejected)),
            ("oversize_rejected_total", "counter", "Messages over the size limit", load(&self.oversize_rejected)),
            ("websocket_connections", "gauge", "Active WebSocket connections", load(&self.websocket_connections)),
            ("websocket_connections_total", "counter", "Accepted WebSocket connections", load(&self.websocket_connections_total)),
            ("events_received_total", "counter", "Data store events received", load(&self.events_received)),
            ("notifications_sent_total", "counter", "Pushes enqueued to clients", load(&self.notifications_sent)),
            ("send_failures_total", "counter", "Pushes dropped by closed or full clients", load(&self.send_failures)),
            ("dropped_not_found_total", "counter", "Events dropped because the record was missing", load(&self.dropped_not_found)),
            ("dropped_store_error_total", "counter", "Events dropped because the store failed", load(&self.dropped_store_error)),
        ]
    }

    /// Export metrics in Prometheus text format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();
        for (name, kind, help, value) in self.counters() {
            let _ = write!(
                output,
                "# HELP ws_gateway_{name} {help}\n\
                 # TYPE ws_gateway_{name} {kind}\n\
                 ws_gateway_{name} {value}\n"
            );
        }
        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        serde_json::json!({
            "requests": {
                "total": load(&self.requests_total),
                "success": load(&self.requests_success),
                "error": load(&self.requests_error),
            },
            "subscriptions": {
                "subscribe": load(&self.subscribe_total),
                "unsubscribe": load(&self.unsubscribe_total),
            },
            "limits": {
                "rate_limited": load(&self.rate_limit_rejected),
                "oversize": load(&self.oversize_rejected),
            },
            "websocket": {
                "connections": load(&self.websocket_connections),
                "connections_total": load(&self.websocket_connections_total),
            },
            "notifications": {
                "events": load(&self.events_received),
                "sent": load(&self.notifications_sent),
                "send_failures": load(&self.send_failures),
                "dropped_not_found": load(&self.dropped_not_found),
                "dropped_store_error": load(&self.dropped_store_error),
            }
        })
    }
}
