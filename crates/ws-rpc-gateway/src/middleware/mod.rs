//! HTTP-side concerns shared by every connection.

pub mod metrics;

pub use metrics::GatewayMetrics;
