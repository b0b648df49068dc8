//! # Gateway Runtime
//!
//! Entry point for the transaction notification gateway.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging from `GW_*` environment variables
//! 2. Load and validate gateway configuration
//! 3. Create the event bus and data store
//! 4. Start the gateway service (attaches to the feed, binds the listener)
//! 5. Wait for Ctrl+C, then shut down gracefully
//!
//! The in-process event bus and in-memory store stand in for the indexer's
//! database. A deployment embedding the gateway passes its own `TxStore`
//! and `EventFeed` implementations to `GatewayService::new`.

use std::sync::Arc;

use anyhow::{Context, Result};
use gateway_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;
use tx_event_bus::InMemoryEventBus;
use ws_rpc_gateway::{GatewayConfig, GatewayService, InMemoryTxStore};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("failed to initialize logging")?;

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    info!(
        version = ws_rpc_gateway::VERSION,
        bind = %config.bind_addr(),
        path = %config.websocket.path,
        "Starting notification gateway"
    );

    let feed = Arc::new(InMemoryEventBus::new());
    let store = Arc::new(InMemoryTxStore::new());
    let mut service = GatewayService::new(config, store, feed)?;
    let addr = service.start().await?;

    info!(addr = %addr, "Gateway is running. Press Ctrl+C to stop.");
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("Shutdown requested");
        }
        result = service.wait() => {
            result.context("gateway server exited")?;
        }
    }

    service.shutdown().await?;
    Ok(())
}
