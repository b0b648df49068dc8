//! Gateway service - owns the registry, router, fan-out and HTTP server.
//!
//! Serves the WebSocket endpoint plus `/health`, `/metrics` and
//! `/metrics/prometheus` from one listener.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::GatewayMetrics;
use crate::ports::outbound::TxStore;
use crate::ws::{
    ClientRegistry, ConnectionContext, NotificationFanout, RequestRouter, WebSocketHandler,
};
use axum::{extract::ws::WebSocketUpgrade, routing::get, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tx_event_bus::EventFeed;

/// Tasks spawned by [`GatewayService::start`].
struct RunningTasks {
    server: JoinHandle<std::io::Result<()>>,
    fanout: JoinHandle<()>,
}

/// Notification gateway service
pub struct GatewayService {
    config: GatewayConfig,
    registry: Arc<ClientRegistry>,
    router: Arc<RequestRouter>,
    fanout: Arc<NotificationFanout>,
    feed: Arc<dyn EventFeed>,
    metrics: Arc<GatewayMetrics>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Option<RunningTasks>,
}

impl GatewayService {
    /// Create a new gateway service over a data store and its event feed.
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn TxStore>,
        feed: Arc<dyn EventFeed>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let registry = Arc::new(ClientRegistry::new());
        let metrics = Arc::new(GatewayMetrics::new());
        let router = Arc::new(RequestRouter::new(
            Arc::clone(&registry),
            config.batch.clone(),
            Arc::clone(&metrics),
        ));
        let fanout = Arc::new(NotificationFanout::new(
            Arc::clone(&registry),
            store,
            Arc::clone(&metrics),
        ));
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            registry,
            router,
            fanout,
            feed,
            metrics,
            shutdown_tx,
            tasks: None,
        })
    }

    /// Bind the listener, attach to the event feed and start serving.
    ///
    /// Returns the bound address (useful with port 0).
    pub async fn start(&mut self) -> Result<SocketAddr, GatewayError> {
        if self.tasks.is_some() {
            return Err(GatewayError::AlreadyRunning);
        }

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr())
            .await
            .map_err(GatewayError::Bind)?;
        let addr = listener.local_addr().map_err(GatewayError::Bind)?;

        // Attach before accepting connections so no event is missed.
        let events = self.feed.subscribe(NotificationFanout::event_filter());
        let fanout = Arc::clone(&self.fanout).spawn(events, self.shutdown_tx.subscribe());

        let app = self.build_router();
        let mut stop = self.shutdown_tx.subscribe();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.wait_for(|stopped| *stopped).await;
                })
                .await
        });

        info!(addr = %addr, path = %self.config.websocket.path, "Gateway started");
        self.tasks = Some(RunningTasks { server, fanout });
        Ok(addr)
    }

    /// Stop accepting connections, close open sockets and detach from the
    /// event feed. Waits for the server and dispatcher to finish.
    pub async fn shutdown(&mut self) -> Result<(), GatewayError> {
        let _ = self.shutdown_tx.send(true);
        let Some(tasks) = self.tasks.take() else {
            return Ok(());
        };

        if let Err(e) = tasks.fanout.await {
            error!(error = %e, "Fan-out task failed");
        }
        let result = match tasks.server.await {
            Ok(result) => result.map_err(GatewayError::Server),
            Err(e) => Err(GatewayError::Server(std::io::Error::other(e))),
        };

        info!("Gateway stopped");
        result
    }

    /// Wait until the HTTP server exits on its own (it only does on error),
    /// then stop the dispatcher.
    pub async fn wait(&mut self) -> Result<(), GatewayError> {
        let Some(tasks) = self.tasks.as_mut() else {
            return Ok(());
        };
        let result = match (&mut tasks.server).await {
            Ok(result) => result.map_err(GatewayError::Server),
            Err(e) => Err(GatewayError::Server(std::io::Error::other(e))),
        };

        let _ = self.shutdown_tx.send(true);
        if let Some(tasks) = self.tasks.take() {
            if let Err(e) = tasks.fanout.await {
                error!(error = %e, "Fan-out task failed");
            }
        }
        result
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Get the subscription registry
    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router: WebSocket endpoint plus health and metrics.
    pub fn build_router(&self) -> Router {
        let ctx = ConnectionContext {
            router: Arc::clone(&self.router),
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
            config: self.config.websocket.clone(),
            shutdown: self.shutdown_tx.subscribe(),
        };
        let json_metrics = Arc::clone(&self.metrics);
        let prometheus_metrics = Arc::clone(&self.metrics);

        Router::new()
            .route(
                &self.config.websocket.path,
                get(move |ws: WebSocketUpgrade| {
                    let ctx = ctx.clone();
                    async move {
                        ws.on_upgrade(move |socket| WebSocketHandler::new(ctx).handle(socket))
                    }
                }),
            )
            .route("/health", get(health_check))
            .route(
                "/metrics",
                get(move || {
                    let metrics = Arc::clone(&json_metrics);
                    async move { Json(metrics.to_json()) }
                }),
            )
            .route(
                "/metrics/prometheus",
                get(move || {
                    let metrics = Arc::clone(&prometheus_metrics);
                    async move { metrics.to_prometheus() }
                }),
            )
            .layer(TraceLayer::new_for_http())
    }
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
