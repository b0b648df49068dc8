//! WebSocket connection handler.
//!
//! One reader loop and one writer task per connection:
//! - the reader feeds messages through the router one at a time
//! - the writer drains the bounded outbound queue shared by replies and pushes
//! - message size and per-second rate limits apply before routing
//! - registry cleanup runs exactly once, from a drop guard

use crate::domain::client_id::ClientId;
use crate::domain::config::WebSocketConfig;
use crate::domain::error::ApiError;
use crate::middleware::GatewayMetrics;
use crate::protocol::JsonRpcResponse;
use crate::ws::client::{ClientHandle, WsClient};
use crate::ws::router::{ClientRegistry, RequestRouter};
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Shared state every connection needs.
#[derive(Clone)]
pub struct ConnectionContext {
    pub router: Arc<RequestRouter>,
    pub registry: Arc<ClientRegistry>,
    pub metrics: Arc<GatewayMetrics>,
    pub config: WebSocketConfig,
    /// Flips to `true` when the service stops
    pub shutdown: watch::Receiver<bool>,
}

/// Purges the client from the registry when the connection ends, however
/// it ends.
struct ConnectionGuard {
    client_id: ClientId,
    registry: Arc<ClientRegistry>,
    metrics: Arc<GatewayMetrics>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let topics = self.registry.remove_all(self.client_id);
        self.metrics.record_ws_disconnect();
        info!(
            client = %self.client_id,
            topics,
            "WebSocket connection closed"
        );
    }
}

/// WebSocket connection handler
pub struct WebSocketHandler {
    ctx: ConnectionContext,
    /// Message counter for rate limiting
    message_count: u32,
    /// Rate limit window start
    rate_limit_window: Instant,
}

impl WebSocketHandler {
    pub fn new(ctx: ConnectionContext) -> Self {
        Self {
            ctx,
            message_count: 0,
            rate_limit_window: Instant::now(),
        }
    }

    /// Check rate limit, returns true if the message is allowed
    fn check_rate_limit(&mut self) -> bool {
        let now = Instant::now();

        // Reset window every second
        if now.duration_since(self.rate_limit_window) >= Duration::from_secs(1) {
            self.rate_limit_window = now;
            self.message_count = 0;
        }

        self.message_count = self.message_count.saturating_add(1);
        self.message_count <= self.ctx.config.rate_limit
    }

    /// Size and rate checks shared by every frame kind.
    fn check_limits(&mut self, client_id: ClientId, size: usize) -> Option<String> {
        if size > self.ctx.config.max_message_size {
            warn!(
                client = %client_id,
                size,
                max = self.ctx.config.max_message_size,
                "Message exceeds size limit"
            );
            self.ctx.metrics.record_oversize_rejection();
            let err = ApiError::invalid_request(format!(
                "Message too large: {} bytes (max: {})",
                size, self.ctx.config.max_message_size
            ));
            return Some(self.reject(err));
        }

        if !self.check_rate_limit() {
            debug!(client = %client_id, "Message rate limited");
            self.ctx.metrics.record_rate_limit_rejection();
            return Some(self.reject(ApiError::limit_exceeded("rate limit")));
        }

        None
    }

    fn reject(&self, err: ApiError) -> String {
        self.ctx.metrics.record_request(false);
        JsonRpcResponse::error(None, err).to_text()
    }

    /// Process one text frame, returning the reply if any.
    pub fn on_text(&mut self, client: &Arc<dyn ClientHandle>, text: &str) -> Option<String> {
        if let Some(rejection) = self.check_limits(client.id(), text.len()) {
            return Some(rejection);
        }
        self.ctx.router.handle_text(client, text)
    }

    /// Process one binary frame. Always answered with a parse error.
    pub fn on_binary(&mut self, client: &Arc<dyn ClientHandle>, size: usize) -> String {
        if let Some(rejection) = self.check_limits(client.id(), size) {
            return rejection;
        }
        self.ctx.router.reject_binary()
    }

    /// Handle a WebSocket connection
    pub async fn handle(mut self, socket: WebSocket) {
        let (ws_client, mut outbound) = WsClient::channel(self.ctx.config.send_queue_size);
        let client_id = ws_client.id();
        let client: Arc<dyn ClientHandle> = Arc::new(ws_client.clone());

        self.ctx.metrics.record_ws_connect();
        let guard = ConnectionGuard {
            client_id,
            registry: Arc::clone(&self.ctx.registry),
            metrics: Arc::clone(&self.ctx.metrics),
        };
        info!(client = %client_id, "New WebSocket connection");

        let (mut sink, mut stream) = socket.split();

        let writer = tokio::spawn(async move {
            while let Some(text) = outbound.recv().await {
                if let Err(e) = sink.send(Message::Text(text.to_string())).await {
                    debug!(client = %client_id, error = %e, "WebSocket write failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let mut shutdown = self.ctx.shutdown.clone();
        loop {
            if *shutdown.borrow_and_update() {
                debug!(client = %client_id, "Closing connection for shutdown");
                break;
            }
            let result = tokio::select! {
                changed = shutdown.changed() => match changed {
                    Ok(()) => continue,
                    Err(_) => break,
                },
                next = stream.next() => match next {
                    Some(result) => result,
                    None => break,
                },
            };

            let reply = match result {
                Ok(Message::Text(text)) => self.on_text(&client, &text),
                Ok(Message::Binary(data)) => Some(self.on_binary(&client, data.len())),
                // Pings are answered by the transport
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
                Ok(Message::Close(_)) => {
                    debug!(client = %client_id, "WebSocket close received");
                    break;
                }
                Err(e) => {
                    warn!(client = %client_id, error = %e, "WebSocket error");
                    break;
                }
            };

            if let Some(reply) = reply {
                // Replies wait for queue space; pushes never do.
                if ws_client.reply(reply.into()).await.is_err() {
                    break;
                }
            }
        }

        // Dropping the last senders lets the writer flush and exit; pushes
        // racing with shutdown are discarded by the closed queue.
        drop(client);
        drop(ws_client);
        drop(guard);
        if let Err(e) = writer.await {
            debug!(client = %client_id, error = %e, "Writer task ended abnormally");
        }
    }
}
