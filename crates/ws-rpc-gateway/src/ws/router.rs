//! Request routing: parsed units in, replies out.
//!
//! The router is synchronous. Every registry mutation for a message is
//! applied before `handle_text` returns, which is what gives each
//! connection its in-order semantics.

use crate::domain::config::BatchConfig;
use crate::domain::error::ApiError;
use crate::domain::topic::{SubscriptionRequest, Topic};
use crate::middleware::GatewayMetrics;
use crate::protocol::{
    batch_to_text, parse, JsonRpcRequest, JsonRpcResponse, ParsedMessage, ParsedUnit,
};
use crate::ws::client::ClientHandle;
use crate::ws::registry::SubscriptionRegistry;
use std::sync::Arc;
use tracing::{debug, trace};

/// Registry of live connections keyed by topic.
pub type ClientRegistry = SubscriptionRegistry<Topic, dyn ClientHandle>;

/// Routes `subscribe` / `unsubscribe` calls into the registry.
pub struct RequestRouter {
    registry: Arc<ClientRegistry>,
    batch: BatchConfig,
    metrics: Arc<GatewayMetrics>,
}

impl RequestRouter {
    pub fn new(
        registry: Arc<ClientRegistry>,
        batch: BatchConfig,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            batch,
            metrics,
        }
    }

    /// Handle one inbound text message.
    ///
    /// Returns the reply to send, or `None` when the message gets no reply
    /// (a lone notification, or an all-notification batch when empty batch
    /// replies are off).
    pub fn handle_text(&self, client: &Arc<dyn ClientHandle>, text: &str) -> Option<String> {
        let message = match parse(text) {
            Ok(message) => message,
            Err(err) => {
                debug!(client = %client.id(), error = %err, "Unparseable message");
                return Some(self.reply(JsonRpcResponse::error(None, err)).to_text());
            }
        };

        match message {
            ParsedMessage::Single(unit) => self
                .handle_unit(client, unit)
                .map(|response| response.to_text()),
            ParsedMessage::Batch(units) => {
                let responses: Vec<JsonRpcResponse> = units
                    .into_iter()
                    .filter_map(|unit| self.handle_unit(client, unit))
                    .collect();
                if responses.is_empty() && !self.batch.reply_to_empty_batch {
                    return None;
                }
                Some(batch_to_text(&responses))
            }
        }
    }

    /// Reply for a non-text frame.
    pub fn reject_binary(&self) -> String {
        let err = ApiError::parse_error("unexpected data type: binary");
        self.reply(JsonRpcResponse::error(None, err)).to_text()
    }

    fn handle_unit(
        &self,
        client: &Arc<dyn ClientHandle>,
        unit: ParsedUnit,
    ) -> Option<JsonRpcResponse> {
        let response = match unit {
            ParsedUnit::Request(request) => self.handle_request(client, request),
            ParsedUnit::Notification { method, .. } => {
                trace!(client = %client.id(), method = %method, "Ignoring client notification");
                return None;
            }
            ParsedUnit::Success { id, .. } => JsonRpcResponse::error(
                id,
                ApiError::invalid_request("unexpected success msg from client"),
            ),
            ParsedUnit::Error { id, .. } => JsonRpcResponse::error(
                id,
                ApiError::invalid_request("unexpected error msg from client"),
            ),
            ParsedUnit::Invalid(err) => JsonRpcResponse::error(None, err),
        };
        Some(self.reply(response))
    }

    fn handle_request(
        &self,
        client: &Arc<dyn ClientHandle>,
        request: JsonRpcRequest,
    ) -> JsonRpcResponse {
        let JsonRpcRequest { id, method, params } = request;

        let subscribe = match method.as_str() {
            "subscribe" => true,
            "unsubscribe" => false,
            other => return JsonRpcResponse::error(Some(id), ApiError::method_not_found(other)),
        };

        let topic = match SubscriptionRequest::from_params(params.as_ref())
            .and_then(SubscriptionRequest::into_topic)
        {
            Ok(topic) => topic,
            Err(err) => return JsonRpcResponse::error(Some(id), err),
        };

        if subscribe {
            self.registry.add(topic, Arc::clone(client));
            self.metrics.record_subscribe();
        } else {
            self.registry.remove(&topic, client.id());
            self.metrics.record_unsubscribe();
        }

        JsonRpcResponse::success(Some(id), serde_json::Value::Bool(true))
    }

    fn reply(&self, response: JsonRpcResponse) -> JsonRpcResponse {
        self.metrics.record_request(!response.is_error());
        response
    }
}
