//! Client handles.
//!
//! The registry and router only ever see the [`ClientHandle`] trait; the
//! axum socket lives behind [`WsClient`]'s queue.

use crate::domain::client_id::ClientId;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Per-client push failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SendError {
    /// The connection is gone.
    #[error("client connection closed")]
    Closed,
    /// The outbound queue is full; the message was dropped.
    #[error("client send queue full")]
    QueueFull,
}

/// One live connection, as seen by the registry and fan-out.
pub trait ClientHandle: Send + Sync {
    /// Connection identity
    fn id(&self) -> ClientId;

    /// Enqueue a serialized message without waiting.
    fn send(&self, text: Arc<str>) -> Result<(), SendError>;

    /// Whether the connection has gone away.
    fn is_closed(&self) -> bool;
}

/// Handle backed by a bounded queue drained by the connection's writer task.
#[derive(Debug, Clone)]
pub struct WsClient {
    id: ClientId,
    outbound: mpsc::Sender<Arc<str>>,
}

impl WsClient {
    /// Create a handle and the receiving end for the writer task.
    pub fn channel(queue_size: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (outbound, rx) = mpsc::channel(queue_size.max(1));
        (
            Self {
                id: ClientId::new(),
                outbound,
            },
            rx,
        )
    }

    /// Enqueue a reply, waiting for queue space.
    pub async fn reply(&self, text: Arc<str>) -> Result<(), SendError> {
        self.outbound
            .send(text)
            .await
            .map_err(|_| SendError::Closed)
    }
}

impl ClientHandle for WsClient {
    fn id(&self) -> ClientId {
        self.id
    }

    fn send(&self, text: Arc<str>) -> Result<(), SendError> {
        self.outbound.try_send(text).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }

    fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}
