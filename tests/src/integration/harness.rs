//! Test fixtures: a gateway bound to 127.0.0.1:0 and a thin WebSocket client.

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tx_event_bus::{DataStoreEvent, EventPublisher, InMemoryEventBus};
use ws_rpc_gateway::{GatewayConfig, GatewayService, InMemoryTxStore};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

pub struct TestGateway {
    pub service: GatewayService,
    pub bus: Arc<InMemoryEventBus>,
    pub store: Arc<InMemoryTxStore>,
    pub addr: SocketAddr,
}

impl TestGateway {
    pub async fn start() -> Self {
        Self::start_with(GatewayConfig::default()).await
    }

    pub async fn start_with(mut config: GatewayConfig) -> Self {
        config.websocket.host = "127.0.0.1".parse().unwrap();
        config.websocket.port = 0;

        let bus = Arc::new(InMemoryEventBus::new());
        let store = Arc::new(InMemoryTxStore::new());
        let mut service = GatewayService::new(config, store.clone(), bus.clone()).unwrap();
        let addr = service.start().await.unwrap();

        Self {
            service,
            bus,
            store,
            addr,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, self.service.config().websocket.path)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn connect(&self) -> TestClient {
        let (ws, _) = connect_async(self.ws_url()).await.unwrap();
        TestClient { ws }
    }

    pub async fn publish(&self, event: DataStoreEvent) {
        self.bus.publish(event).await;
    }

    /// Poll until the registry holds `expected` clients.
    pub async fn wait_for_clients(&self, expected: usize) {
        let registry = self.service.registry();
        timeout(RECV_TIMEOUT, async {
            while registry.client_count() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "registry still has {} clients, expected {}",
                registry.client_count(),
                expected
            )
        });
    }
}

pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn send(&mut self, text: &str) {
        self.ws.send(Message::text(text)).await.unwrap();
    }

    pub async fn send_binary(&mut self, data: Vec<u8>) {
        self.ws.send(Message::binary(data)).await.unwrap();
    }

    /// Next text frame, raw.
    pub async fn recv_text(&mut self) -> String {
        timeout(RECV_TIMEOUT, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
                    Some(Ok(_)) => continue,
                    other => panic!("connection ended while waiting for text: {other:?}"),
                }
            }
        })
        .await
        .expect("timed out waiting for a message")
    }

    pub async fn recv(&mut self) -> Value {
        serde_json::from_str(&self.recv_text().await).unwrap()
    }

    pub async fn request(&mut self, text: &str) -> Value {
        self.send(text).await;
        self.recv().await
    }

    /// Assert no text frame arrives within a short window.
    pub async fn assert_silent(&mut self) {
        let next = timeout(SILENCE_WINDOW, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Text(text))) => return Some(text.as_str().to_owned()),
                    Some(Ok(_)) => continue,
                    _ => return None,
                }
            }
        })
        .await;
        if let Ok(Some(text)) = next {
            panic!("expected silence, got {text}");
        }
    }

    /// Wait for the server to end the connection.
    pub async fn expect_closed(&mut self) {
        timeout(RECV_TIMEOUT, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => continue,
                }
            }
        })
        .await
        .expect("server did not close the connection");
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

pub fn subscribe_tx(id: u64, tx_id: &str) -> String {
    rpc(id, "subscribe", "tx_update", "tx_id", tx_id)
}

pub fn unsubscribe_tx(id: u64, tx_id: &str) -> String {
    rpc(id, "unsubscribe", "tx_update", "tx_id", tx_id)
}

pub fn subscribe_address(id: u64, event: &str, address: &str) -> String {
    rpc(id, "subscribe", event, "address", address)
}

fn rpc(id: u64, method: &str, event: &str, key: &str, value: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": { "event": event, key: value },
    })
    .to_string()
}

pub fn assert_success(reply: &Value, id: u64) {
    assert_eq!(reply["jsonrpc"], "2.0");
    assert_eq!(reply["id"], id);
    assert_eq!(reply["result"], true, "unexpected reply: {reply}");
}

pub fn error_code(reply: &Value) -> i64 {
    reply["error"]["code"]
        .as_i64()
        .unwrap_or_else(|| panic!("not an error reply: {reply}"))
}
