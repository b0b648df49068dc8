//! Health and metrics endpoints.

use super::harness::*;
use serde_json::Value;
use tx_event_bus::DataStoreEvent;
use ws_rpc_gateway::TxStatus;

#[tokio::test]
async fn test_health() {
    let gw = TestGateway::start().await;

    let body: Value = reqwest::get(gw.http_url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_track_traffic() {
    let gw = TestGateway::start().await;
    gw.store.upsert_tx("aa11", TxStatus::Success);
    let mut client = gw.connect().await;

    assert_success(&client.request(&subscribe_tx(1, "aa11")).await, 1);
    client.request("{oops").await;
    gw.publish(DataStoreEvent::tx_update("aa11")).await;
    client.recv().await;

    let body: Value = reqwest::get(gw.http_url("/metrics"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["requests"]["success"], 1);
    assert_eq!(body["requests"]["error"], 1);
    assert_eq!(body["subscriptions"]["subscribe"], 1);
    assert_eq!(body["websocket"]["connections"], 1);
    assert_eq!(body["notifications"]["sent"], 1);
}

#[tokio::test]
async fn test_prometheus_text() {
    let gw = TestGateway::start().await;

    let response = reqwest::get(gw.http_url("/metrics/prometheus"))
        .await
        .unwrap();
    assert!(response.status().is_success());
    let text = response.text().await.unwrap();
    assert!(text.contains("ws_gateway_websocket_connections"));
}
