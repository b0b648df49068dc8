//! Wire-level behavior: malformed input, batches and connection limits.

use super::harness::*;
use serde_json::{json, Value};
use ws_rpc_gateway::domain::error::codes;
use ws_rpc_gateway::GatewayConfig;

#[tokio::test]
async fn test_malformed_json_gets_parse_error() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let reply = client.request("{not json").await;
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(error_code(&reply), codes::PARSE_ERROR as i64);

    // Exactly one reply
    client.assert_silent().await;
}

#[tokio::test]
async fn test_unknown_method_echoes_id() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let reply = client
        .request(r#"{"jsonrpc":"2.0","id":"abc","method":"get_block","params":{}}"#)
        .await;
    assert_eq!(reply["id"], "abc");
    assert_eq!(error_code(&reply), codes::METHOD_NOT_FOUND as i64);
}

#[tokio::test]
async fn test_invalid_params_echo_id() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let reply = client.request(&subscribe_tx(9, "0xZZ")).await;
    assert_eq!(reply["id"], 9);
    assert_eq!(error_code(&reply), codes::INVALID_PARAMS as i64);
    assert_eq!(reply["error"]["data"], "invalid tx_id");

    let reply = client
        .request(r#"{"jsonrpc":"2.0","id":10,"method":"subscribe","params":{"event":"block"}}"#)
        .await;
    assert_eq!(reply["id"], 10);
    assert_eq!(error_code(&reply), codes::INVALID_PARAMS as i64);
    assert_eq!(gw.service.registry().topic_count(), 0);
}

#[tokio::test]
async fn test_batch_replies_in_order() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let batch = format!(
        "[{},{}]",
        subscribe_tx(1, "aa11"),
        subscribe_address(2, "address_balance_update", "SP1")
    );
    let reply = client.request(&batch).await;

    let replies = reply.as_array().unwrap();
    assert_eq!(replies.len(), 2);
    assert_success(&replies[0], 1);
    assert_success(&replies[1], 2);
    assert_eq!(gw.service.registry().topic_count(), 2);
}

#[tokio::test]
async fn test_batch_mixes_results_and_errors() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let batch = format!(
        r#"[{},{{"jsonrpc":"2.0","id":2,"method":"nope"}},42]"#,
        subscribe_tx(1, "aa11")
    );
    let reply = client.request(&batch).await;

    let replies = reply.as_array().unwrap();
    assert_eq!(replies.len(), 3);
    assert_success(&replies[0], 1);
    assert_eq!(error_code(&replies[1]), codes::METHOD_NOT_FOUND as i64);
    assert_eq!(replies[2]["id"], Value::Null);
    assert_eq!(error_code(&replies[2]), codes::INVALID_REQUEST as i64);
}

#[tokio::test]
async fn test_all_notification_batch_gets_empty_array() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let notification = r#"{"jsonrpc":"2.0","method":"subscribe","params":{"event":"tx_update","tx_id":"aa11"}}"#;
    let reply = client.request(&format!("[{notification}]")).await;
    assert_eq!(reply, json!([]));
}

#[tokio::test]
async fn test_all_notification_batch_silent_when_disabled() {
    let mut config = GatewayConfig::default();
    config.batch.reply_to_empty_batch = false;
    let gw = TestGateway::start_with(config).await;
    let mut client = gw.connect().await;

    let notification = r#"{"jsonrpc":"2.0","method":"subscribe","params":{"event":"tx_update","tx_id":"aa11"}}"#;
    client.send(&format!("[{notification}]")).await;
    client.assert_silent().await;
}

#[tokio::test]
async fn test_empty_batch_is_invalid_request() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let reply = client.request("[]").await;
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(error_code(&reply), codes::INVALID_REQUEST as i64);
}

#[tokio::test]
async fn test_client_response_objects_rejected() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    let reply = client
        .request(r#"{"jsonrpc":"2.0","id":5,"result":true}"#)
        .await;
    assert_eq!(reply["id"], 5);
    assert_eq!(error_code(&reply), codes::INVALID_REQUEST as i64);
    assert_eq!(reply["error"]["data"], "unexpected success msg from client");
}

#[tokio::test]
async fn test_binary_frame_gets_parse_error() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    client.send_binary(vec![1, 2, 3]).await;
    let reply = client.recv().await;
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(error_code(&reply), codes::PARSE_ERROR as i64);
}

#[tokio::test]
async fn test_oversize_message_rejected() {
    let mut config = GatewayConfig::default();
    config.websocket.max_message_size = 64;
    let gw = TestGateway::start_with(config).await;
    let mut client = gw.connect().await;

    let reply = client.request(&subscribe_tx(1, &"ab".repeat(64))).await;
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(error_code(&reply), codes::INVALID_REQUEST as i64);
    assert_eq!(gw.service.registry().topic_count(), 0);
}

#[tokio::test]
async fn test_rate_limit_rejects_excess() {
    let mut config = GatewayConfig::default();
    config.websocket.rate_limit = 2;
    let gw = TestGateway::start_with(config).await;
    let mut client = gw.connect().await;

    assert_success(&client.request(&subscribe_tx(1, "aa11")).await, 1);
    assert_success(&client.request(&subscribe_tx(2, "bb22")).await, 2);

    let reply = client.request(&subscribe_tx(3, "cc33")).await;
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(error_code(&reply), codes::LIMIT_EXCEEDED as i64);
    assert_eq!(gw.service.registry().topic_count(), 2);
}
