//! Subscribe → event → push flows over a real socket.

use super::harness::*;
use serde_json::json;
use tx_event_bus::DataStoreEvent;
use ws_rpc_gateway::TxStatus;

const ADDRESS: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

#[tokio::test]
async fn test_tx_update_push() {
    let gw = TestGateway::start().await;
    gw.store.upsert_tx("aa11", TxStatus::Success);
    let mut client = gw.connect().await;

    let reply = client.request(&subscribe_tx(1, "0xAA11")).await;
    assert_success(&reply, 1);

    gw.publish(DataStoreEvent::tx_update("aa11")).await;

    let push = client.recv().await;
    assert_eq!(
        push,
        json!({
            "jsonrpc": "2.0",
            "method": "tx_update",
            "params": { "tx_id": "aa11", "tx_status": "success" },
        })
    );
}

#[tokio::test]
async fn test_unsubscribe_before_event_delivers_nothing() {
    let gw = TestGateway::start().await;
    gw.store.upsert_tx("aa11", TxStatus::Pending);
    let mut client = gw.connect().await;

    assert_success(&client.request(&subscribe_tx(1, "aa11")).await, 1);
    assert_success(&client.request(&unsubscribe_tx(2, "0xaa11")).await, 2);
    assert_eq!(gw.service.registry().topic_count(), 0);

    gw.publish(DataStoreEvent::tx_update("aa11")).await;
    client.assert_silent().await;
}

#[tokio::test]
async fn test_two_clients_receive_identical_payloads() {
    let gw = TestGateway::start().await;
    gw.store.upsert_tx("beef", TxStatus::AbortByResponse);
    let mut first = gw.connect().await;
    let mut second = gw.connect().await;

    assert_success(&first.request(&subscribe_tx(1, "beef")).await, 1);
    assert_success(&second.request(&subscribe_tx(7, "beef")).await, 7);

    gw.publish(DataStoreEvent::tx_update("0xBEEF")).await;

    let a = first.recv_text().await;
    let b = second.recv_text().await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_textual_forms_share_one_topic() {
    let gw = TestGateway::start().await;
    gw.store.upsert_tx("aa11", TxStatus::Success);
    let mut upper = gw.connect().await;
    let mut lower = gw.connect().await;

    assert_success(&upper.request(&subscribe_tx(1, "0xAA11")).await, 1);
    assert_success(&lower.request(&subscribe_tx(1, "aa11")).await, 1);

    let registry = gw.service.registry();
    assert_eq!(registry.topic_count(), 1);
    assert_eq!(registry.subscription_count(), 2);

    gw.publish(DataStoreEvent::tx_update("AA11")).await;
    assert_eq!(upper.recv().await["params"]["tx_id"], "aa11");
    assert_eq!(lower.recv().await["params"]["tx_id"], "aa11");
}

#[tokio::test]
async fn test_disconnect_removes_only_that_client() {
    let gw = TestGateway::start().await;
    gw.store.upsert_tx("aa11", TxStatus::Success);
    let mut leaving = gw.connect().await;
    let mut staying = gw.connect().await;

    assert_success(&leaving.request(&subscribe_tx(1, "aa11")).await, 1);
    assert_success(
        &leaving
            .request(&subscribe_address(2, "address_tx_update", "SP1"))
            .await,
        2,
    );
    assert_success(&staying.request(&subscribe_tx(1, "aa11")).await, 1);
    gw.wait_for_clients(2).await;

    leaving.close().await;
    gw.wait_for_clients(1).await;

    let registry = gw.service.registry();
    assert_eq!(registry.topic_count(), 1);
    assert_eq!(registry.subscription_count(), 1);

    gw.publish(DataStoreEvent::tx_update("aa11")).await;
    assert_eq!(staying.recv().await["method"], "tx_update");
}

#[tokio::test]
async fn test_address_tx_push() {
    let gw = TestGateway::start().await;
    gw.store.upsert_tx("0xC0FFEE", TxStatus::Success);
    let mut client = gw.connect().await;

    assert_success(
        &client
            .request(&subscribe_address(1, "address_tx_update", ADDRESS))
            .await,
        1,
    );

    gw.publish(DataStoreEvent::AddressTxUpdate {
        address: ADDRESS.to_string(),
        tx_id: "0xc0ffee".to_string(),
    })
    .await;

    let push = client.recv().await;
    assert_eq!(push["method"], "address_tx_update");
    assert_eq!(
        push["params"],
        json!({
            "address": ADDRESS,
            "tx_id": "c0ffee",
            "tx_status": "success",
        })
    );
}

#[tokio::test]
async fn test_address_balance_push() {
    let gw = TestGateway::start().await;
    gw.store.set_balance("SP1", "1000");
    let mut client = gw.connect().await;

    assert_success(
        &client
            .request(&subscribe_address(3, "address_balance_update", "SP1"))
            .await,
        3,
    );

    gw.publish(DataStoreEvent::AddressBalanceUpdate {
        address: "SP1".to_string(),
    })
    .await;

    assert_eq!(
        client.recv().await,
        json!({
            "jsonrpc": "2.0",
            "method": "address_balance_update",
            "params": { "address": "SP1", "balance": "1000" },
        })
    );
}

#[tokio::test]
async fn test_missing_record_sends_nothing() {
    let gw = TestGateway::start().await;
    let mut client = gw.connect().await;

    assert_success(&client.request(&subscribe_tx(1, "dead")).await, 1);
    gw.publish(DataStoreEvent::tx_update("dead")).await;

    client.assert_silent().await;
}

#[tokio::test]
async fn test_shutdown_closes_connections_and_detaches_feed() {
    let mut gw = TestGateway::start().await;
    let mut client = gw.connect().await;
    assert_success(&client.request(&subscribe_tx(1, "aa11")).await, 1);
    assert_eq!(gw.bus.subscriber_count(), 1);

    gw.service.shutdown().await.unwrap();

    client.expect_closed().await;
    assert_eq!(gw.bus.subscriber_count(), 0);
    gw.wait_for_clients(0).await;
}
