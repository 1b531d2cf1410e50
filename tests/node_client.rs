//! `NodeClient` against a mock HTTP node.

use std::net::SocketAddr;
use std::time::Duration;

use eos_tx_pipeline::blockchain::{ChainRpc, NodeClient, TableRowsRequest};
use eos_tx_pipeline::config::{NodeConfig, TransactionConfig};
use eos_tx_pipeline::TransactionPipeline;

mod common;
use common::*;

fn client(addr: SocketAddr, timeout_secs: u64) -> NodeClient {
    NodeClient::new(NodeConfig {
        url: format!("http://{}/", addr),
        timeout_secs,
    })
    .unwrap()
    .with_metrics(false)
}

fn body_json(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn test_get_info_success_envelope() {
    let (addr, recorded) = start_mock_node(&[PUBLIC_KEY], 200).await;

    let envelope = client(addr, 5).get_info().await;

    assert!(envelope.success);
    assert_eq!(envelope.payload.as_deref(), Some(chain_info_body().as_str()));
    assert_eq!(envelope.raw, chain_info_body());

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].path, "/v1/chain/get_info");
}

#[tokio::test]
async fn test_error_status_keeps_raw_body() {
    let (addr, _) = start_programmable_node(|_, _| async {
        (500, r#"{"code":500,"message":"Internal Service Error"}"#.to_string())
    })
    .await;

    let envelope = client(addr, 5).get_info().await;

    assert!(!envelope.success);
    assert!(envelope.payload.is_none());
    assert_eq!(envelope.raw, r#"{"code":500,"message":"Internal Service Error"}"#);
}

#[tokio::test]
async fn test_timeout_yields_transport_failure() {
    let (addr, _) = start_programmable_node(|_, _| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, chain_info_body())
    })
    .await;

    let envelope = client(addr, 1).get_info().await;

    assert!(!envelope.success);
    assert_eq!(body_json(&envelope.raw)["error"]["kind"], "transport");
}

#[tokio::test]
async fn test_push_through_http_node() {
    let (addr, recorded) = start_mock_node(&[PUBLIC_KEY], 200).await;
    let pipeline = TransactionPipeline::new(client(addr, 5), &TransactionConfig::default());

    let result = pipeline
        .push_transaction("eosio.token", "transfer", "a", PRIVATE_KEY, &transfer_args())
        .await;

    assert!(result.success, "unexpected failure: {}", result.raw);
    assert_eq!(result.raw, push_body());

    let recorded = recorded.lock().unwrap().clone();
    let paths: Vec<&str> = recorded.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/v1/chain/get_info",
            "/v1/chain/abi_json_to_bin",
            "/v1/chain/get_required_keys",
            "/v1/chain/push_transaction",
        ]
    );

    let encode = body_json(&recorded[1].body);
    assert_eq!(encode["code"], "eosio.token");
    assert_eq!(encode["action"], "transfer");
    assert_eq!(encode["args"]["quantity"], "0.0001 SYS");

    let negotiate = body_json(&recorded[2].body);
    assert_eq!(negotiate["available_keys"], serde_json::json!([PUBLIC_KEY]));
    let trx = &negotiate["transaction"];
    assert_eq!(trx["expiration"], "2023-01-01T00:00:30");
    assert_eq!(trx["ref_block_num"], 10);
    assert_eq!(trx["ref_block_prefix"], 4022250974u32);
    assert_eq!(trx["actions"][0]["account"], "eosio.token");
    assert_eq!(trx["actions"][0]["name"], "transfer");
    assert_eq!(trx["actions"][0]["data"], BINARGS);
    assert_eq!(trx["actions"][0]["authorization"][0]["actor"], "a");
    assert_eq!(trx["actions"][0]["authorization"][0]["permission"], "active");

    let broadcast = body_json(&recorded[3].body);
    assert_eq!(broadcast["compression"], "none");
    assert_eq!(broadcast["packed_context_free_data"], "");
    assert_eq!(broadcast["signatures"].as_array().unwrap().len(), 1);
    assert!(broadcast["packed_trx"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn test_rejected_broadcast_through_http_node() {
    let (addr, recorded) = start_mock_node(&[PUBLIC_KEY], 500).await;
    let pipeline = TransactionPipeline::new(client(addr, 5), &TransactionConfig::default());

    let result = pipeline
        .push_transaction("eosio.token", "transfer", "a", PRIVATE_KEY, &transfer_args())
        .await;

    assert!(!result.success);
    assert!(result.payload.is_none());
    assert!(result.raw.contains("tx_net_usage_exceeded"));
    assert_eq!(recorded.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_table_rows_request_body() {
    let (addr, recorded) =
        start_programmable_node(|_, _| async { (200, r#"{"rows":[]}"#.to_string()) }).await;

    let request = TableRowsRequest::new("a", "eosio.token", "accounts")
        .limit(5)
        .lower_bound("SYS");
    let envelope = client(addr, 5).get_table_rows(&request).await;
    assert!(envelope.success);

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded[0].path, "/v1/chain/get_table_rows");
    let body = body_json(&recorded[0].body);
    assert_eq!(body["scope"], "a");
    assert_eq!(body["json"], true);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["lower_bound"], "SYS");
    assert!(body.get("upper_bound").is_none());
}

#[tokio::test]
async fn test_key_accounts_sends_public_key() {
    let (addr, recorded) =
        start_programmable_node(|_, _| async { (200, r#"{"account_names":[]}"#.to_string()) })
            .await;

    let envelope = client(addr, 5).get_key_accounts(PRIVATE_KEY).await;
    assert!(envelope.success);

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded[0].path, "/v1/history/get_key_accounts");
    assert_eq!(body_json(&recorded[0].body)["public_key"], PUBLIC_KEY);
}

#[tokio::test]
async fn test_actions_default_window() {
    let (addr, recorded) =
        start_programmable_node(|_, _| async { (200, r#"{"actions":[]}"#.to_string()) }).await;

    client(addr, 5).get_actions("a").await;

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded[0].path, "/v1/history/get_actions");
    let body = body_json(&recorded[0].body);
    assert_eq!(body["account_name"], "a");
    assert_eq!(body["pos"], -1);
    assert_eq!(body["offset"], -20);
}
