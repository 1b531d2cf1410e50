//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use eos_tx_pipeline::blockchain::{
    ActionArgs, ChainRpc, PackedTransaction, PublicKey, ResponseEnvelope, UnsignedTransaction,
};

pub const PRIVATE_KEY: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";
pub const PUBLIC_KEY: &str = "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV";
pub const OTHER_PRIVATE_KEY: &str = "5HwoXVkHoRM8sL2KmNRS217n1g8mPPBomrY7yehCuXC1115WWsh";
pub const OTHER_PUBLIC_KEY: &str = "EOS7S7oY6Jrjzq8txrPmBwUhUmKzpN64835E7ura1HDDAVUu3pzSs";

pub const HEAD_BLOCK_ID: &str =
    "0000000a11111111deadbeef2222222233333333444444445555555566666666";
pub const HEAD_BLOCK_TIME: &str = "2023-01-01T00:00:00";
pub const BINARGS: &str = "0000000000000e3d000000000000a6820100000000000000";

pub fn chain_id() -> String {
    "ab".repeat(32)
}

pub fn chain_info_body() -> String {
    serde_json::json!({
        "server_version": "d1bc8d3",
        "chain_id": chain_id(),
        "head_block_num": 10,
        "head_block_id": HEAD_BLOCK_ID,
        "head_block_time": HEAD_BLOCK_TIME,
    })
    .to_string()
}

pub fn binargs_body() -> String {
    serde_json::json!({ "binargs": BINARGS }).to_string()
}

pub fn required_keys_body(keys: &[&str]) -> String {
    serde_json::json!({ "required_keys": keys }).to_string()
}

pub fn push_body() -> String {
    serde_json::json!({
        "transaction_id": "4c2f2b8ab9b9a3e2b5ea9bbbdc6b2aeb17bb0d4c46d3ac3ae1e1cbe2db01f9a6",
        "processed": { "receipt": { "status": "executed" } },
    })
    .to_string()
}

pub fn transfer_args() -> ActionArgs {
    match serde_json::json!({
        "from": "a",
        "to": "b",
        "quantity": "0.0001 SYS",
        "memo": "",
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// In-process node with one canned envelope per RPC, counting every call
/// and capturing what the pipeline sent.
pub struct ScriptedRpc {
    pub info: ResponseEnvelope,
    pub bin: ResponseEnvelope,
    pub required: ResponseEnvelope,
    pub push: ResponseEnvelope,
    pub info_calls: AtomicUsize,
    pub bin_calls: AtomicUsize,
    pub required_calls: AtomicUsize,
    pub push_calls: AtomicUsize,
    pub seen_unsigned: Mutex<Vec<UnsignedTransaction>>,
    pub seen_candidates: Mutex<Vec<Vec<PublicKey>>>,
    pub pushed: Mutex<Vec<PackedTransaction>>,
    pub delay: Duration,
}

impl ScriptedRpc {
    /// A node that accepts everything and requires `PUBLIC_KEY`.
    pub fn healthy() -> Self {
        Self {
            info: ResponseEnvelope::success(chain_info_body()),
            bin: ResponseEnvelope::success(binargs_body()),
            required: ResponseEnvelope::success(required_keys_body(&[PUBLIC_KEY])),
            push: ResponseEnvelope::success(push_body()),
            info_calls: AtomicUsize::new(0),
            bin_calls: AtomicUsize::new(0),
            required_calls: AtomicUsize::new(0),
            push_calls: AtomicUsize::new(0),
            seen_unsigned: Mutex::new(Vec::new()),
            seen_candidates: Mutex::new(Vec::new()),
            pushed: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn calls(&self) -> [usize; 4] {
        [
            self.info_calls.load(Ordering::SeqCst),
            self.bin_calls.load(Ordering::SeqCst),
            self.required_calls.load(Ordering::SeqCst),
            self.push_calls.load(Ordering::SeqCst),
        ]
    }

    pub fn unsigned(&self) -> Option<UnsignedTransaction> {
        self.seen_unsigned.lock().unwrap().last().cloned()
    }

    pub fn candidates(&self) -> Option<Vec<PublicKey>> {
        self.seen_candidates.lock().unwrap().last().cloned()
    }

    pub fn packed(&self) -> Option<PackedTransaction> {
        self.pushed.lock().unwrap().last().cloned()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl ChainRpc for ScriptedRpc {
    async fn get_info(&self) -> ResponseEnvelope {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.info.clone()
    }

    async fn abi_json_to_bin(
        &self,
        _code: &str,
        _action: &str,
        _args: &ActionArgs,
    ) -> ResponseEnvelope {
        self.bin_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.bin.clone()
    }

    async fn get_required_keys(
        &self,
        transaction: &UnsignedTransaction,
        available_keys: &[PublicKey],
    ) -> ResponseEnvelope {
        self.required_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_unsigned.lock().unwrap().push(transaction.clone());
        self.seen_candidates.lock().unwrap().push(available_keys.to_vec());
        self.pause().await;
        self.required.clone()
    }

    async fn push_transaction(&self, packed: &PackedTransaction) -> ResponseEnvelope {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        self.pushed.lock().unwrap().push(packed.clone());
        self.pause().await;
        self.push.clone()
    }
}

/// One request as seen by the mock node.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: String,
}

/// Start a programmable mock node on an ephemeral port. `f` receives the
/// request path and body and returns the status and body to answer with.
pub async fn start_programmable_node<F, Fut>(f: F) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let log = recorded.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let Some((path, body)) = read_request(&mut socket).await else {
                            return;
                        };
                        log.lock().unwrap().push(RecordedRequest {
                            path: path.clone(),
                            body: body.clone(),
                        });

                        let (status, body) = f(path, body).await;
                        let status_text = match status {
                            200 => "200 OK",
                            202 => "202 Accepted",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

/// A mock node that routes the pipeline's four endpoints to canned bodies.
pub async fn start_mock_node(
    required_keys: &'static [&'static str],
    push_status: u16,
) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>) {
    start_programmable_node(move |path, _body| async move {
        match path.as_str() {
            "/v1/chain/get_info" => (200, chain_info_body()),
            "/v1/chain/abi_json_to_bin" => (200, binargs_body()),
            "/v1/chain/get_required_keys" => (200, required_keys_body(required_keys)),
            "/v1/chain/push_transaction" if push_status == 200 => (202, push_body()),
            "/v1/chain/push_transaction" => (
                push_status,
                r#"{"code":500,"message":"Internal Service Error","error":{"name":"tx_net_usage_exceeded"}}"#
                    .to_string(),
            ),
            _ => (404, r#"{"code":404,"message":"Not Found"}"#.to_string()),
        }
    })
    .await
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head.split_whitespace().nth(1)?.to_string();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..end]).to_string();
    Some((path, body))
}
