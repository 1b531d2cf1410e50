//! Chain node RPC client.
//!
//! # Responsibilities
//! - Issue the node calls the pipeline depends on (`ChainRpc`)
//! - Offer the read-only queries a wallet front end needs
//! - Turn every outcome, transport errors included, into a `ResponseEnvelope`
//!
//! One HTTP request per call: no failover and no retries. The timeout comes
//! from `NodeConfig`.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::blockchain::envelope::ResponseEnvelope;
use crate::blockchain::keys::PublicKey;
use crate::blockchain::packer::{PackedTransaction, WireTransaction};
use crate::blockchain::requests::{
    AbiJsonToBinRequest, AccountRequest, ActionsRequest, BlockRequest, CurrencyBalanceRequest,
    KeyAccountsRequest, RequiredKeysRequest, TableRowsRequest, DEFAULT_ACTIONS_OFFSET,
    DEFAULT_ACTIONS_POS,
};
use crate::blockchain::transaction::UnsignedTransaction;
use crate::blockchain::types::{ActionArgs, ChainError, ChainResult, NodeConfig};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

pub mod endpoints {
    pub const GET_INFO: &str = "/v1/chain/get_info";
    pub const GET_BLOCK: &str = "/v1/chain/get_block";
    pub const GET_ACCOUNT: &str = "/v1/chain/get_account";
    pub const GET_TABLE_ROWS: &str = "/v1/chain/get_table_rows";
    pub const GET_CURRENCY_BALANCE: &str = "/v1/chain/get_currency_balance";
    pub const ABI_JSON_TO_BIN: &str = "/v1/chain/abi_json_to_bin";
    pub const GET_REQUIRED_KEYS: &str = "/v1/chain/get_required_keys";
    pub const PUSH_TRANSACTION: &str = "/v1/chain/push_transaction";
    pub const GET_ACTIONS: &str = "/v1/history/get_actions";
    pub const GET_KEY_ACCOUNTS: &str = "/v1/history/get_key_accounts";
}

/// Node calls the transaction pipeline is built on.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Head-state snapshot (`ChainInfo` payload).
    async fn get_info(&self) -> ResponseEnvelope;

    /// ABI-encode action arguments (`BinArgs` payload).
    async fn abi_json_to_bin(
        &self,
        code: &str,
        action: &str,
        args: &ActionArgs,
    ) -> ResponseEnvelope;

    /// Keys among `available_keys` needed to authorize `transaction`
    /// (`RequiredKeys` payload).
    async fn get_required_keys(
        &self,
        transaction: &UnsignedTransaction,
        available_keys: &[PublicKey],
    ) -> ResponseEnvelope;

    /// Broadcast a packed transaction.
    async fn push_transaction(&self, packed: &PackedTransaction) -> ResponseEnvelope;
}

#[async_trait]
impl<T: ChainRpc + ?Sized> ChainRpc for Arc<T> {
    async fn get_info(&self) -> ResponseEnvelope {
        (**self).get_info().await
    }

    async fn abi_json_to_bin(
        &self,
        code: &str,
        action: &str,
        args: &ActionArgs,
    ) -> ResponseEnvelope {
        (**self).abi_json_to_bin(code, action, args).await
    }

    async fn get_required_keys(
        &self,
        transaction: &UnsignedTransaction,
        available_keys: &[PublicKey],
    ) -> ResponseEnvelope {
        (**self).get_required_keys(transaction, available_keys).await
    }

    async fn push_transaction(&self, packed: &PackedTransaction) -> ResponseEnvelope {
        (**self).push_transaction(packed).await
    }
}

/// HTTP client for a single node.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    config: NodeConfig,
    metrics_enabled: bool,
}

impl NodeClient {
    /// Create a client for the configured node.
    ///
    /// No request is made; an unreachable node shows up as failure envelopes.
    pub fn new(config: NodeConfig) -> ChainResult<Self> {
        let parsed: url::Url = config.url.parse().map_err(|e| {
            ChainError::Transport(format!("Invalid node URL '{}': {}", config.url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChainError::Transport(format!("HTTP client: {}", e)))?;

        let base_url = parsed.as_str().trim_end_matches('/').to_string();

        tracing::info!(
            node_url = %base_url,
            timeout_secs = config.timeout_secs,
            "Node client initialized"
        );

        Ok(Self {
            http,
            base_url,
            config,
            metrics_enabled: true,
        })
    }

    /// Toggle RPC metrics recording.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> ResponseEnvelope {
        let request = self.http.post(self.url(endpoint)).json(body);
        self.send(endpoint, request).await
    }

    async fn post_empty(&self, endpoint: &'static str) -> ResponseEnvelope {
        let request = self.http.post(self.url(endpoint));
        self.send(endpoint, request).await
    }

    async fn send(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> ResponseEnvelope {
        let started = Instant::now();

        let envelope: ResponseEnvelope = match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) if status.is_success() => ResponseEnvelope::success(body),
                    Ok(body) => {
                        tracing::warn!(
                            endpoint = endpoint,
                            status = status.as_u16(),
                            "Node returned error status"
                        );
                        ResponseEnvelope::failure(body)
                    }
                    Err(e) => {
                        tracing::warn!(
                            endpoint = endpoint,
                            error = %e,
                            "Failed to read node response"
                        );
                        ChainError::Transport(format!("reading response: {}", e)).into()
                    }
                }
            }
            Err(e) => {
                if e.is_timeout() {
                    tracing::warn!(
                        endpoint = endpoint,
                        timeout_secs = self.config.timeout_secs,
                        "RPC timeout"
                    );
                } else {
                    tracing::warn!(endpoint = endpoint, error = %e, "RPC error");
                }
                ChainError::Transport(e.to_string()).into()
            }
        };

        if self.metrics_enabled {
            metrics::record_rpc_request(endpoint, envelope.success, started.elapsed());
        }
        envelope
    }

    /// Block by number or id.
    pub async fn get_block(&self, block_num_or_id: &str) -> ResponseEnvelope {
        self.post_json(endpoints::GET_BLOCK, &BlockRequest { block_num_or_id })
            .await
    }

    /// Account details.
    pub async fn get_account(&self, account: &str) -> ResponseEnvelope {
        self.post_json(endpoints::GET_ACCOUNT, &AccountRequest { account_name: account })
            .await
    }

    /// Accounts controlled by the public key of `private_key`.
    pub async fn get_key_accounts(&self, private_key: &str) -> ResponseEnvelope {
        let wallet = match Wallet::from_private_key(private_key) {
            Ok(w) => w,
            Err(e) => return e.into(),
        };
        let body = KeyAccountsRequest {
            public_key: wallet.public_key().to_string(),
        };
        self.post_json(endpoints::GET_KEY_ACCOUNTS, &body).await
    }

    /// The twenty most recent actions of `account`.
    pub async fn get_actions(&self, account: &str) -> ResponseEnvelope {
        self.get_actions_page(account, DEFAULT_ACTIONS_POS, DEFAULT_ACTIONS_OFFSET)
            .await
    }

    /// Actions of `account` starting at `pos`, `offset` entries away.
    pub async fn get_actions_page(&self, account: &str, pos: i64, offset: i64) -> ResponseEnvelope {
        let body = ActionsRequest {
            account_name: account,
            pos,
            offset,
        };
        self.post_json(endpoints::GET_ACTIONS, &body).await
    }

    /// Rows of a contract table.
    pub async fn get_table_rows(&self, request: &TableRowsRequest) -> ResponseEnvelope {
        self.post_json(endpoints::GET_TABLE_ROWS, request).await
    }

    /// Token balance of `account` under contract `code`.
    pub async fn get_currency_balance(
        &self,
        account: &str,
        code: &str,
        symbol: &str,
    ) -> ResponseEnvelope {
        let body = CurrencyBalanceRequest {
            account,
            code,
            symbol,
        };
        self.post_json(endpoints::GET_CURRENCY_BALANCE, &body).await
    }
}

#[async_trait]
impl ChainRpc for NodeClient {
    async fn get_info(&self) -> ResponseEnvelope {
        self.post_empty(endpoints::GET_INFO).await
    }

    async fn abi_json_to_bin(
        &self,
        code: &str,
        action: &str,
        args: &ActionArgs,
    ) -> ResponseEnvelope {
        let body = AbiJsonToBinRequest { code, action, args };
        self.post_json(endpoints::ABI_JSON_TO_BIN, &body).await
    }

    async fn get_required_keys(
        &self,
        transaction: &UnsignedTransaction,
        available_keys: &[PublicKey],
    ) -> ResponseEnvelope {
        let wire = match WireTransaction::from_unsigned(transaction) {
            Ok(w) => w,
            Err(e) => return e.into(),
        };
        let body = RequiredKeysRequest {
            transaction: wire,
            available_keys: available_keys.iter().map(ToString::to_string).collect(),
        };
        self.post_json(endpoints::GET_REQUIRED_KEYS, &body).await
    }

    async fn push_transaction(&self, packed: &PackedTransaction) -> ResponseEnvelope {
        self.post_json(endpoints::PUSH_TRANSACTION, packed).await
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("node_url", &self.base_url)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
