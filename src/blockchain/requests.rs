//! Request bodies for node endpoints.

use serde::Serialize;

use crate::blockchain::packer::WireTransaction;
use crate::blockchain::types::ActionArgs;

/// Default `pos` for `get_actions`: the newest action.
pub const DEFAULT_ACTIONS_POS: i64 = -1;
/// Default `offset` for `get_actions`: twenty actions back from `pos`.
pub const DEFAULT_ACTIONS_OFFSET: i64 = -20;
/// Default row limit for `get_table_rows`.
pub const DEFAULT_TABLE_LIMIT: u32 = 10;

#[derive(Debug, Serialize)]
pub(crate) struct BlockRequest<'a> {
    pub block_num_or_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AccountRequest<'a> {
    pub account_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyAccountsRequest {
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActionsRequest<'a> {
    pub account_name: &'a str,
    pub pos: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CurrencyBalanceRequest<'a> {
    pub account: &'a str,
    pub code: &'a str,
    pub symbol: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AbiJsonToBinRequest<'a> {
    pub code: &'a str,
    pub action: &'a str,
    pub args: &'a ActionArgs,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequiredKeysRequest {
    pub transaction: WireTransaction,
    pub available_keys: Vec<String>,
}

/// Body of `get_table_rows`.
///
/// ```
/// use eos_tx_pipeline::blockchain::TableRowsRequest;
///
/// let request = TableRowsRequest::new("alice", "eosio.token", "accounts")
///     .limit(100)
///     .reverse(true);
/// assert_eq!(request.limit, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRowsRequest {
    pub scope: String,
    pub code: String,
    pub table: String,
    pub json: bool,
    pub limit: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lower_bound: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub upper_bound: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    /// `primary`, `secondary`, … or a 1-based number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode_type: Option<String>,
}

impl TableRowsRequest {
    pub fn new(scope: &str, code: &str, table: &str) -> Self {
        Self {
            scope: scope.to_string(),
            code: code.to_string(),
            table: table.to_string(),
            json: true,
            limit: DEFAULT_TABLE_LIMIT,
            lower_bound: String::new(),
            upper_bound: String::new(),
            reverse: None,
            index_position: None,
            key_type: None,
            encode_type: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn lower_bound(mut self, bound: &str) -> Self {
        self.lower_bound = bound.to_string();
        self
    }

    pub fn upper_bound(mut self, bound: &str) -> Self {
        self.upper_bound = bound.to_string();
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = Some(reverse);
        self
    }

    /// Query a secondary index.
    pub fn index(mut self, position: &str, key_type: &str, encode_type: &str) -> Self {
        self.index_position = Some(position.to_string());
        self.key_type = Some(key_type.to_string());
        self.encode_type = Some(encode_type.to_string());
        self
    }
}
