//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export NodeConfig from config module to avoid duplication
pub use crate::config::schema::{NodeConfig, SigningPolicy, TransactionConfig};

/// Contract arguments, in the order the caller supplied them.
pub type ActionArgs = serde_json::Map<String, serde_json::Value>;

/// Head-state snapshot returned by `get_info`.
///
/// Only the fields the pipeline depends on are modelled; any of them missing
/// makes the payload undecodable and aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub head_block_id: String,
    /// `YYYY-MM-DDTHH:mm:ss[.fff]`, implicitly UTC.
    pub head_block_time: String,
    pub chain_id: String,
}

/// The part of `get_info` needed to anchor a transaction without signing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadBlock {
    pub head_block_id: String,
    pub head_block_time: String,
}

/// Payload of `abi_json_to_bin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinArgs {
    pub binargs: String,
}

/// Payload of `get_required_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredKeys {
    pub required_keys: Vec<String>,
}

/// A contract invocation as requested by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionIntent {
    pub contract_account: String,
    pub action_name: String,
    pub args: ActionArgs,
}

impl ActionIntent {
    pub fn new(contract_account: &str, action_name: &str, args: ActionArgs) -> Self {
        Self {
            contract_account: contract_account.to_string(),
            action_name: action_name.to_string(),
            args,
        }
    }
}

/// `actor@permission` pair authorizing an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: String,
    pub permission: String,
}

impl PermissionLevel {
    pub fn new(actor: &str, permission: &str) -> Self {
        Self {
            actor: actor.to_string(),
            permission: permission.to_string(),
        }
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

/// An action whose arguments have already been ABI-encoded by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedAction {
    #[serde(rename = "account")]
    pub contract_account: String,
    #[serde(rename = "name")]
    pub action_name: String,
    pub authorization: Vec<PermissionLevel>,
    /// Hex-encoded binary call data.
    #[serde(rename = "data")]
    pub binary_data: String,
}

impl EncodedAction {
    /// Authorization rendered as `account@permission` strings.
    pub fn authorization_strings(&self) -> Vec<String> {
        self.authorization.iter().map(ToString::to_string).collect()
    }
}

/// Errors raised locally while assembling, signing or packing a transaction.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Private key is not a valid WIF or `PVT_K1_` string.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key is not a valid `EOS` or `PUB_K1_` string.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Account, action or permission name violates the name encoding rules.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Reference block id is not hex or is too short to derive num/prefix.
    #[error("Invalid reference block id '{0}'")]
    InvalidReferenceBlock(String),

    /// Chain id is not 32 bytes of hex.
    #[error("Invalid chain id '{0}'")]
    InvalidChainId(String),

    /// Encoded action data is not valid hex.
    #[error("Invalid action data: {0}")]
    InvalidActionData(String),

    /// Producing a signature failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// None of the keys the node requires is held by the caller.
    #[error("Required key not held: {0}")]
    RequiredKeyNotHeld(String),

    /// HTTP client could not be built or the node URL is unusable.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ChainError {
    /// Stable identifier used in failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::InvalidPrivateKey(_) => "invalid_private_key",
            ChainError::InvalidPublicKey(_) => "invalid_public_key",
            ChainError::InvalidName { .. } => "invalid_name",
            ChainError::InvalidReferenceBlock(_) => "invalid_reference_block",
            ChainError::InvalidChainId(_) => "invalid_chain_id",
            ChainError::InvalidActionData(_) => "invalid_action_data",
            ChainError::Signing(_) => "signing_failed",
            ChainError::RequiredKeyNotHeld(_) => "required_key_not_held",
            ChainError::Transport(_) => "transport",
        }
    }
}

/// Result type for local chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
