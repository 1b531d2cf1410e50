//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::expiration::TX_EXPIRATION_IN_MILLIS;

/// Root configuration for the transaction client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Chain node connection.
    pub node: NodeConfig,

    /// Transaction assembly and signing.
    pub transaction: TransactionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// HTTP API endpoint of the node.
    pub url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8888".to_string(),
            timeout_secs: 10,
        }
    }
}

/// How required keys returned by the node turn into signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningPolicy {
    /// One signature with the caller's key for every key the node lists.
    #[default]
    PerRequiredKey,
    /// One signature for every listed key that is the caller's key.
    HeldKeysOnly,
}

/// Transaction assembly settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Expiration distance from the head block time, in milliseconds.
    pub expiration_ms: i64,

    /// Permission used to authorize the invoking account.
    pub permission: String,

    /// Signing policy for the negotiated key set.
    pub signing_policy: SigningPolicy,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            expiration_ms: TX_EXPIRATION_IN_MILLIS,
            permission: "active".to_string(),
            signing_policy: SigningPolicy::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record RPC counters and latencies.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
