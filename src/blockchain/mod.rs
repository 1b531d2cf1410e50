//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! client.rs      node RPC (get_info, abi_json_to_bin, get_required_keys,
//!                push_transaction, read-only queries)
//!     → envelope.rs  uniform { success, payload, raw } results
//! transaction.rs unsigned transaction assembly, signing into SignedTransaction
//!     → expiration.rs  head-block time + window
//!     → wallet.rs      private key parsing, canonical digest signatures
//!     → packer.rs      binary layout, signing digest, packed form
//!     → keys.rs, name.rs  string and name encodings
//! ```
//!
//! # Security Constraints
//! - Private keys are invocation parameters, never stored
//! - Never log private keys
//! - All RPC calls have a configurable timeout

pub mod client;
pub mod envelope;
pub mod expiration;
pub mod keys;
pub mod name;
pub mod packer;
pub mod requests;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{ChainRpc, NodeClient};
pub use envelope::{ResponseEnvelope, StageResult};
pub use keys::{PublicKey, Signature};
pub use packer::PackedTransaction;
pub use requests::TableRowsRequest;
pub use transaction::{SignedTransaction, TxBuilder, UnsignedTransaction};
pub use types::{ActionArgs, ChainError, ChainInfo, ChainResult, EncodedAction, PermissionLevel};
pub use wallet::Wallet;
