//! EOSIO transaction pipeline client library.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod pipeline;

pub use blockchain::{ChainRpc, NodeClient, ResponseEnvelope};
pub use config::ClientConfig;
pub use pipeline::TransactionPipeline;
