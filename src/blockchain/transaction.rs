//! Transaction assembly and signing.
//!
//! # Lifecycle
//! ```text
//! UnsignedTransaction ──SignedTransaction::new──▶ SignedTransaction
//!     ──pack──▶ PackedTransaction
//! ```
//! Each step works on its own copy; nothing is mutated after it has been
//! handed to the next step.

use crate::blockchain::expiration::time_after_head_block;
use crate::blockchain::keys::Signature;
use crate::blockchain::packer::{serialize_transaction, signing_digest};
use crate::blockchain::types::{ChainResult, EncodedAction, PermissionLevel, TransactionConfig};
use crate::blockchain::wallet::Wallet;

/// A fully shaped transaction that carries no signatures yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub actions: Vec<EncodedAction>,
    /// Head block id, verbatim; num/prefix are derived only on the wire.
    pub reference_block_id: String,
    /// `YYYY-MM-DDTHH:mm:ss`, UTC.
    pub expiration: String,
}

impl UnsignedTransaction {
    /// Signatures attached so far: always none.
    pub fn signatures(&self) -> &[Signature] {
        &[]
    }
}

/// A transaction bound to a chain id, accumulating one signature per `sign`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: UnsignedTransaction,
    chain_id: String,
    signatures: Vec<Signature>,
}

impl SignedTransaction {
    /// Start signing a private copy of `transaction` for `chain_id`.
    pub fn new(transaction: &UnsignedTransaction, chain_id: &str) -> Self {
        Self {
            transaction: transaction.clone(),
            chain_id: chain_id.to_string(),
            signatures: Vec::new(),
        }
    }

    /// Digest every signature on this transaction commits to.
    pub fn digest(&self) -> ChainResult<[u8; 32]> {
        let packed = serialize_transaction(&self.transaction)?;
        signing_digest(&self.chain_id, &packed)
    }

    /// Append one signature made with `wallet`.
    pub fn sign(&mut self, wallet: &Wallet) -> ChainResult<()> {
        let digest = self.digest()?;
        let signature = wallet.sign_digest(&digest)?;
        self.signatures.push(signature);
        Ok(())
    }

    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.transaction
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }
}

/// Builds unsigned single-action transactions.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    permission: String,
    expiration_ms: i64,
}

impl TxBuilder {
    /// Create a builder using the configured permission and expiration window.
    pub fn new(config: &TransactionConfig) -> Self {
        Self {
            permission: config.permission.clone(),
            expiration_ms: config.expiration_ms,
        }
    }

    /// Authorization for `account` under the configured permission.
    pub fn authorization(&self, account: &str) -> Vec<PermissionLevel> {
        vec![PermissionLevel::new(account, &self.permission)]
    }

    /// Attach `binargs` to an action authorized by `account`.
    pub fn encoded_action(
        &self,
        contract_account: &str,
        action_name: &str,
        account: &str,
        binargs: &str,
    ) -> EncodedAction {
        EncodedAction {
            contract_account: contract_account.to_string(),
            action_name: action_name.to_string(),
            authorization: self.authorization(account),
            binary_data: binargs.to_string(),
        }
    }

    /// Assemble the unsigned transaction anchored at the given head block.
    ///
    /// # Arguments
    /// * `action` - Encoded action, authorization already attached
    /// * `head_block_id` - Used verbatim as the reference block
    /// * `head_block_time` - Base of the expiration window
    pub fn build(
        &self,
        action: EncodedAction,
        head_block_id: &str,
        head_block_time: &str,
    ) -> UnsignedTransaction {
        let expiration = time_after_head_block(head_block_time, self.expiration_ms);

        tracing::debug!(
            contract = %action.contract_account,
            action = %action.action_name,
            reference_block = %head_block_id,
            expiration = %expiration,
            "Unsigned transaction built"
        );

        UnsignedTransaction {
            actions: vec![action],
            reference_block_id: head_block_id.to_string(),
            expiration,
        }
    }
}
