//! Transaction pipeline.
//!
//! # Data Flow
//! ```text
//! get_info ──▶ abi_json_to_bin ──▶ TxBuilder::build ──▶ get_required_keys
//!     ──▶ SignedTransaction::sign (× n) ──▶ packer::pack ──▶ push_transaction
//! ```
//!
//! Every stage either yields its typed payload or the envelope that stopped
//! it, and that envelope is what the caller gets back, unmodified. Nothing is
//! retried and nothing is shared between invocations: the head-block snapshot,
//! the key and the account all live on the stack of a single call.

pub mod negotiator;
pub mod state;

use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::client::ChainRpc;
use crate::blockchain::envelope::{ResponseEnvelope, StageResult};
use crate::blockchain::packer::pack;
use crate::blockchain::transaction::{SignedTransaction, TxBuilder, UnsignedTransaction};
use crate::blockchain::types::{
    ActionArgs, ActionIntent, BinArgs, ChainInfo, ChainResult, EncodedAction, HeadBlock,
    SigningPolicy, TransactionConfig,
};
use crate::blockchain::wallet::Wallet;

pub use state::Stage;
use state::Run;

/// Drives an action from intent to broadcast against one node.
pub struct TransactionPipeline<R> {
    rpc: R,
    builder: TxBuilder,
    signing_policy: SigningPolicy,
}

impl<R: ChainRpc> TransactionPipeline<R> {
    pub fn new(rpc: R, config: &TransactionConfig) -> Self {
        Self {
            rpc,
            builder: TxBuilder::new(config),
            signing_policy: config.signing_policy,
        }
    }

    /// Encode, sign and broadcast `action_name` on `contract_account`,
    /// authorized by `account`.
    ///
    /// Returns the broadcast envelope, or the first envelope that stopped the
    /// run.
    pub async fn push_transaction(
        &self,
        contract_account: &str,
        action_name: &str,
        account: &str,
        private_key: &str,
        args: &ActionArgs,
    ) -> ResponseEnvelope {
        let span = tracing::info_span!(
            "push_transaction",
            invocation_id = %Uuid::new_v4(),
            contract = %contract_account,
            action = %action_name,
            account = %account,
        );

        let intent = ActionIntent::new(contract_account, action_name, args.clone());
        let mut run = Run::new("push_transaction");
        let result = self
            .run_push(&mut run, &intent, account, private_key)
            .instrument(span.clone())
            .await;
        span.in_scope(|| run.finish(result)).1
    }

    /// Build the transaction `push_transaction` would send and ask the node
    /// which keys must sign it. Nothing is signed or broadcast.
    pub async fn get_required_keys(
        &self,
        contract_account: &str,
        action_name: &str,
        account: &str,
        private_key: &str,
        args: &ActionArgs,
    ) -> ResponseEnvelope {
        let span = tracing::info_span!(
            "get_required_keys",
            invocation_id = %Uuid::new_v4(),
            contract = %contract_account,
            action = %action_name,
            account = %account,
        );

        let intent = ActionIntent::new(contract_account, action_name, args.clone());
        let mut run = Run::new("get_required_keys");
        let result = self
            .run_required_keys(&mut run, &intent, account, private_key)
            .instrument(span.clone())
            .await;
        span.in_scope(|| run.finish(result)).1
    }

    async fn run_push(
        &self,
        run: &mut Run,
        intent: &ActionIntent,
        account: &str,
        private_key: &str,
    ) -> StageResult<ResponseEnvelope> {
        let wallet = Wallet::from_private_key(private_key)?;

        let info: ChainInfo = self.rpc.get_info().await.decode()?;
        run.advance();

        let action = self.encode_action(intent, account).await?;
        run.advance();

        let unsigned = self
            .builder
            .build(action, &info.head_block_id, &info.head_block_time);
        run.advance();

        let required =
            negotiator::negotiate(&self.rpc, &unsigned, &[wallet.public_key()]).await?;
        run.advance();

        let count =
            negotiator::signature_count(self.signing_policy, &required, &wallet.public_key())?;
        let signed = sign(&unsigned, &info.chain_id, &wallet, count)?;
        run.advance();

        let packed = pack(&signed)?;
        run.advance();

        Ok(self.rpc.push_transaction(&packed).await)
    }

    async fn run_required_keys(
        &self,
        run: &mut Run,
        intent: &ActionIntent,
        account: &str,
        private_key: &str,
    ) -> StageResult<ResponseEnvelope> {
        let wallet = Wallet::from_private_key(private_key)?;

        let head: HeadBlock = self.rpc.get_info().await.decode()?;
        run.advance();

        let action = self.encode_action(intent, account).await?;
        run.advance();

        let unsigned = self
            .builder
            .build(action, &head.head_block_id, &head.head_block_time);
        run.advance();

        Ok(self
            .rpc
            .get_required_keys(&unsigned, &[wallet.public_key()])
            .await)
    }

    async fn encode_action(
        &self,
        intent: &ActionIntent,
        account: &str,
    ) -> StageResult<EncodedAction> {
        let bin: BinArgs = self
            .rpc
            .abi_json_to_bin(&intent.contract_account, &intent.action_name, &intent.args)
            .await
            .decode()?;
        Ok(self.builder.encoded_action(
            &intent.contract_account,
            &intent.action_name,
            account,
            &bin.binargs,
        ))
    }
}

/// Sign a fresh copy of `unsigned` `count` times with `wallet`.
fn sign(
    unsigned: &UnsignedTransaction,
    chain_id: &str,
    wallet: &Wallet,
    count: usize,
) -> ChainResult<SignedTransaction> {
    let mut signed = SignedTransaction::new(unsigned, chain_id);
    for _ in 0..count {
        signed.sign(wallet)?;
    }
    tracing::debug!(signatures = signed.signatures().len(), "Transaction signed");
    Ok(signed)
}
