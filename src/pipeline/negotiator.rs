//! Required-key negotiation and the signing plan derived from it.
//!
//! The node's answer is authoritative: it is not checked against the
//! candidate set. What happens with keys the caller does not hold depends on
//! the configured `SigningPolicy`.

use crate::blockchain::client::ChainRpc;
use crate::blockchain::envelope::StageResult;
use crate::blockchain::keys::PublicKey;
use crate::blockchain::transaction::UnsignedTransaction;
use crate::blockchain::types::{ChainError, ChainResult, RequiredKeys, SigningPolicy};

/// Ask the node which of `candidates` must sign `transaction`.
pub async fn negotiate<R: ChainRpc + ?Sized>(
    rpc: &R,
    transaction: &UnsignedTransaction,
    candidates: &[PublicKey],
) -> StageResult<RequiredKeys> {
    let required: RequiredKeys = rpc
        .get_required_keys(transaction, candidates)
        .await
        .decode()?;

    tracing::debug!(
        candidates = candidates.len(),
        required = required.required_keys.len(),
        "Required keys negotiated"
    );
    Ok(required)
}

/// Number of signatures to make with `held`.
///
/// `PerRequiredKey` signs once per listed key whether or not it is held, so
/// a multi-key requirement ends up with repeated signatures from one key.
/// `HeldKeysOnly` signs once per listed key equal to `held` and fails when
/// keys are required but none of them is held.
pub fn signature_count(
    policy: SigningPolicy,
    required: &RequiredKeys,
    held: &PublicKey,
) -> ChainResult<usize> {
    match policy {
        SigningPolicy::PerRequiredKey => Ok(required.required_keys.len()),
        SigningPolicy::HeldKeysOnly => {
            let matching = required
                .required_keys
                .iter()
                .filter(|k| k.parse::<PublicKey>().map(|k| &k == held).unwrap_or(false))
                .count();
            if matching == 0 && !required.required_keys.is_empty() {
                return Err(ChainError::RequiredKeyNotHeld(
                    required.required_keys.join(", "),
                ));
            }
            Ok(matching)
        }
    }
}
