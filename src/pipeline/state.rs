//! Pipeline stages.
//!
//! ```text
//! FETCH_CHAIN_INFO → ENCODE_ACTION → BUILD_TX → NEGOTIATE_KEYS
//!     → SIGN → PACK → BROADCAST → DONE
//!
//! Every non-terminal stage can move to FAILED.
//! ```
//! A run never moves backwards and never resumes; a retry starts over at
//! `FETCH_CHAIN_INFO` with a fresh head-block snapshot.

use std::fmt;

use crate::blockchain::envelope::{ResponseEnvelope, StageResult};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    FetchChainInfo,
    EncodeAction,
    BuildTx,
    NegotiateKeys,
    Sign,
    Pack,
    Broadcast,
    Done,
    Failed,
}

impl Stage {
    /// Successor on the happy path. `Done` and `Failed` are absorbing.
    pub fn next(self) -> Stage {
        match self {
            Stage::FetchChainInfo => Stage::EncodeAction,
            Stage::EncodeAction => Stage::BuildTx,
            Stage::BuildTx => Stage::NegotiateKeys,
            Stage::NegotiateKeys => Stage::Sign,
            Stage::Sign => Stage::Pack,
            Stage::Pack => Stage::Broadcast,
            Stage::Broadcast => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Failed => Stage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::FetchChainInfo => "FETCH_CHAIN_INFO",
            Stage::EncodeAction => "ENCODE_ACTION",
            Stage::BuildTx => "BUILD_TX",
            Stage::NegotiateKeys => "NEGOTIATE_KEYS",
            Stage::Sign => "SIGN",
            Stage::Pack => "PACK",
            Stage::Broadcast => "BROADCAST",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of one pipeline invocation.
///
/// A run starts at `FETCH_CHAIN_INFO`, and the local input checks done before
/// the first node call (private key parsing) belong to that stage. A rejected
/// key therefore fails the run at `FETCH_CHAIN_INFO` with no call made.
#[derive(Debug)]
pub(crate) struct Run {
    operation: &'static str,
    stage: Stage,
}

impl Run {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self {
            operation,
            stage: Stage::FetchChainInfo,
        }
    }

    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to the next stage.
    pub(crate) fn advance(&mut self) {
        self.stage = self.stage.next();
        tracing::debug!(stage = %self.stage, "Entering stage");
    }

    /// Close the run, yielding the envelope handed to the caller.
    ///
    /// The last envelope decides the outcome: an unsuccessful broadcast fails
    /// the run at `BROADCAST` just like an early short-circuit fails it where
    /// it happened.
    pub(crate) fn finish(self, result: StageResult<ResponseEnvelope>) -> (Stage, ResponseEnvelope) {
        let envelope = result.unwrap_or_else(|failed| failed);
        let reached = self.stage();

        let final_stage = if envelope.success {
            tracing::info!(operation = self.operation, "Pipeline completed");
            Stage::Done
        } else {
            tracing::warn!(
                operation = self.operation,
                stage = %reached,
                raw = %envelope.raw,
                "Pipeline failed"
            );
            Stage::Failed
        };

        let label = if envelope.success {
            Stage::Done.as_str()
        } else {
            reached.as_str()
        };
        metrics::record_pipeline_run(self.operation, label);

        (final_stage, envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_order() {
        let mut stage = Stage::FetchChainInfo;
        let mut seen = vec![stage];
        while !stage.is_terminal() {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::FetchChainInfo,
                Stage::EncodeAction,
                Stage::BuildTx,
                Stage::NegotiateKeys,
                Stage::Sign,
                Stage::Pack,
                Stage::Broadcast,
                Stage::Done
            ]
        );
    }

    #[test]
    fn test_terminal_states_absorb() {
        assert_eq!(Stage::Done.next(), Stage::Done);
        assert_eq!(Stage::Failed.next(), Stage::Failed);
        assert!(!Stage::Broadcast.is_terminal());
    }

    #[test]
    fn test_run_failure_keeps_envelope() {
        let mut run = Run::new("test");
        run.advance();
        assert_eq!(run.stage(), Stage::EncodeAction);

        let failing = ResponseEnvelope::failure("boom");
        let (stage, envelope) = run.finish(Err(failing.clone()));
        assert_eq!(stage, Stage::Failed);
        assert_eq!(envelope, failing);
    }

    #[test]
    fn test_rejected_input_fails_at_first_stage() {
        let run = Run::new("test");
        assert_eq!(run.stage(), Stage::FetchChainInfo);

        let rejected: ResponseEnvelope =
            crate::blockchain::types::ChainError::InvalidPrivateKey("malformed WIF".into()).into();
        let (stage, envelope) = run.finish(Err(rejected.clone()));
        assert_eq!(stage, Stage::Failed);
        assert_eq!(envelope, rejected);
    }

    #[test]
    fn test_unsuccessful_final_envelope_fails_run() {
        let run = Run::new("test");
        let (stage, _) = run.finish(Ok(ResponseEnvelope::failure("rejected")));
        assert_eq!(stage, Stage::Failed);

        let run = Run::new("test");
        let (stage, _) = run.finish(Ok(ResponseEnvelope::success("{}")));
        assert_eq!(stage, Stage::Done);
    }
}
