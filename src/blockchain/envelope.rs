//! Uniform result wrapper for every remote call.
//!
//! # Failure propagation
//! A stage either decodes the envelope it was handed into a typed payload or
//! hands back that same envelope as its error. There is no wrapping: whatever
//! failed first is exactly what the caller receives.
//!
//! ```text
//! dependency → envelope ──decode()──▶ Ok(T)          → next stage
//!                          └────────▶ Err(envelope)  → returned as-is
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::blockchain::types::ChainError;

/// Outcome of a remote call (or of a local step that failed hard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Whether the call succeeded at the transport/status level.
    pub success: bool,
    /// Stage-specific JSON body, present only on success.
    pub payload: Option<String>,
    /// Raw response text (or error description) exactly as received.
    pub raw: String,
}

/// Result of a pipeline stage: the decoded payload, or the envelope to return.
pub type StageResult<T> = Result<T, ResponseEnvelope>;

impl ResponseEnvelope {
    /// Successful response carrying `body` as payload. An empty body carries
    /// no payload.
    pub fn success(body: impl Into<String>) -> Self {
        let raw = body.into();
        let payload = if raw.trim().is_empty() {
            None
        } else {
            Some(raw.clone())
        };
        Self {
            success: true,
            payload,
            raw,
        }
    }

    /// Failed response with whatever text the transport produced.
    pub fn failure(raw: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            raw: raw.into(),
        }
    }

    /// Decode the payload into a stage structure.
    ///
    /// Unsuccessful envelopes, envelopes without payload and payloads that
    /// miss a required field all yield this very envelope as the error.
    pub fn decode<T: DeserializeOwned>(self) -> StageResult<T> {
        if !self.success {
            return Err(self);
        }
        let parsed = match self.payload.as_deref() {
            Some(payload) => serde_json::from_str::<T>(payload),
            None => return Err(self),
        };
        match parsed {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::debug!(error = %e, "Payload missing required fields");
                Err(self)
            }
        }
    }

    /// Payload parsed as untyped JSON, if any.
    pub fn payload_json(&self) -> Option<serde_json::Value> {
        self.payload
            .as_deref()
            .and_then(|p| serde_json::from_str(p).ok())
    }
}

impl From<ChainError> for ResponseEnvelope {
    fn from(err: ChainError) -> Self {
        let raw = json!({
            "error": {
                "kind": err.kind(),
                "message": err.to_string(),
            }
        });
        Self::failure(raw.to_string())
    }
}
