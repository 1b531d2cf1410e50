//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! node client, pipeline:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Every pipeline run opens a span carrying a UUID v4 invocation id, so the
//! log lines of concurrent runs can be told apart.
//! ```
//!
//! # Design Decisions
//! - Private keys are never logged; only derived public keys
//! - Failures log the stage they happened in

pub mod logging;
pub mod metrics;
