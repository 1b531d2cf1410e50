//! Metrics collection.
//!
//! # Metrics
//! - `eos_rpc_requests_total` (counter): node calls by endpoint, outcome
//! - `eos_rpc_request_duration_seconds` (histogram): node call latency
//! - `eos_pipeline_runs_total` (counter): pipeline runs by operation, final stage
//!
//! Recording is a no-op until the embedding application installs a recorder.

use std::time::Duration;

/// Record one node call.
pub fn record_rpc_request(endpoint: &'static str, success: bool, elapsed: Duration) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("eos_rpc_requests_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("eos_rpc_request_duration_seconds", "endpoint" => endpoint)
        .record(elapsed.as_secs_f64());
}

/// Record the end of a pipeline run.
pub fn record_pipeline_run(operation: &'static str, final_stage: &'static str) {
    metrics::counter!("eos_pipeline_runs_total", "operation" => operation, "stage" => final_stage)
        .increment(1);
}
