//! Metrics collection.
//!
//! # Metrics
//! - `workflow_account_load_attempts_total` (counter): loader fetch attempts
//! - `workflow_account_load_exhausted_total` (counter): loader retry exhaustions
//! - `workflow_submissions_total` (counter): transaction submissions by outcome
//! - `workflow_gateway_calls_total` (counter): gateway round trips by target and outcome
//!
//! # Design Decisions
//! - Uses the metrics facade; a one-shot run has no scrape endpoint, so
//!   recorder installation is left to the embedding process
//! - Low-overhead updates (atomic increments)

use metrics::counter;

/// Count one account loader fetch attempt.
pub fn record_account_load_attempt() {
    counter!("workflow_account_load_attempts_total").increment(1);
}

/// Count one loader giving up after bounded retries.
pub fn record_account_load_exhausted() {
    counter!("workflow_account_load_exhausted_total").increment(1);
}

/// Count one transaction submission.
pub fn record_submission(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    counter!("workflow_submissions_total", "outcome" => outcome).increment(1);
}

/// Count one gateway round trip.
pub fn record_gateway_call(target: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("workflow_gateway_calls_total", "target" => target, "outcome" => outcome).increment(1);
}
