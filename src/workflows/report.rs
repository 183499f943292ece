//! Structured run reports.
//!
//! Progress narration is event-based: each step logs through `tracing`
//! and appends a record here. The serialized report is the run's only
//! stdout artifact.

use serde::Serialize;
use uuid::Uuid;

/// Outcome of one pipeline step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: String,
    /// Hash of the accepted transaction, when the step submitted one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Step-specific payload (accounts created, balances observed, ...).
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
}

/// Accumulated record of a single workflow run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub workflow: String,
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    pub fn new(workflow: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            workflow: workflow.to_string(),
            steps: Vec::new(),
        }
    }

    /// Record a completed step and emit the matching event.
    pub fn record(&mut self, step: &str, tx_hash: Option<String>, detail: serde_json::Value) {
        tracing::info!(
            run_id = %self.run_id,
            step = %step,
            tx_hash = tx_hash.as_deref().unwrap_or("-"),
            "Step completed"
        );
        self.steps.push(StepRecord {
            step: step.to_string(),
            tx_hash,
            detail,
        });
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
