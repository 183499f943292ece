//! Ledger-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while driving a workflow against the ledger or
/// vault gateways.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Account state was still unobservable after the loader's bounded
    /// retries. Wraps the last underlying fetch error.
    #[error("account state unobservable after {attempts} attempts")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<WorkflowError>,
    },

    /// The gateway accepted the request but rejected the transaction.
    /// Carries the structured rejection payload for diagnosis.
    #[error("submission rejected: {payload}")]
    SubmissionRejected { payload: RejectionPayload },

    /// Transport-level failure talking to a gateway, distinct from a
    /// structured rejection. Only the account loader retries this.
    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The requested account is not (yet) visible on the ledger.
    #[error("account {0} not yet visible on the ledger")]
    AccountNotVisible(String),

    /// Local failure while building or signing a transaction.
    #[error("signing error: {0}")]
    Signing(String),

    /// A transaction envelope from the vault gateway could not be decoded,
    /// signed, or interpreted.
    #[error("envelope error: {0}")]
    Envelope(String),
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Structured rejection payload returned by a gateway.
///
/// The raw body is preserved verbatim; the result codes are the part a
/// caller matches on (missing trust, bad sequence, underfunded source).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RejectionPayload {
    /// HTTP status reported by the gateway, if the rejection came over HTTP.
    #[serde(default)]
    pub status: Option<u16>,

    /// Transaction-level result code (e.g. `tx_bad_seq`, `tx_bad_auth`).
    #[serde(default)]
    pub transaction_code: Option<String>,

    /// Per-operation result codes (e.g. `op_no_trust`, `op_underfunded`).
    #[serde(default)]
    pub operation_codes: Vec<String>,

    /// Human-oriented detail string from the gateway.
    #[serde(default)]
    pub detail: Option<String>,

    /// The unparsed gateway body.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl std::fmt::Display for RejectionPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.transaction_code {
            Some(code) => write!(f, "{}", code)?,
            None => write!(f, "unknown")?,
        }
        if !self.operation_codes.is_empty() {
            write!(f, " [{}]", self.operation_codes.join(", "))?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl RejectionPayload {
    /// Rejection with only a transaction-level code.
    pub fn transaction(code: &str) -> Self {
        Self {
            transaction_code: Some(code.to_string()),
            ..Default::default()
        }
    }

    /// Rejection with a transaction code and per-operation codes.
    pub fn operations(tx_code: &str, op_codes: &[&str]) -> Self {
        Self {
            transaction_code: Some(tx_code.to_string()),
            operation_codes: op_codes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// Receipt returned by the ledger for an accepted transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Transaction hash assigned by the ledger.
    pub hash: String,

    /// Ledger number the transaction was included in, when reported.
    #[serde(default)]
    pub ledger: Option<u64>,

    /// Structured return value, when the submission produced one
    /// (vault creation reports the new contract address here).
    #[serde(default)]
    pub return_value: Option<serde_json::Value>,
}
