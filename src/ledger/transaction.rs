//! Transaction building and signing.
//!
//! # Responsibilities
//! - Compose ledger operations into a transaction bound to a source
//!   account's current sequence number
//! - Apply the fixed base fee, network passphrase, and validity window
//! - Sign with a workflow identity and produce the wire encoding
//!
//! A transaction binds the sequence number it was built with. Once any
//! submission from the same account is accepted, that binding is stale and
//! the transaction must be rebuilt from freshly loaded state, not retried.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ledger::account::AccountState;
use crate::ledger::asset::{Asset, ChangeTrustLine, PoolId};
use crate::ledger::keypair::Identity;
use crate::ledger::types::{WorkflowError, WorkflowResult};

/// A price as a rational number, used for slippage bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    pub fn new(n: i32, d: i32) -> Self {
        Self { n, d }
    }
}

/// One ledger operation. Transactions carry an ordered list of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Move `amount` of `asset` to `destination`. A payment of a custom
    /// asset from its own issuer mints new supply.
    Payment {
        destination: String,
        asset: Asset,
        amount: i64,
    },

    /// Establish (or limit) a trust relationship from the source account
    /// to an asset or pool share. Required before the account can receive
    /// balances of that line.
    ChangeTrust {
        line: ChangeTrustLine,
        /// Maximum holdable amount; `None` means unlimited.
        limit: Option<i64>,
    },

    /// Adjust the source account's signing weights and thresholds.
    /// Setting `master_weight` to zero while raising thresholds locks the
    /// account permanently.
    SetOptions {
        master_weight: Option<u8>,
        low_threshold: Option<u8>,
        med_threshold: Option<u8>,
        high_threshold: Option<u8>,
    },

    /// Deposit both pool assets at a chosen ratio, bounded by explicit
    /// min/max prices as a slippage guard.
    LiquidityPoolDeposit {
        pool_id: PoolId,
        max_amount_a: i64,
        max_amount_b: i64,
        min_price: Price,
        max_price: Price,
    },

    /// Send an exact amount of one asset, delivering at least `dest_min`
    /// of another. An empty path means "route through any available pool".
    PathPaymentStrictSend {
        send_asset: Asset,
        send_amount: i64,
        destination: String,
        dest_asset: Asset,
        dest_min: i64,
        path: Vec<Asset>,
    },
}

/// Validity window for a transaction, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

/// An unsigned transaction bound to a source account's sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub source: String,
    pub sequence: i64,
    /// Total fee: base fee times operation count.
    pub fee: u32,
    pub network_passphrase: String,
    pub time_bounds: TimeBounds,
    pub operations: Vec<Operation>,
}

impl Transaction {
    /// The hash the source identity signs: SHA-256 over the network id
    /// followed by the canonical transaction bytes. Binding the network id
    /// keeps a testnet signature from replaying on another network.
    pub fn signature_payload(&self) -> WorkflowResult<[u8; 32]> {
        let body = serde_json::to_vec(self)
            .map_err(|e| WorkflowError::Signing(format!("transaction encode failed: {}", e)))?;
        let mut hasher = Sha256::new();
        hasher.update(network_id(&self.network_passphrase));
        hasher.update(&body);
        Ok(hasher.finalize().into())
    }

    /// Sign with the given identity, producing a submittable transaction.
    pub fn sign(self, identity: &Identity) -> WorkflowResult<SignedTransaction> {
        let payload = self.signature_payload()?;
        let signature = DecoratedSignature {
            hint: hex::encode(identity.signature_hint()),
            signature: hex::encode(identity.sign(&payload)),
        };
        Ok(SignedTransaction {
            transaction: self,
            signatures: vec![signature],
        })
    }
}

/// A signature plus the hint identifying which key produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratedSignature {
    pub hint: String,
    pub signature: String,
}

/// A transaction with its signatures, ready for submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl SignedTransaction {
    /// Wire encoding submitted to the ledger gateway.
    pub fn to_wire(&self) -> WorkflowResult<String> {
        use base64::Engine as _;
        let bytes = serde_json::to_vec(self)
            .map_err(|e| WorkflowError::Signing(format!("wire encode failed: {}", e)))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Decode the wire form. Used by test doubles standing in for the
    /// remote ledger.
    pub fn from_wire(wire: &str) -> WorkflowResult<Self> {
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(wire)
            .map_err(|e| WorkflowError::Envelope(format!("wire decode failed: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| WorkflowError::Envelope(format!("wire parse failed: {}", e)))
    }
}

/// Network identifier: hash of the network passphrase.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    hasher.finalize().into()
}

/// Builder composing operations against a freshly loaded account state.
pub struct TransactionBuilder {
    source: String,
    sequence: i64,
    base_fee: u32,
    network_passphrase: String,
    timeout_secs: u64,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    /// Start a transaction from the state loaded immediately prior.
    /// The transaction binds `state.sequence + 1`.
    pub fn new(state: &AccountState, base_fee: u32, network_passphrase: &str) -> Self {
        Self {
            source: state.account_id.clone(),
            sequence: state.sequence + 1,
            base_fee,
            network_passphrase: network_passphrase.to_string(),
            timeout_secs: 30,
            operations: Vec::new(),
        }
    }

    /// Validity window after which the network may reject the transaction
    /// as expired.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn add_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn build(self) -> WorkflowResult<Transaction> {
        if self.operations.is_empty() {
            return Err(WorkflowError::Signing(
                "transaction requires at least one operation".to_string(),
            ));
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WorkflowError::Signing(format!("clock error: {}", e)))?
            .as_secs();
        let fee = self
            .base_fee
            .saturating_mul(self.operations.len() as u32);
        Ok(Transaction {
            source: self.source,
            sequence: self.sequence,
            fee,
            network_passphrase: self.network_passphrase,
            time_bounds: TimeBounds {
                min_time: 0,
                max_time: now + self.timeout_secs,
            },
            operations: self.operations,
        })
    }
}
