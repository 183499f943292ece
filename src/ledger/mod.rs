//! Ledger client subsystem.
//!
//! # Data Flow
//! ```text
//! keypair.rs (identity generation, signing)
//!     → account.rs (state snapshots, retrying loader)
//!     → transaction.rs (operation composition, sequence binding, signing)
//!     → client.rs (Horizon-style read/submit/fund with error mapping)
//! ```
//!
//! # Security Constraints
//! - Secret keys exist only in process memory, never logged
//! - Signatures bind the network id; testnet transactions cannot replay
//!   elsewhere
//! - Every dependent step re-loads account state; snapshots are never
//!   reused across submissions

pub mod account;
pub mod asset;
pub mod client;
pub mod keypair;
pub mod transaction;
pub mod types;

pub use account::{load_account, AccountState, Balance};
pub use asset::{Asset, ChangeTrustLine, LiquidityPool, PoolId, TrustTarget};
pub use client::{HorizonClient, LedgerGateway};
pub use keypair::Identity;
pub use types::{RejectionPayload, SubmissionReceipt, WorkflowError, WorkflowResult};
