//! Ledger Workflow Orchestrator Library
//!
//! Client-side orchestration of multi-step workflows against a blockchain
//! ledger API and a vault-management API: identity generation, faucet
//! funding, trustlines, asset issuance, liquidity pools, path-payment
//! swaps, and vault creation/deposit. The orchestrator owns the retrying
//! account-state loader and the ordered transaction pipelines; consensus,
//! on-chain cryptography, and AMM pricing belong to the remote ledger.

pub mod config;
pub mod ledger;
pub mod observability;
pub mod vault;
pub mod workflows;

pub use config::schema::OrchestratorConfig;
pub use ledger::client::{HorizonClient, LedgerGateway};
pub use ledger::types::{WorkflowError, WorkflowResult};
pub use vault::client::{VaultGateway, VaultGatewayClient};
