//! Vault-management subsystem.
//!
//! # Data Flow
//! ```text
//! types.rs (descriptor, deposit request)
//!     → client.rs (gateway constructs unsigned envelope)
//!     → types.rs Envelope::sign (local signing under the network id)
//!     → client.rs send_transaction (submission, structured result)
//! ```

pub mod client;
pub mod types;

pub use client::{VaultGateway, VaultGatewayClient};
pub use types::{
    extract_contract_address, DepositRequest, Envelope, SendTransactionResponse, SignedEnvelope,
    StrategyAllocation, VaultAsset, VaultDescriptor, VaultRoles,
};
