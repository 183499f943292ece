//! Workflow orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! step.rs (load-bound build/sign/submit unit)
//!     → issuance.rs (8-step asset issuance pipeline)
//!     → vault_deposit.rs (6-step vault create + deposit pipeline)
//!     → report.rs (structured run summaries)
//! ```
//!
//! # Design Decisions
//! - Steps execute strictly sequentially: each depends on the
//!   ledger-visible effect of the previous one
//! - Every ledger-effect-dependent step re-loads account state; snapshots
//!   are never reused across submissions
//! - The first error result short-circuits the pipeline; no compensation
//!   is attempted

pub mod issuance;
pub mod report;
pub mod step;
pub mod vault_deposit;

pub use issuance::{run_asset_issuance, IssuanceOutcome, IssuanceParams};
pub use report::{RunReport, StepRecord};
pub use step::build_and_submit;
pub use vault_deposit::{run_vault_create_and_deposit, VaultOutcome, VaultParams};
