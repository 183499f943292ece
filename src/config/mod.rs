//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → OrchestratorConfig (validated, immutable)
//!     → passed by reference into gateway clients and workflows
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a run never reloads it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::NetworkConfig;
pub use schema::OrchestratorConfig;
pub use schema::RetryConfig;
pub use schema::VaultGatewayConfig;
