//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Any installed metrics recorder
//! ```
//!
//! # Design Decisions
//! - Structured events carry the step name, account, and hash; the run
//!   report is derived from the same data, not from parsing logs
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
