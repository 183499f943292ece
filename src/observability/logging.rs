//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for a workflow run
//! - Respect `RUST_LOG` when set, falling back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Workflow steps narrate through events with structured fields, never
//!   bare prints; the final report is the only stdout output

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging subsystem. `level` is the fallback filter when
/// `RUST_LOG` is not set.
pub fn init(level: &str) {
    let fallback = format!("ledger_workflows={}", level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
