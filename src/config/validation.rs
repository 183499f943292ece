//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (fees > 0, bps within scale, timeouts > 0)
//! - Check endpoint URLs actually parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: OrchestratorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::OrchestratorConfig;

/// Basis point scale: 100% in bps.
const BPS_SCALE: u32 = 10_000;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &OrchestratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut check = |ok: bool, field: &str, message: &str| {
        if !ok {
            errors.push(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
    };

    let is_url = |value: &str| value.parse::<Url>().is_ok();

    check(
        is_url(&config.network.horizon_url),
        "network.horizon_url",
        "must be a valid URL",
    );
    check(
        is_url(&config.network.friendbot_url),
        "network.friendbot_url",
        "must be a valid URL",
    );
    check(
        is_url(&config.network.rpc_url),
        "network.rpc_url",
        "must be a valid URL",
    );
    check(
        !config.network.network_passphrase.is_empty(),
        "network.network_passphrase",
        "must not be empty",
    );
    check(
        config.network.base_fee > 0,
        "network.base_fee",
        "must be positive",
    );
    check(
        config.network.tx_timeout_secs > 0,
        "network.tx_timeout_secs",
        "must be positive",
    );
    check(
        config.network.http_timeout_secs > 0,
        "network.http_timeout_secs",
        "must be positive",
    );

    check(
        is_url(&config.vault_gateway.url),
        "vault_gateway.url",
        "must be a valid URL",
    );
    check(
        config.vault_gateway.slippage_bps <= BPS_SCALE,
        "vault_gateway.slippage_bps",
        "must not exceed 10000",
    );
    check(
        config.vault_gateway.http_timeout_secs > 0,
        "vault_gateway.http_timeout_secs",
        "must be positive",
    );

    check(
        config.retries.delay_step_ms > 0,
        "retries.delay_step_ms",
        "must be positive",
    );

    check(
        matches!(
            config.observability.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ),
        "observability.log_level",
        "must be one of trace, debug, info, warn, error",
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
