//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! workflow orchestrator. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Ledger network endpoints and transaction parameters.
    pub network: NetworkConfig,

    /// Vault-management gateway settings.
    pub vault_gateway: VaultGatewayConfig,

    /// Account loader retry settings.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Horizon-style read/submit API base URL.
    pub horizon_url: String,

    /// Testnet faucet endpoint.
    pub friendbot_url: String,

    /// JSON-RPC endpoint carrying the airdrop facility.
    pub rpc_url: String,

    /// Network passphrase; hashed into every signature payload.
    pub network_passphrase: String,

    /// Fixed base fee per operation, in base units.
    pub base_fee: u32,

    /// Transaction validity window in seconds. Bounds transaction
    /// validity, not the overall workflow.
    pub tx_timeout_secs: u64,

    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            horizon_url: "https://horizon-testnet.stellar.org".to_string(),
            friendbot_url: "https://friendbot.stellar.org".to_string(),
            rpc_url: "https://soroban-testnet.stellar.org".to_string(),
            network_passphrase: "Test SDF Network ; September 2015".to_string(),
            base_fee: 100,
            tx_timeout_secs: 30,
            http_timeout_secs: 30,
        }
    }
}

/// Vault gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VaultGatewayConfig {
    /// Vault-management API base URL.
    pub url: String,

    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,

    /// Fixed wait before submitting a deposit envelope, giving the
    /// gateway headroom to propagate its own state. Not a correctness
    /// guarantee.
    pub settle_delay_ms: u64,

    /// Default slippage tolerance for deposits, in basis points.
    pub slippage_bps: u32,

    /// Whether deposits are put to work in strategies immediately.
    pub invest: bool,
}

impl Default for VaultGatewayConfig {
    fn default() -> Self {
        Self {
            url: "https://api.defindex.io".to_string(),
            http_timeout_secs: 30,
            settle_delay_ms: 1000,
            slippage_bps: 100,
            invest: true,
        }
    }
}

/// Account loader retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum retries after the initial fetch attempt.
    pub max_retries: u32,

    /// Step of the linear backoff schedule: failure `i` waits
    /// `(i + 1) * delay_step_ms` before the next attempt.
    pub delay_step_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay_step_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
