//! Vault descriptors and gateway envelope types.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ledger::keypair::Identity;
use crate::ledger::transaction::network_id;
use crate::ledger::types::{WorkflowError, WorkflowResult};

/// Role assignments for a vault. The workshop flow assigns one manager
/// identity to all four.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultRoles {
    pub emergency_manager: String,
    pub fee_receiver: String,
    pub manager: String,
    pub rebalance_manager: String,
}

impl VaultRoles {
    /// Fill every role with the same account.
    pub fn single(account_id: impl Into<String>) -> Self {
        let id = account_id.into();
        Self {
            emergency_manager: id.clone(),
            fee_receiver: id.clone(),
            manager: id.clone(),
            rebalance_manager: id,
        }
    }
}

/// One yield strategy a vault allocates into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAllocation {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub paused: bool,
}

/// An asset a vault manages, with its strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultAsset {
    pub address: String,
    pub strategies: Vec<StrategyAllocation>,
}

/// Full configuration for "create vault with initial deposit".
///
/// The vault's contract address is assigned by the remote system only
/// after creation succeeds; it is never known in advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultDescriptor {
    pub roles: VaultRoles,
    /// Vault fee in basis points.
    pub fee_bps: u32,
    pub assets: Vec<VaultAsset>,
    pub name: String,
    pub symbol: String,
    /// Initial deposit per asset, in base units.
    pub deposit_amounts: Vec<i128>,
    /// Account signing and funding the creation.
    pub caller: String,
}

/// A deposit into an existing vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    pub caller: String,
    /// Desired deposit per vault asset, in base units.
    pub amounts: Vec<i128>,
    /// Tolerated shortfall between desired and credited amounts.
    pub slippage_bps: u32,
    /// Whether deposited funds are immediately put to work in the
    /// underlying strategies, versus held idle in the vault.
    pub invest: bool,
}

/// Unsigned transaction envelope returned by the vault gateway.
///
/// Unlike ledger workflows, the client does not assemble the operations
/// itself: the gateway constructs the envelope and the client only signs
/// and submits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub xdr: String,
}

impl Envelope {
    /// Sign the envelope locally: hash the decoded payload under the
    /// network id and append the detached signature.
    pub fn sign(&self, identity: &Identity, network_passphrase: &str) -> WorkflowResult<SignedEnvelope> {
        let engine = base64::engine::general_purpose::STANDARD;
        let payload = engine
            .decode(&self.xdr)
            .map_err(|e| WorkflowError::Envelope(format!("envelope decode failed: {}", e)))?;

        let mut hasher = Sha256::new();
        hasher.update(network_id(network_passphrase));
        hasher.update(&payload);
        let digest: [u8; 32] = hasher.finalize().into();

        let mut signed = payload;
        signed.extend_from_slice(&identity.sign(&digest));
        Ok(SignedEnvelope {
            xdr: engine.encode(signed),
        })
    }
}

/// An envelope with the caller's signature appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub xdr: String,
}

/// Result of submitting a signed envelope through the vault gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    /// Structured return value of the invocation.
    #[serde(default)]
    pub return_value: serde_json::Value,
}

/// Pull the newly assigned vault contract address out of a creation
/// submission's return value.
pub fn extract_contract_address(response: &SendTransactionResponse) -> WorkflowResult<String> {
    let address = match &response.return_value {
        serde_json::Value::String(address) => address.clone(),
        value => value
            .get("address")
            .and_then(|a| a.as_str())
            .map(str::to_string)
            .unwrap_or_default(),
    };
    if address.is_empty() {
        return Err(WorkflowError::Envelope(
            "submission return value carries no contract address".to_string(),
        ));
    }
    Ok(address)
}
