//! Vault creation and deposit workflow.
//!
//! Unlike the issuance pipeline, the client does not assemble operations
//! here: the vault gateway constructs unsigned envelopes, and the client's
//! job is to sign them with the right identity and submit. Any structured
//! gateway failure aborts the entire run; no partial retry or resume
//! beyond the account loader's own bounded retry.

use std::time::Duration;

use crate::config::schema::{NetworkConfig, RetryConfig};
use crate::ledger::account::load_account;
use crate::ledger::client::LedgerGateway;
use crate::ledger::keypair::Identity;
use crate::ledger::types::WorkflowResult;
use crate::vault::client::VaultGateway;
use crate::vault::types::{
    extract_contract_address, DepositRequest, StrategyAllocation, VaultAsset, VaultDescriptor,
    VaultRoles,
};
use crate::workflows::report::RunReport;

/// Tunable inputs of the vault pipeline. Amounts are in base units of the
/// vault's underlying asset contract.
#[derive(Debug, Clone)]
pub struct VaultParams {
    /// Contract address of the asset the vault manages.
    pub asset_address: String,
    /// Strategy allocated for that asset.
    pub strategy_address: String,
    pub strategy_name: String,
    /// Vault fee in basis points.
    pub fee_bps: u32,
    pub name: String,
    pub symbol: String,
    /// Deposit made atomically with vault creation.
    pub initial_deposit: i128,
    /// Second deposit, made by the separate depositor identity.
    pub deposit_amount: i128,
    pub slippage_bps: u32,
    /// Whether the deposit is immediately put to work in strategies.
    pub invest: bool,
}

impl Default for VaultParams {
    fn default() -> Self {
        Self {
            asset_address: "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC".to_string(),
            strategy_address: "CBXHU4HHFJZAXJMDYMUXPQLJBM2ADGSM4TUCBZHSMSSCK4MCWBZXM7GH".to_string(),
            strategy_name: "blend-fixed".to_string(),
            fee_bps: 100,
            name: "Workshop Vault".to_string(),
            symbol: "WSHV".to_string(),
            initial_deposit: 100_000_000,
            deposit_amount: 50_000_000,
            slippage_bps: 100,
            invest: true,
        }
    }
}

/// What a completed vault run produced.
#[derive(Debug)]
pub struct VaultOutcome {
    /// Contract address assigned by the remote system at creation.
    pub contract_address: String,
    pub manager: String,
    pub depositor: String,
    /// Structured return value of the deposit submission.
    pub deposit_result: serde_json::Value,
    pub report: RunReport,
}

/// Run the vault creation and deposit pipeline end to end.
pub async fn run_vault_create_and_deposit<L, V>(
    ledger: &L,
    vault: &V,
    network: &NetworkConfig,
    retries: &RetryConfig,
    settle_delay: Duration,
    params: VaultParams,
) -> WorkflowResult<VaultOutcome>
where
    L: LedgerGateway + ?Sized,
    V: VaultGateway + ?Sized,
{
    let mut report = RunReport::new("vault-create-deposit");

    // Step 1: manager identity, funded through the airdrop facility. The
    // loader's bounded retry absorbs the airdrop's eventual consistency.
    let manager = Identity::generate();
    ledger.airdrop(&manager.account_id()).await?;
    let manager_state = load_account(ledger, &manager.account_id(), retries).await?;
    tracing::info!(
        manager = %manager.account_id(),
        balance = manager_state.native_balance(),
        "Manager funded"
    );
    report.record(
        "fund-manager",
        None,
        serde_json::json!({ "manager": manager.account_id() }),
    );

    // Step 2: descriptor with the manager in all four roles.
    let descriptor = VaultDescriptor {
        roles: VaultRoles::single(manager.account_id()),
        fee_bps: params.fee_bps,
        assets: vec![VaultAsset {
            address: params.asset_address.clone(),
            strategies: vec![StrategyAllocation {
                address: params.strategy_address.clone(),
                name: params.strategy_name.clone(),
                paused: false,
            }],
        }],
        name: params.name.clone(),
        symbol: params.symbol.clone(),
        deposit_amounts: vec![params.initial_deposit],
        caller: manager.account_id(),
    };

    // Steps 3-4: gateway constructs the creation envelope; sign locally,
    // submit, and extract the assigned contract address.
    let envelope = vault.create_vault_with_deposit(&descriptor).await?;
    let signed = envelope.sign(&manager, &network.network_passphrase)?;
    let response = vault.send_transaction(&signed).await?;
    let contract_address = extract_contract_address(&response)?;
    tracing::info!(contract = %contract_address, "Vault created");
    report.record(
        "create-vault",
        response.hash.clone(),
        serde_json::json!({
            "contract": contract_address,
            "initial_deposit": params.initial_deposit.to_string(),
        }),
    );

    // Step 5: a separate depositor identity, funded the same way, asks the
    // gateway for a deposit envelope scoped to the new contract.
    let depositor = Identity::generate();
    ledger.airdrop(&depositor.account_id()).await?;
    load_account(ledger, &depositor.account_id(), retries).await?;
    report.record(
        "fund-depositor",
        None,
        serde_json::json!({ "depositor": depositor.account_id() }),
    );

    let request = DepositRequest {
        caller: depositor.account_id(),
        amounts: vec![params.deposit_amount],
        slippage_bps: params.slippage_bps,
        invest: params.invest,
    };
    let envelope = vault.deposit_to_vault(&contract_address, &request).await?;
    let signed = envelope.sign(&depositor, &network.network_passphrase)?;

    // Step 6: fixed settle delay before submission. Headroom for the
    // gateway's own state propagation, not a correctness guarantee.
    if !settle_delay.is_zero() {
        tracing::debug!(delay_ms = settle_delay.as_millis() as u64, "Settle delay");
        tokio::time::sleep(settle_delay).await;
    }
    let response = vault.send_transaction(&signed).await?;
    report.record(
        "deposit",
        response.hash.clone(),
        serde_json::json!({
            "amount": params.deposit_amount.to_string(),
            "invest": params.invest,
        }),
    );

    Ok(VaultOutcome {
        contract_address,
        manager: manager.account_id(),
        depositor: depositor.account_id(),
        deposit_result: response.return_value,
        report,
    })
}
