//! Asset issuance workflow.
//!
//! A fixed, ordered pipeline: generate identities, fund them, establish
//! trust, issue supply, lock the issuer, seed a liquidity pool, and swap
//! into the new asset. Each step that depends on a previous step's ledger
//! effect re-loads account state first, since sequence numbers advance with
//! every accepted transaction, including ones submitted by other steps in
//! the pipeline.
//!
//! The first failure anywhere aborts the run. Accepted submissions are
//! irreversible; there is no resume.

use crate::config::schema::{NetworkConfig, RetryConfig};
use crate::ledger::account::{load_account, summarize_balances, UNIT};
use crate::ledger::asset::{Asset, ChangeTrustLine, LiquidityPool, TrustTarget, POOL_FEE_BPS};
use crate::ledger::client::LedgerGateway;
use crate::ledger::keypair::Identity;
use crate::ledger::transaction::{Operation, Price};
use crate::ledger::types::{WorkflowError, WorkflowResult};
use crate::workflows::report::RunReport;
use crate::workflows::step::build_and_submit;

/// Tunable inputs of the issuance pipeline. Amounts are in base units.
#[derive(Debug, Clone)]
pub struct IssuanceParams {
    pub asset_code: String,
    /// Supply paid from the issuer to the holder.
    pub supply: i64,
    /// Native side of the initial pool deposit.
    pub pool_native_deposit: i64,
    /// Custom-asset side of the initial pool deposit.
    pub pool_asset_deposit: i64,
    pub pool_fee_bps: u32,
    /// Slippage guard on the deposit: accepted price range of the custom
    /// asset per native unit.
    pub min_price: Price,
    pub max_price: Price,
    /// Native amount the trader sends into the swap.
    pub swap_send_amount: i64,
    /// Minimum-received floor for the swap.
    pub swap_dest_min: i64,
}

impl Default for IssuanceParams {
    fn default() -> Self {
        Self {
            asset_code: "WORK".to_string(),
            supply: 1_000_000 * UNIT,
            pool_native_deposit: 1_000 * UNIT,
            pool_asset_deposit: 500_000 * UNIT,
            pool_fee_bps: POOL_FEE_BPS,
            // Deposit ratio is 500 custom per native; allow ±1%.
            min_price: Price::new(495, 1),
            max_price: Price::new(505, 1),
            swap_send_amount: 10 * UNIT,
            swap_dest_min: 4_500 * UNIT,
        }
    }
}

/// What a completed issuance run produced.
#[derive(Debug)]
pub struct IssuanceOutcome {
    pub asset: Asset,
    pub issuer: String,
    pub holder: String,
    pub trader: String,
    pub pool_id: String,
    /// Pool shares held by the holder after the deposit.
    pub pool_shares: i64,
    /// Custom-asset balance observed on the holder after the run.
    pub holder_asset_balance: i64,
    /// Custom-asset balance the trader received from the swap.
    pub trader_asset_balance: i64,
    pub report: RunReport,
}

/// Run the asset issuance pipeline end to end.
pub async fn run_asset_issuance<G: LedgerGateway + ?Sized>(
    ledger: &G,
    network: &NetworkConfig,
    retries: &RetryConfig,
    params: IssuanceParams,
) -> WorkflowResult<IssuanceOutcome> {
    if !Asset::is_valid_code(&params.asset_code) {
        return Err(WorkflowError::Signing(format!(
            "asset code '{}' is invalid",
            params.asset_code
        )));
    }

    let mut report = RunReport::new("asset-issuance");

    // Step 1: three fresh identities, owned by this run only.
    let issuer = Identity::generate();
    let holder = Identity::generate();
    let trader = Identity::generate();
    tracing::info!(
        issuer = %issuer.account_id(),
        holder = %holder.account_id(),
        trader = %trader.account_id(),
        "Identities generated"
    );
    report.record(
        "generate-identities",
        None,
        serde_json::json!({
            "issuer": issuer.account_id(),
            "holder": holder.account_id(),
            "trader": trader.account_id(),
        }),
    );

    // Step 2: faucet funding. Faucet failures are workflow-fatal; only the
    // account loader retries, when the funded state is slow to appear.
    for (name, identity) in [("issuer", &issuer), ("holder", &holder), ("trader", &trader)] {
        ledger.fund(&identity.account_id()).await?;
        tracing::info!(account = %identity.account_id(), who = name, "Faucet funding requested");
    }
    report.record("fund-identities", None, serde_json::Value::Null);

    // Step 3: define the asset. Pure local computation.
    let asset = Asset::issued(params.asset_code.clone(), issuer.account_id());
    report.record(
        "define-asset",
        None,
        serde_json::json!({ "asset": asset.to_string() }),
    );

    // Step 4: holder trusts the asset; required before it can hold any.
    let holder_state = load_account(ledger, &holder.account_id(), retries).await?;
    let receipt = build_and_submit(
        ledger,
        &holder_state,
        &holder,
        vec![Operation::ChangeTrust {
            line: ChangeTrustLine::Asset(asset.clone()),
            limit: None,
        }],
        network,
    )
    .await?;
    report.record("holder-trustline", Some(receipt.hash), serde_json::Value::Null);

    // Step 5: issuer pays the supply to the holder. A payment of a custom
    // asset from its own issuer mints new supply.
    let issuer_state = load_account(ledger, &issuer.account_id(), retries).await?;
    let receipt = build_and_submit(
        ledger,
        &issuer_state,
        &issuer,
        vec![Operation::Payment {
            destination: holder.account_id(),
            asset: asset.clone(),
            amount: params.supply,
        }],
        network,
    )
    .await?;
    report.record(
        "issue-supply",
        Some(receipt.hash),
        serde_json::json!({ "supply": params.supply }),
    );

    // Step 6: lock the issuer. Terminal and irreversible: the issuer can
    // never author another transaction, so this must be its last action.
    let issuer_state = load_account(ledger, &issuer.account_id(), retries).await?;
    let receipt = build_and_submit(
        ledger,
        &issuer_state,
        &issuer,
        vec![Operation::SetOptions {
            master_weight: Some(0),
            low_threshold: Some(1),
            med_threshold: Some(1),
            high_threshold: Some(1),
        }],
        network,
    )
    .await?;
    report.record("lock-issuer", Some(receipt.hash), serde_json::Value::Null);

    // Step 7: pool descriptor is derived locally; the holder trusts the
    // pool share, then deposits both sides under explicit price bounds.
    let pool = LiquidityPool::new(Asset::Native, asset.clone(), params.pool_fee_bps);
    let pool_id = pool.id();

    let holder_state = load_account(ledger, &holder.account_id(), retries).await?;
    let receipt = build_and_submit(
        ledger,
        &holder_state,
        &holder,
        vec![Operation::ChangeTrust {
            line: ChangeTrustLine::Pool(pool.clone()),
            limit: None,
        }],
        network,
    )
    .await?;
    report.record("pool-trustline", Some(receipt.hash), serde_json::Value::Null);

    let holder_state = load_account(ledger, &holder.account_id(), retries).await?;
    let receipt = build_and_submit(
        ledger,
        &holder_state,
        &holder,
        vec![Operation::LiquidityPoolDeposit {
            pool_id,
            max_amount_a: params.pool_native_deposit,
            max_amount_b: params.pool_asset_deposit,
            min_price: params.min_price,
            max_price: params.max_price,
        }],
        network,
    )
    .await?;
    report.record(
        "pool-deposit",
        Some(receipt.hash),
        serde_json::json!({
            "pool_id": pool_id.to_string(),
            "native": params.pool_native_deposit,
            "asset": params.pool_asset_deposit,
        }),
    );

    // Step 8: the trader trusts the asset, then swaps native for it with a
    // strict-send path payment. The empty path routes through any
    // available pool.
    let trader_state = load_account(ledger, &trader.account_id(), retries).await?;
    let receipt = build_and_submit(
        ledger,
        &trader_state,
        &trader,
        vec![Operation::ChangeTrust {
            line: ChangeTrustLine::Asset(asset.clone()),
            limit: None,
        }],
        network,
    )
    .await?;
    report.record("trader-trustline", Some(receipt.hash), serde_json::Value::Null);

    let trader_state = load_account(ledger, &trader.account_id(), retries).await?;
    let receipt = build_and_submit(
        ledger,
        &trader_state,
        &trader,
        vec![Operation::PathPaymentStrictSend {
            send_asset: Asset::Native,
            send_amount: params.swap_send_amount,
            destination: trader.account_id(),
            dest_asset: asset.clone(),
            dest_min: params.swap_dest_min,
            path: vec![],
        }],
        network,
    )
    .await?;
    report.record(
        "swap",
        Some(receipt.hash),
        serde_json::json!({ "sent": params.swap_send_amount }),
    );

    // Final reload for the report: balances as the wallet surface would
    // present them.
    let holder_state = load_account(ledger, &holder.account_id(), retries).await?;
    let trader_state = load_account(ledger, &trader.account_id(), retries).await?;
    let asset_line = TrustTarget::Asset(asset.clone());
    let pool_shares = holder_state
        .balance_of(&TrustTarget::Pool(pool_id))
        .unwrap_or(0);
    let holder_asset_balance = holder_state.balance_of(&asset_line).unwrap_or(0);
    let trader_asset_balance = trader_state.balance_of(&asset_line).unwrap_or(0);
    report.record(
        "final-balances",
        None,
        serde_json::json!({
            "holder": summarize_balances(&holder_state, "USDC"),
            "trader": summarize_balances(&trader_state, "USDC"),
            "pool_shares": pool_shares,
        }),
    );

    Ok(IssuanceOutcome {
        asset,
        issuer: issuer.account_id(),
        holder: holder.account_id(),
        trader: trader.account_id(),
        pool_id: pool_id.to_string(),
        pool_shares,
        holder_asset_balance,
        trader_asset_balance,
        report,
    })
}
