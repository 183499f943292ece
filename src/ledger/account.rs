//! Account state snapshots and the retrying state loader.
//!
//! # Responsibilities
//! - Represent a point-in-time snapshot of a ledger account
//! - Load that snapshot with bounded retry against asynchronous finality
//! - Classify balances into the wallet-facing view (native / stablecoin /
//!   other tokens)
//!
//! A snapshot is immutable once fetched. Any operation that needs newer
//! state must re-fetch: sequence numbers advance with every accepted
//! transaction, so a cached snapshot is stale the moment anything from the
//! same account is submitted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::schema::RetryConfig;
use crate::ledger::asset::{Asset, TrustTarget};
use crate::ledger::client::LedgerGateway;
use crate::ledger::types::{WorkflowError, WorkflowResult};
use crate::observability::metrics;

/// Base units per whole unit of any asset (7 decimal places).
pub const UNIT: i64 = 10_000_000;

/// One balance entry on an account: a trust line and the amount held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub line: TrustTarget,
    /// Amount in base units.
    pub amount: i64,
}

/// Snapshot of a ledger account as of the last successful load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    pub account_id: String,
    /// Per-account counter; a new transaction must bind exactly
    /// `sequence + 1`.
    pub sequence: i64,
    pub balances: Vec<Balance>,
}

impl AccountState {
    /// Amount held on the given line, if the account trusts it.
    pub fn balance_of(&self, line: &TrustTarget) -> Option<i64> {
        self.balances
            .iter()
            .find(|b| &b.line == line)
            .map(|b| b.amount)
    }

    /// Whether a trust relationship to the given line exists.
    pub fn has_trustline(&self, line: &TrustTarget) -> bool {
        self.balances.iter().any(|b| &b.line == line)
    }

    pub fn native_balance(&self) -> i64 {
        self.balance_of(&TrustTarget::Asset(Asset::Native))
            .unwrap_or(0)
    }
}

/// Wallet-facing classification of an account's balances.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    /// Native token balance in base units.
    pub native: i64,
    /// The stablecoin balance, when the account holds one.
    pub stablecoin: Option<Balance>,
    /// Every other token balance. Pool shares are excluded.
    pub other_tokens: Vec<Balance>,
}

/// Classify balances the way the wallet surface presents them.
pub fn summarize_balances(state: &AccountState, stablecoin_code: &str) -> BalanceSummary {
    let mut summary = BalanceSummary {
        native: 0,
        stablecoin: None,
        other_tokens: Vec::new(),
    };
    for balance in &state.balances {
        match &balance.line {
            TrustTarget::Asset(Asset::Native) => summary.native = balance.amount,
            TrustTarget::Asset(Asset::Issued { code, .. }) if code == stablecoin_code => {
                summary.stablecoin = Some(balance.clone());
            }
            TrustTarget::Asset(_) => summary.other_tokens.push(balance.clone()),
            TrustTarget::Pool(_) => {}
        }
    }
    summary
}

/// Parse a decimal amount string ("1000.1234567") into base units.
pub fn parse_amount(text: &str) -> WorkflowResult<i64> {
    let bad = |t: &str| WorkflowError::Envelope(format!("malformed amount '{}'", t));
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if frac.len() > 7 {
        return Err(bad(text));
    }
    let whole: i64 = whole.parse().map_err(|_| bad(text))?;
    let mut padded = frac.to_string();
    while padded.len() < 7 {
        padded.push('0');
    }
    let frac: i64 = if padded.is_empty() {
        0
    } else {
        padded.parse().map_err(|_| bad(text))?
    };
    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| bad(text))
}

/// Format base units as a decimal amount string.
pub fn format_amount(amount: i64) -> String {
    format!("{}.{:07}", amount / UNIT, (amount % UNIT).abs())
}

/// Load current account state with bounded retry.
///
/// The ledger has asynchronous finality: a just-funded or just-updated
/// account may not be immediately visible, so the first failure is not
/// authoritative. The first attempt is direct; each failure `i` (0-indexed)
/// waits `(i + 1) * retry step` before the next attempt, up to
/// `max_retries` retries. Exhaustion fails with
/// [`WorkflowError::RetryExhausted`] wrapping the last fetch error.
///
/// Never caches: every call re-fetches, since sequence numbers must be
/// current at transaction-build time.
pub async fn load_account<G: LedgerGateway + ?Sized>(
    gateway: &G,
    account_id: &str,
    retry: &RetryConfig,
) -> WorkflowResult<AccountState> {
    let attempts = retry.max_retries + 1;
    for attempt in 0..attempts {
        metrics::record_account_load_attempt();
        match gateway.get_account(account_id).await {
            Ok(state) => {
                tracing::debug!(
                    account = %account_id,
                    sequence = state.sequence,
                    attempt = attempt + 1,
                    "Account state loaded"
                );
                return Ok(state);
            }
            Err(err) if attempt + 1 == attempts => {
                metrics::record_account_load_exhausted();
                tracing::error!(
                    account = %account_id,
                    attempts = attempts,
                    error = %err,
                    "Account state unobservable, retries exhausted"
                );
                return Err(WorkflowError::RetryExhausted {
                    attempts,
                    source: Box::new(err),
                });
            }
            Err(err) => {
                let delay = Duration::from_millis((u64::from(attempt) + 1) * retry.delay_step_ms);
                tracing::warn!(
                    account = %account_id,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Account fetch failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    unreachable!("loader always returns within the attempt loop")
}
