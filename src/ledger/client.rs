//! Ledger gateway client with timeout and error mapping.
//!
//! # Responsibilities
//! - Fetch account snapshots from the Horizon-style read API
//! - Submit signed transactions and map structured rejections
//! - Drive the faucet and the JSON-RPC airdrop facility
//!
//! Transport failures map to [`WorkflowError::GatewayUnavailable`];
//! structured rejections keep their payload in
//! [`WorkflowError::SubmissionRejected`]. The client itself never retries;
//! bounded retry belongs to the account loader alone.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::schema::NetworkConfig;
use crate::ledger::account::{parse_amount, AccountState, Balance};
use crate::ledger::asset::{Asset, PoolId, TrustTarget};
use crate::ledger::transaction::SignedTransaction;
use crate::ledger::types::{
    RejectionPayload, SubmissionReceipt, WorkflowError, WorkflowResult,
};
use crate::observability::metrics;

/// The consumed ledger contract. Workflows depend on this seam so test
/// doubles can stand in for the remote ledger.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetch the current snapshot of an account. Fails while the account
    /// is not yet visible.
    async fn get_account(&self, account_id: &str) -> WorkflowResult<AccountState>;

    /// Submit a signed transaction. Irreversible once accepted.
    async fn submit(&self, tx: &SignedTransaction) -> WorkflowResult<SubmissionReceipt>;

    /// Fund a testnet account via the faucet. Idempotent-ish and
    /// eventually consistent; observe the result through `get_account`.
    async fn fund(&self, account_id: &str) -> WorkflowResult<()>;

    /// Fund via the network's JSON-RPC airdrop facility. Same semantic
    /// contract as the faucet, distinct mechanism.
    async fn airdrop(&self, account_id: &str) -> WorkflowResult<()>;
}

/// HTTP client for the Horizon-style ledger API.
pub struct HorizonClient {
    http: reqwest::Client,
    horizon_url: Url,
    friendbot_url: Url,
    rpc_url: Url,
}

impl HorizonClient {
    pub fn new(config: &NetworkConfig) -> WorkflowResult<Self> {
        let parse = |name: &str, value: &str| -> WorkflowResult<Url> {
            value.parse().map_err(|e| {
                WorkflowError::GatewayUnavailable(format!("invalid {} '{}': {}", name, value, e))
            })
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| WorkflowError::GatewayUnavailable(format!("http client: {}", e)))?;
        Ok(Self {
            http,
            horizon_url: parse("horizon url", &config.horizon_url)?,
            friendbot_url: parse("friendbot url", &config.friendbot_url)?,
            rpc_url: parse("rpc url", &config.rpc_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> WorkflowResult<Url> {
        self.horizon_url
            .join(path)
            .map_err(|e| WorkflowError::GatewayUnavailable(format!("bad endpoint {}: {}", path, e)))
    }
}

fn transport(context: &str, err: reqwest::Error) -> WorkflowError {
    WorkflowError::GatewayUnavailable(format!("{}: {}", context, err))
}

/// Horizon-style account representation.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    account_id: String,
    sequence: String,
    balances: Vec<BalanceResponse>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    asset_type: String,
    #[serde(default)]
    asset_code: Option<String>,
    #[serde(default)]
    asset_issuer: Option<String>,
    #[serde(default)]
    liquidity_pool_id: Option<String>,
    balance: String,
}

impl BalanceResponse {
    fn into_balance(self) -> WorkflowResult<Balance> {
        let malformed = |what: &str| WorkflowError::Envelope(format!("balance missing {}", what));
        let line = match self.asset_type.as_str() {
            "native" => TrustTarget::Asset(Asset::Native),
            "liquidity_pool_shares" => {
                let id = self.liquidity_pool_id.ok_or_else(|| malformed("pool id"))?;
                let bytes: [u8; 32] = hex::decode(&id)
                    .map_err(|e| WorkflowError::Envelope(format!("bad pool id: {}", e)))?
                    .try_into()
                    .map_err(|_| WorkflowError::Envelope("pool id must be 32 bytes".into()))?;
                TrustTarget::Pool(PoolId(bytes))
            }
            _ => TrustTarget::Asset(Asset::issued(
                self.asset_code.ok_or_else(|| malformed("code"))?,
                self.asset_issuer.ok_or_else(|| malformed("issuer"))?,
            )),
        };
        Ok(Balance {
            line,
            amount: parse_amount(&self.balance)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    hash: String,
    #[serde(default)]
    ledger: Option<u64>,
    #[serde(default)]
    return_value: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    extras: ErrorExtras,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorExtras {
    #[serde(default)]
    result_codes: ResultCodes,
}

#[derive(Debug, Deserialize, Default)]
struct ResultCodes {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    operations: Vec<String>,
}

/// Interpret a non-success gateway body as a structured rejection.
async fn rejection_from(response: reqwest::Response) -> WorkflowError {
    let status = response.status().as_u16();
    let raw: serde_json::Value = match response.json().await {
        Ok(value) => value,
        Err(err) => {
            return WorkflowError::GatewayUnavailable(format!(
                "gateway returned {} with unreadable body: {}",
                status, err
            ))
        }
    };
    let parsed: ErrorResponse = serde_json::from_value(raw.clone()).unwrap_or_default();
    WorkflowError::SubmissionRejected {
        payload: RejectionPayload {
            status: Some(status),
            transaction_code: parsed.extras.result_codes.transaction,
            operation_codes: parsed.extras.result_codes.operations,
            detail: parsed.detail,
            raw,
        },
    }
}

#[async_trait]
impl LedgerGateway for HorizonClient {
    async fn get_account(&self, account_id: &str) -> WorkflowResult<AccountState> {
        let url = self.endpoint(&format!("accounts/{}", account_id))?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport("account fetch", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            metrics::record_gateway_call("horizon", false);
            return Err(WorkflowError::AccountNotVisible(account_id.to_string()));
        }
        if !response.status().is_success() {
            metrics::record_gateway_call("horizon", false);
            return Err(WorkflowError::GatewayUnavailable(format!(
                "account fetch returned {}",
                response.status()
            )));
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| transport("account parse", e))?;
        metrics::record_gateway_call("horizon", true);

        let sequence: i64 = account.sequence.parse().map_err(|e| {
            WorkflowError::Envelope(format!("bad sequence '{}': {}", account.sequence, e))
        })?;
        let balances = account
            .balances
            .into_iter()
            .map(BalanceResponse::into_balance)
            .collect::<WorkflowResult<Vec<_>>>()?;

        Ok(AccountState {
            account_id: account.account_id,
            sequence,
            balances,
        })
    }

    async fn submit(&self, tx: &SignedTransaction) -> WorkflowResult<SubmissionReceipt> {
        let url = self.endpoint("transactions")?;
        let wire = tx.to_wire()?;
        let response = self
            .http
            .post(url)
            .form(&[("tx", wire.as_str())])
            .send()
            .await
            .map_err(|e| transport("transaction submit", e))?;

        if !response.status().is_success() {
            metrics::record_submission(false);
            return Err(rejection_from(response).await);
        }

        let accepted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| transport("receipt parse", e))?;
        metrics::record_submission(true);
        tracing::debug!(hash = %accepted.hash, ledger = ?accepted.ledger, "Transaction accepted");

        Ok(SubmissionReceipt {
            hash: accepted.hash,
            ledger: accepted.ledger,
            return_value: accepted.return_value,
        })
    }

    async fn fund(&self, account_id: &str) -> WorkflowResult<()> {
        let mut url = self.friendbot_url.clone();
        url.query_pairs_mut().append_pair("addr", account_id);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport("faucet", e))?;

        let ok = response.status().is_success();
        metrics::record_gateway_call("friendbot", ok);
        if !ok {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::GatewayUnavailable(format!(
                "faucet returned {}: {}",
                status, body
            )));
        }
        tracing::debug!(account = %account_id, "Faucet funding requested");
        Ok(())
    }

    async fn airdrop(&self, account_id: &str) -> WorkflowResult<()> {
        #[derive(Debug, Deserialize)]
        struct RpcResponse {
            #[serde(default)]
            error: Option<serde_json::Value>,
        }

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "requestAirdrop",
            "params": { "address": account_id },
        });
        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport("airdrop", e))?;

        if !response.status().is_success() {
            metrics::record_gateway_call("rpc", false);
            return Err(WorkflowError::GatewayUnavailable(format!(
                "airdrop returned {}",
                response.status()
            )));
        }
        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| transport("airdrop parse", e))?;
        if let Some(error) = parsed.error {
            metrics::record_gateway_call("rpc", false);
            return Err(WorkflowError::GatewayUnavailable(format!(
                "airdrop error: {}",
                error
            )));
        }
        metrics::record_gateway_call("rpc", true);
        tracing::debug!(account = %account_id, "Airdrop requested");
        Ok(())
    }
}
