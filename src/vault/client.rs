//! Vault gateway client.
//!
//! # Responsibilities
//! - Request transaction construction from the vault-management API
//! - Submit signed envelopes and surface structured results
//!
//! The gateway returns unsigned envelopes the client signs locally; any
//! structured failure aborts the workflow run without retry.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::config::schema::VaultGatewayConfig;
use crate::ledger::types::{RejectionPayload, WorkflowError, WorkflowResult};
use crate::observability::metrics;
use crate::vault::types::{
    DepositRequest, Envelope, SendTransactionResponse, SignedEnvelope, VaultDescriptor,
};

/// The consumed vault-management contract.
#[async_trait]
pub trait VaultGateway: Send + Sync {
    /// Construct a "create vault with initial deposit" transaction.
    async fn create_vault_with_deposit(
        &self,
        descriptor: &VaultDescriptor,
    ) -> WorkflowResult<Envelope>;

    /// Construct a "deposit" transaction scoped to an existing vault
    /// contract.
    async fn deposit_to_vault(
        &self,
        contract: &str,
        request: &DepositRequest,
    ) -> WorkflowResult<Envelope>;

    /// Submit a signed envelope and return the structured result.
    async fn send_transaction(
        &self,
        envelope: &SignedEnvelope,
    ) -> WorkflowResult<SendTransactionResponse>;
}

/// HTTP client for the vault-management API.
pub struct VaultGatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl VaultGatewayClient {
    pub fn new(config: &VaultGatewayConfig) -> WorkflowResult<Self> {
        let base_url: Url = config.url.parse().map_err(|e| {
            WorkflowError::GatewayUnavailable(format!(
                "invalid vault gateway url '{}': {}",
                config.url, e
            ))
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| WorkflowError::GatewayUnavailable(format!("http client: {}", e)))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> WorkflowResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| WorkflowError::GatewayUnavailable(format!("bad endpoint {}: {}", path, e)))
    }

    async fn post_for<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> WorkflowResult<T> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                WorkflowError::GatewayUnavailable(format!("vault gateway {}: {}", path, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::record_gateway_call("vault", false);
            let raw: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(WorkflowError::SubmissionRejected {
                payload: RejectionPayload {
                    status: Some(status.as_u16()),
                    transaction_code: raw
                        .get("code")
                        .and_then(|c| c.as_str())
                        .map(str::to_string),
                    operation_codes: Vec::new(),
                    detail: raw
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string),
                    raw,
                },
            });
        }

        metrics::record_gateway_call("vault", true);
        response.json().await.map_err(|e| {
            WorkflowError::GatewayUnavailable(format!("vault gateway {} parse: {}", path, e))
        })
    }
}

#[async_trait]
impl VaultGateway for VaultGatewayClient {
    async fn create_vault_with_deposit(
        &self,
        descriptor: &VaultDescriptor,
    ) -> WorkflowResult<Envelope> {
        tracing::debug!(name = %descriptor.name, fee_bps = descriptor.fee_bps, "Requesting vault creation envelope");
        self.post_for("vault", descriptor).await
    }

    async fn deposit_to_vault(
        &self,
        contract: &str,
        request: &DepositRequest,
    ) -> WorkflowResult<Envelope> {
        tracing::debug!(contract = %contract, invest = request.invest, "Requesting deposit envelope");
        self.post_for(&format!("vault/{}/deposit", contract), request)
            .await
    }

    async fn send_transaction(
        &self,
        envelope: &SignedEnvelope,
    ) -> WorkflowResult<SendTransactionResponse> {
        self.post_for("send", envelope).await
    }
}
