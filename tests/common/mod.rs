//! Shared in-memory fakes for integration testing.
//!
//! `FakeLedger` enforces the rules the workflows depend on: sequence
//! numbers must advance, custom assets require trust, a zero master
//! weight locks an account, pool deposits mint shares, and path payments
//! route through registered pools. `FakeVaultGateway` mirrors the
//! construct-sign-submit contract of the vault-management API.

// Each integration test binary compiles this module and uses a subset.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use ledger_workflows::ledger::account::{AccountState, Balance, UNIT};
use ledger_workflows::ledger::asset::{Asset, ChangeTrustLine, LiquidityPool, TrustTarget};
use ledger_workflows::ledger::client::LedgerGateway;
use ledger_workflows::ledger::transaction::{network_id, Operation, SignedTransaction};
use ledger_workflows::ledger::types::{
    RejectionPayload, SubmissionReceipt, WorkflowError, WorkflowResult,
};
use ledger_workflows::vault::client::VaultGateway;
use ledger_workflows::vault::types::{
    DepositRequest, Envelope, SendTransactionResponse, SignedEnvelope, VaultDescriptor,
};

/// Native balance granted by the fake faucet and airdrop.
pub const FAUCET_GRANT: i64 = 10_000 * UNIT;

#[derive(Debug, Clone)]
struct FakeAccount {
    sequence: i64,
    master_weight: u8,
    balances: HashMap<TrustTarget, i64>,
}

impl FakeAccount {
    fn trusts(&self, line: &TrustTarget) -> bool {
        self.balances.contains_key(line)
    }
}

#[derive(Debug, Clone)]
struct PoolState {
    pool: LiquidityPool,
    reserve_a: i64,
    reserve_b: i64,
    shares: i64,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<String, FakeAccount>,
    pools: HashMap<TrustTarget, PoolState>,
    created: u64,
    ledger_height: u64,
    /// Remaining loads for which an account stays invisible.
    hidden: HashMap<String, u32>,
}

/// In-memory stand-in for the remote ledger.
#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<LedgerState>,
    /// Loads a freshly funded account stays invisible for, simulating
    /// asynchronous finality.
    visibility_lag: AtomicU32,
}

fn reject_tx(code: &str) -> WorkflowError {
    WorkflowError::SubmissionRejected {
        payload: RejectionPayload::transaction(code),
    }
}

fn reject_op(code: &str) -> WorkflowError {
    WorkflowError::SubmissionRejected {
        payload: RejectionPayload::operations("tx_failed", &[code]),
    }
}

fn isqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let mut x = value;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Newly funded accounts stay invisible for `loads` fetches.
    pub fn set_visibility_lag(&self, loads: u32) {
        self.visibility_lag.store(loads, Ordering::SeqCst);
    }

    pub fn account_exists(&self, account_id: &str) -> bool {
        self.state.lock().unwrap().accounts.contains_key(account_id)
    }

    fn create_or_top_up(&self, account_id: &str) {
        let mut state = self.state.lock().unwrap();
        let lag = self.visibility_lag.load(Ordering::SeqCst);
        match state.accounts.get_mut(account_id) {
            Some(account) => {
                *account
                    .balances
                    .entry(TrustTarget::Asset(Asset::Native))
                    .or_insert(0) += FAUCET_GRANT;
            }
            None => {
                state.created += 1;
                let sequence = (state.created as i64) << 32;
                let mut balances = HashMap::new();
                balances.insert(TrustTarget::Asset(Asset::Native), FAUCET_GRANT);
                state.accounts.insert(
                    account_id.to_string(),
                    FakeAccount {
                        sequence,
                        master_weight: 1,
                        balances,
                    },
                );
                if lag > 0 {
                    state.hidden.insert(account_id.to_string(), lag);
                }
            }
        }
    }

    fn verify_signatures(&self, tx: &SignedTransaction) -> Result<(), WorkflowError> {
        let key_bytes: [u8; 32] = hex::decode(&tx.transaction.source)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| reject_tx("tx_bad_auth"))?;
        let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| reject_tx("tx_bad_auth"))?;
        let payload = tx
            .transaction
            .signature_payload()
            .map_err(|_| reject_tx("tx_bad_auth"))?;

        if tx.signatures.is_empty() {
            return Err(reject_tx("tx_bad_auth"));
        }
        for decorated in &tx.signatures {
            let sig_bytes: [u8; 64] = hex::decode(&decorated.signature)
                .ok()
                .and_then(|b| b.try_into().ok())
                .ok_or_else(|| reject_tx("tx_bad_auth"))?;
            let signature = Signature::from_bytes(&sig_bytes);
            key.verify(&payload, &signature)
                .map_err(|_| reject_tx("tx_bad_auth"))?;
        }
        Ok(())
    }

    fn apply_operation(
        state: &mut LedgerState,
        source_id: &str,
        operation: &Operation,
    ) -> Result<(), WorkflowError> {
        match operation {
            Operation::Payment {
                destination,
                asset,
                amount,
            } => {
                let line = TrustTarget::Asset(asset.clone());
                let minting = matches!(asset, Asset::Issued { issuer, .. } if issuer == source_id);

                if !minting {
                    let source = state.accounts.get_mut(source_id).unwrap();
                    let balance = source.balances.get_mut(&line).ok_or_else(|| {
                        reject_op("op_src_no_trust")
                    })?;
                    if *balance < *amount {
                        return Err(reject_op("op_underfunded"));
                    }
                    *balance -= amount;
                }

                let dest = state
                    .accounts
                    .get_mut(destination)
                    .ok_or_else(|| reject_op("op_no_destination"))?;
                if matches!(asset, Asset::Issued { .. }) && !dest.trusts(&line) {
                    return Err(reject_op("op_no_trust"));
                }
                *dest.balances.entry(line).or_insert(0) += amount;
                Ok(())
            }

            Operation::ChangeTrust { line, .. } => {
                if let ChangeTrustLine::Pool(pool) = line {
                    state
                        .pools
                        .entry(TrustTarget::Pool(pool.id()))
                        .or_insert_with(|| PoolState {
                            pool: pool.clone(),
                            reserve_a: 0,
                            reserve_b: 0,
                            shares: 0,
                        });
                }
                let source = state.accounts.get_mut(source_id).unwrap();
                source.balances.entry(line.target()).or_insert(0);
                Ok(())
            }

            Operation::SetOptions { master_weight, .. } => {
                if let Some(weight) = master_weight {
                    state.accounts.get_mut(source_id).unwrap().master_weight = *weight;
                }
                Ok(())
            }

            Operation::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price,
                max_price,
            } => {
                let share_line = TrustTarget::Pool(*pool_id);
                {
                    let source = state.accounts.get(source_id).unwrap();
                    if !source.trusts(&share_line) {
                        return Err(reject_op("op_no_trust"));
                    }
                }
                // Deposit price of asset B per asset A must sit inside the
                // caller's bounds.
                let a = i128::from(*max_amount_a);
                let b = i128::from(*max_amount_b);
                if b * i128::from(min_price.d) < i128::from(min_price.n) * a
                    || b * i128::from(max_price.d) > i128::from(max_price.n) * a
                {
                    return Err(reject_op("op_bad_price"));
                }

                let (line_a, line_b) = {
                    let pool = state
                        .pools
                        .get(&share_line)
                        .ok_or_else(|| reject_op("op_no_trust"))?;
                    (
                        TrustTarget::Asset(pool.pool.asset_a.clone()),
                        TrustTarget::Asset(pool.pool.asset_b.clone()),
                    )
                };

                let source = state.accounts.get_mut(source_id).unwrap();
                for (line, amount) in [(&line_a, max_amount_a), (&line_b, max_amount_b)] {
                    let balance = source
                        .balances
                        .get(line)
                        .copied()
                        .ok_or_else(|| reject_op("op_underfunded"))?;
                    if balance < *amount {
                        return Err(reject_op("op_underfunded"));
                    }
                }
                *source.balances.get_mut(&line_a).unwrap() -= max_amount_a;
                *source.balances.get_mut(&line_b).unwrap() -= max_amount_b;

                let pool = state.pools.get_mut(&share_line).unwrap();
                let minted = if pool.shares == 0 {
                    isqrt(i128::from(*max_amount_a) as u128 * i128::from(*max_amount_b) as u128)
                        as i64
                } else {
                    std::cmp::min(
                        (i128::from(*max_amount_a) * i128::from(pool.shares)
                            / i128::from(pool.reserve_a)) as i64,
                        (i128::from(*max_amount_b) * i128::from(pool.shares)
                            / i128::from(pool.reserve_b)) as i64,
                    )
                };
                pool.reserve_a += max_amount_a;
                pool.reserve_b += max_amount_b;
                pool.shares += minted;

                let source = state.accounts.get_mut(source_id).unwrap();
                *source.balances.get_mut(&share_line).unwrap() += minted;
                Ok(())
            }

            Operation::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                ..
            } => {
                let (first, second) = if send_asset <= dest_asset {
                    (send_asset.clone(), dest_asset.clone())
                } else {
                    (dest_asset.clone(), send_asset.clone())
                };
                let pool_key = state
                    .pools
                    .iter()
                    .find(|(_, p)| p.pool.asset_a == first && p.pool.asset_b == second)
                    .map(|(key, _)| key.clone())
                    .ok_or_else(|| reject_op("op_too_few_offers"))?;

                let send_line = TrustTarget::Asset(send_asset.clone());
                let dest_line = TrustTarget::Asset(dest_asset.clone());

                {
                    let source = state.accounts.get(source_id).unwrap();
                    let balance = source
                        .balances
                        .get(&send_line)
                        .copied()
                        .ok_or_else(|| reject_op("op_underfunded"))?;
                    if balance < *send_amount {
                        return Err(reject_op("op_underfunded"));
                    }
                    let dest = state
                        .accounts
                        .get(destination)
                        .ok_or_else(|| reject_op("op_no_destination"))?;
                    if matches!(dest_asset, Asset::Issued { .. }) && !dest.trusts(&dest_line) {
                        return Err(reject_op("op_no_trust"));
                    }
                }

                // Constant-product conversion through the single pool.
                let pool = state.pools.get_mut(&pool_key).unwrap();
                let send_is_a = pool.pool.asset_a == *send_asset;
                let (reserve_in, reserve_out) = if send_is_a {
                    (pool.reserve_a, pool.reserve_b)
                } else {
                    (pool.reserve_b, pool.reserve_a)
                };
                let received = (i128::from(reserve_out) * i128::from(*send_amount)
                    / (i128::from(reserve_in) + i128::from(*send_amount)))
                    as i64;
                if received < *dest_min {
                    return Err(reject_op("op_under_dest_min"));
                }
                if send_is_a {
                    pool.reserve_a += send_amount;
                    pool.reserve_b -= received;
                } else {
                    pool.reserve_b += send_amount;
                    pool.reserve_a -= received;
                }

                let source = state.accounts.get_mut(source_id).unwrap();
                *source.balances.get_mut(&send_line).unwrap() -= send_amount;
                let dest = state.accounts.get_mut(destination).unwrap();
                *dest.balances.entry(dest_line).or_insert(0) += received;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl LedgerGateway for FakeLedger {
    async fn get_account(&self, account_id: &str) -> WorkflowResult<AccountState> {
        let mut state = self.state.lock().unwrap();
        if let Some(remaining) = state.hidden.get_mut(account_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(WorkflowError::AccountNotVisible(account_id.to_string()));
            }
        }
        state.hidden.remove(account_id);
        let account = state
            .accounts
            .get(account_id)
            .ok_or_else(|| WorkflowError::AccountNotVisible(account_id.to_string()))?;

        let mut balances: Vec<Balance> = account
            .balances
            .iter()
            .map(|(line, amount)| Balance {
                line: line.clone(),
                amount: *amount,
            })
            .collect();
        balances.sort_by_key(|b| b.line.to_string());
        Ok(AccountState {
            account_id: account_id.to_string(),
            sequence: account.sequence,
            balances,
        })
    }

    async fn submit(&self, tx: &SignedTransaction) -> WorkflowResult<SubmissionReceipt> {
        self.verify_signatures(tx)?;

        let mut state = self.state.lock().unwrap();
        let source_id = tx.transaction.source.clone();
        let account = state
            .accounts
            .get(&source_id)
            .ok_or_else(|| reject_tx("tx_no_source_account"))?;
        if account.master_weight == 0 {
            return Err(reject_tx("tx_bad_auth"));
        }
        if tx.transaction.sequence != account.sequence + 1 {
            return Err(reject_tx("tx_bad_seq"));
        }

        // Apply against a scratch copy; commit only if every operation
        // succeeds.
        let mut scratch = LedgerState {
            accounts: state.accounts.clone(),
            pools: state.pools.clone(),
            created: state.created,
            ledger_height: state.ledger_height,
            hidden: HashMap::new(),
        };
        for operation in &tx.transaction.operations {
            Self::apply_operation(&mut scratch, &source_id, operation)?;
        }

        scratch.accounts.get_mut(&source_id).unwrap().sequence += 1;
        scratch.ledger_height = state.ledger_height + 1;
        let height = scratch.ledger_height;
        state.accounts = scratch.accounts;
        state.pools = scratch.pools;
        state.ledger_height = scratch.ledger_height;

        let wire = tx.to_wire()?;
        let hash = hex::encode(Sha256::digest(wire.as_bytes()));
        Ok(SubmissionReceipt {
            hash,
            ledger: Some(height),
            return_value: None,
        })
    }

    async fn fund(&self, account_id: &str) -> WorkflowResult<()> {
        self.create_or_top_up(account_id);
        Ok(())
    }

    async fn airdrop(&self, account_id: &str) -> WorkflowResult<()> {
        self.create_or_top_up(account_id);
        Ok(())
    }
}

enum PendingAction {
    Create { caller: String },
    Deposit { contract: String, caller: String, amounts: Vec<i128> },
}

#[derive(Default)]
struct VaultGatewayState {
    pending: HashMap<String, PendingAction>,
    vaults: HashMap<String, i128>,
    nonce: u64,
}

/// In-memory stand-in for the vault-management gateway.
pub struct FakeVaultGateway {
    ledger: Arc<FakeLedger>,
    network_passphrase: String,
    state: Mutex<VaultGatewayState>,
}

impl FakeVaultGateway {
    pub fn new(ledger: Arc<FakeLedger>, network_passphrase: &str) -> Self {
        Self {
            ledger,
            network_passphrase: network_passphrase.to_string(),
            state: Mutex::new(VaultGatewayState::default()),
        }
    }

    fn gateway_reject(code: &str, message: &str) -> WorkflowError {
        WorkflowError::SubmissionRejected {
            payload: RejectionPayload {
                status: Some(422),
                transaction_code: Some(code.to_string()),
                operation_codes: Vec::new(),
                detail: Some(message.to_string()),
                raw: serde_json::Value::Null,
            },
        }
    }

    fn issue_envelope(&self, action: PendingAction) -> Envelope {
        let mut state = self.state.lock().unwrap();
        state.nonce += 1;
        let payload = serde_json::json!({ "envelope": state.nonce }).to_string();
        let xdr = base64::engine::general_purpose::STANDARD.encode(payload.as_bytes());
        state.pending.insert(xdr.clone(), action);
        Envelope { xdr }
    }
}

#[async_trait]
impl VaultGateway for FakeVaultGateway {
    async fn create_vault_with_deposit(
        &self,
        descriptor: &VaultDescriptor,
    ) -> WorkflowResult<Envelope> {
        if descriptor.fee_bps > 10_000 {
            return Err(Self::gateway_reject("invalid_fee", "fee exceeds 100%"));
        }
        if descriptor.assets.is_empty()
            || descriptor.assets.iter().any(|a| a.strategies.is_empty())
        {
            return Err(Self::gateway_reject(
                "invalid_descriptor",
                "vault requires at least one asset with a strategy",
            ));
        }
        if descriptor.deposit_amounts.len() != descriptor.assets.len() {
            return Err(Self::gateway_reject(
                "invalid_descriptor",
                "one deposit amount per asset required",
            ));
        }
        Ok(self.issue_envelope(PendingAction::Create {
            caller: descriptor.caller.clone(),
        }))
    }

    async fn deposit_to_vault(
        &self,
        contract: &str,
        request: &DepositRequest,
    ) -> WorkflowResult<Envelope> {
        if !self.state.lock().unwrap().vaults.contains_key(contract) {
            return Err(Self::gateway_reject(
                "unknown_vault",
                "no vault deployed at that address",
            ));
        }
        if request.amounts.is_empty() {
            return Err(Self::gateway_reject("invalid_deposit", "amounts required"));
        }
        Ok(self.issue_envelope(PendingAction::Deposit {
            contract: contract.to_string(),
            caller: request.caller.clone(),
            amounts: request.amounts.clone(),
        }))
    }

    async fn send_transaction(
        &self,
        envelope: &SignedEnvelope,
    ) -> WorkflowResult<SendTransactionResponse> {
        let engine = base64::engine::general_purpose::STANDARD;
        let bytes = engine
            .decode(&envelope.xdr)
            .map_err(|e| WorkflowError::Envelope(format!("bad signed envelope: {}", e)))?;
        if bytes.len() <= 64 {
            return Err(WorkflowError::Envelope("signed envelope too short".into()));
        }
        let (payload, sig) = bytes.split_at(bytes.len() - 64);
        let payload_key = engine.encode(payload);

        let caller = {
            let state = self.state.lock().unwrap();
            match state.pending.get(&payload_key) {
                Some(PendingAction::Create { caller }) => caller.clone(),
                Some(PendingAction::Deposit { caller, .. }) => caller.clone(),
                None => {
                    return Err(Self::gateway_reject(
                        "unknown_envelope",
                        "envelope was not constructed by this gateway",
                    ))
                }
            }
        };

        // The caller both signs and pays; an unfunded source account is
        // rejected just like on the real ledger.
        if !self.ledger.account_exists(&caller) {
            return Err(Self::gateway_reject(
                "tx_no_source_account",
                "caller account is not funded",
            ));
        }
        let key_bytes: [u8; 32] = hex::decode(&caller)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Self::gateway_reject("tx_bad_auth", "caller is not a public key"))?;
        let key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|_| Self::gateway_reject("tx_bad_auth", "caller is not a public key"))?;
        let mut hasher = Sha256::new();
        hasher.update(network_id(&self.network_passphrase));
        hasher.update(payload);
        let digest: [u8; 32] = hasher.finalize().into();
        let signature = Signature::from_bytes(sig.try_into().unwrap());
        key.verify(&digest, &signature)
            .map_err(|_| Self::gateway_reject("tx_bad_auth", "signature does not verify"))?;

        let mut state = self.state.lock().unwrap();
        let action = state.pending.remove(&payload_key).unwrap();
        let hash = hex::encode(Sha256::digest(&bytes));
        match action {
            PendingAction::Create { .. } => {
                let address = format!(
                    "C{}",
                    hex::encode_upper(Sha256::digest(payload))[..55].to_string()
                );
                state.vaults.insert(address.clone(), 0);
                Ok(SendTransactionResponse {
                    status: Some("SUCCESS".to_string()),
                    hash: Some(hash),
                    return_value: serde_json::json!({ "address": address }),
                })
            }
            PendingAction::Deposit {
                contract, amounts, ..
            } => {
                let total: i128 = amounts.iter().sum();
                let held = state.vaults.get_mut(&contract).unwrap();
                *held += total;
                Ok(SendTransactionResponse {
                    status: Some("SUCCESS".to_string()),
                    hash: Some(hash),
                    return_value: serde_json::json!({ "shares": total.to_string() }),
                })
            }
        }
    }
}
