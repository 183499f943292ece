//! The atomic unit of a pipeline: build, sign, submit.

use crate::config::schema::NetworkConfig;
use crate::ledger::account::AccountState;
use crate::ledger::client::LedgerGateway;
use crate::ledger::keypair::Identity;
use crate::ledger::transaction::{Operation, TransactionBuilder};
use crate::ledger::types::{SubmissionReceipt, WorkflowError, WorkflowResult};

/// Build a transaction from the state loaded immediately prior, sign it
/// with the given identity, and submit it.
///
/// The state must not be reused across steps: every accepted submission
/// advances the source's sequence number, so each step re-loads before
/// calling this. The submission is irreversible once accepted; there is
/// no local rollback, only compensating transactions.
pub async fn build_and_submit<G: LedgerGateway + ?Sized>(
    gateway: &G,
    state: &AccountState,
    signer: &Identity,
    operations: Vec<Operation>,
    network: &NetworkConfig,
) -> WorkflowResult<SubmissionReceipt> {
    if state.account_id != signer.account_id() {
        return Err(WorkflowError::Signing(format!(
            "loaded state belongs to {} but signer is {}",
            state.account_id,
            signer.account_id()
        )));
    }

    let transaction = TransactionBuilder::new(state, network.base_fee, &network.network_passphrase)
        .with_timeout(network.tx_timeout_secs)
        .add_operations(operations)
        .build()?;

    tracing::debug!(
        source = %transaction.source,
        sequence = transaction.sequence,
        operations = transaction.operations.len(),
        fee = transaction.fee,
        "Submitting transaction"
    );

    gateway.submit(&transaction.sign(signer)?).await
}
