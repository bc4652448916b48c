//! Finalization: notary submission, distribution, local commit.

use crate::error::{FlowError, Result};
use crate::transport::Network;
use crate::wire::{Envelope, FlowMessage};
use accord_notary::{NotaryClient, NotaryError, SubmitError};
use accord_types::{NotarizedTransaction, PartyKeys, SignatureSet, TransactionProposal};
use accord_vault::FactStore;
use tracing::{info, warn};
use uuid::Uuid;

/// Submit a fully-signed proposal to the notary, commit the result locally,
/// and distribute it to every participant of every input and output fact.
///
/// A `Conflict` from the notary is permanent; transient transport failures
/// are retried inside the client with the identical signed payload.
pub async fn finalize(
    keys: &PartyKeys,
    proposal: TransactionProposal,
    signatures: SignatureSet,
    notary_client: &NotaryClient,
    vault: &dyn FactStore,
    network: &Network,
    session_id: Uuid,
) -> Result<NotarizedTransaction> {
    let notary_signature = match notary_client.submit(&proposal, &signatures).await {
        Ok(sig) => sig,
        Err(SubmitError::Rejected(NotaryError::Conflict(inputs))) => {
            warn!(%session_id, conflicts = inputs.len(), "notary reported conflict");
            return Err(FlowError::NotaryConflict { inputs });
        }
        Err(SubmitError::Rejected(other)) => {
            return Err(FlowError::Internal(format!("notary rejected submission: {other}")));
        }
        Err(SubmitError::Transport(reason)) => return Err(FlowError::Transport(reason)),
    };

    let txn = NotarizedTransaction { proposal, signatures, notary_signature };
    let txn_hash = txn.proposal.hash();
    vault.record_notarized(&txn).await?;
    info!(%session_id, txn = %txn_hash, "committed notarized transaction");

    // Every participant gets the result, not just the signers.
    let me = keys.party_id();
    for participant in txn.proposal.participants() {
        if participant.key == me {
            continue;
        }
        let envelope = Envelope {
            session_id,
            from: keys.party_ref(),
            message: FlowMessage::Finality(txn.clone()),
        };
        // The transaction is already notarized and committed locally; a
        // participant we cannot reach must catch up later.
        if let Err(e) = network.send(&participant.key, envelope).await {
            warn!(%session_id, party = %participant.name, error = %e,
                "failed to distribute notarized transaction");
        }
    }

    Ok(txn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_notary::Notary;
    use accord_types::{Account, CommandKind, Fact, FactId, FactRef, PartyRef};
    use accord_vault::InMemoryVault;
    use std::sync::Arc;

    fn account(controller: &PartyKeys, processor: &PartyKeys) -> Account {
        Account {
            fact_id: FactId::random(),
            account_id: "A1".into(),
            account_name: "Acme".into(),
            account_type: "customer".into(),
            industry: "manufacturing".into(),
            phone: "555-0100".into(),
            controller: controller.party_ref(),
            processor: processor.party_ref(),
        }
    }

    fn signed_create(
        notary: &PartyRef,
        controller: &PartyKeys,
        processor: &PartyKeys,
    ) -> (TransactionProposal, SignatureSet) {
        let proposal = TransactionProposal {
            notary: notary.clone(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Account(account(controller, processor))],
            command: CommandKind::CreateAccount,
            required_signers: vec![controller.party_ref()],
        };
        let mut signatures = SignatureSet::new();
        signatures.insert(controller.party_id(), controller.sign(&proposal.hash()));
        (proposal, signatures)
    }

    #[tokio::test]
    async fn test_finalize_commits_and_distributes() {
        let notary = Arc::new(Notary::new(PartyKeys::generate("Notary")));
        let controller = PartyKeys::generate("Controller");
        let processor = PartyKeys::generate("Processor");
        let network = Network::new();
        let _controller_inbox = network.register(controller.party_id()).await;
        let processor_inbox = network.register(processor.party_id()).await;
        let vault = InMemoryVault::new();

        let (proposal, signatures) = signed_create(&notary.party_ref(), &controller, &processor);
        let client = NotaryClient::in_process(Arc::clone(&notary));
        let txn = finalize(
            &controller,
            proposal,
            signatures,
            &client,
            &vault,
            &network,
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        txn.verify_signatures().unwrap();
        assert_eq!(vault.unconsumed_count().await, 1);

        let envelope = processor_inbox.recv().await.unwrap();
        assert!(matches!(envelope.message, FlowMessage::Finality(got) if got == txn));
    }

    #[tokio::test]
    async fn test_conflict_surfaces_as_permanent_error() {
        let notary = Arc::new(Notary::new(PartyKeys::generate("Notary")));
        let controller = PartyKeys::generate("Controller");
        let processor = PartyKeys::generate("Processor");
        let network = Network::new();
        let _controller_inbox = network.register(controller.party_id()).await;
        let _processor_inbox = network.register(processor.party_id()).await;

        let input = FactRef { txn_hash: accord_types::Hash::of(b"genesis"), index: 0 };
        let make = |vault_fact: Account| {
            let proposal = TransactionProposal {
                notary: notary.party_ref(),
                inputs: vec![input],
                input_facts: vec![Fact::Account(vault_fact)],
                outputs: vec![],
                command: CommandKind::DeleteAccount,
                required_signers: vec![controller.party_ref()],
            };
            let mut signatures = SignatureSet::new();
            signatures.insert(controller.party_id(), controller.sign(&proposal.hash()));
            (proposal, signatures)
        };
        let (prop_a, sigs_a) = make(account(&controller, &processor));
        let (prop_b, sigs_b) = make(account(&controller, &processor));

        let client = NotaryClient::in_process(Arc::clone(&notary));
        let vault_a = InMemoryVault::new();
        let vault_b = InMemoryVault::new();

        finalize(&controller, prop_a, sigs_a, &client, &vault_a, &network, Uuid::new_v4())
            .await
            .unwrap();
        let err = finalize(&controller, prop_b, sigs_b, &client, &vault_b, &network, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::NotaryConflict { inputs } if inputs == vec![input]));
    }
}
