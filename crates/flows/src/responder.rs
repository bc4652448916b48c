//! The counterparty side of signature collection.
//!
//! `AWAITING_PROPOSAL → VERIFYING → SIGNED_OR_REJECTED → AWAITING_FINALITY
//! → COMMITTED`. The responder never trusts the initiator's judgement: it
//! re-runs full verification over the received proposal, signs or rejects,
//! and commits only once the notarized result arrives and checks out.

use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::transport::Network;
use crate::wire::{Envelope, FlowMessage, SignOutcome};
use accord_contracts::{verify_proposal, ContractViolation};
use accord_types::{verify_signature, PartyKeys, PartySignature, TransactionProposal};
use accord_vault::FactStore;
use async_channel::Receiver;
use tracing::{debug, info, warn};

/// Responder protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderPhase {
    AwaitingProposal,
    Verifying,
    SignedOrRejected,
    AwaitingFinality,
    Committed,
}

impl std::fmt::Display for ResponderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponderPhase::AwaitingProposal => write!(f, "awaiting_proposal"),
            ResponderPhase::Verifying => write!(f, "verifying"),
            ResponderPhase::SignedOrRejected => write!(f, "signed_or_rejected"),
            ResponderPhase::AwaitingFinality => write!(f, "awaiting_finality"),
            ResponderPhase::Committed => write!(f, "committed"),
        }
    }
}

/// Checks beyond the contract rules that a responder applies before
/// consenting: it must actually be one of the requested signers, and the
/// initiator must have a stake in the transition.
fn acceptance_checks(
    proposal: &TransactionProposal,
    me: &PartyKeys,
    initiator: &accord_types::PartyRef,
) -> Vec<ContractViolation> {
    let mut violations = Vec::new();
    if !proposal.required_keys().contains(&me.party_id()) {
        violations.push(ContractViolation {
            rule: "responder-must-be-required-signer".into(),
            explanation: format!("{} was asked to sign but is not a required signer", me.party_ref().name),
        });
    }
    if !proposal.participants().iter().any(|p| p.key == initiator.key) {
        violations.push(ContractViolation {
            rule: "initiator-must-be-participant".into(),
            explanation: format!("initiator {} participates in no input or output", initiator.name),
        });
    }
    violations
}

/// Handle one inbound signing session, starting from its first envelope.
pub async fn respond(
    keys: &PartyKeys,
    vault: &dyn FactStore,
    network: &Network,
    inbox: &Receiver<Envelope>,
    first: Envelope,
    config: &FlowConfig,
) -> Result<()> {
    let session_id = first.session_id;
    let initiator = first.from;
    let mut phase = ResponderPhase::AwaitingProposal;
    debug!(%session_id, from = %initiator.name, %phase, "responder started");

    let (proposal, prior_signatures) = match first.message {
        FlowMessage::SignRequest { proposal, signatures_so_far } => (proposal, signatures_so_far),
        other => {
            return Err(FlowError::Internal(format!(
                "responder expected a sign request, got {}",
                other.kind()
            )));
        }
    };
    let hash = proposal.hash();

    phase = ResponderPhase::Verifying;
    debug!(%session_id, command = %proposal.command, %phase, "re-running verification");
    let mut violations = match proposal.check_signers() {
        Ok(()) => verify_proposal(&proposal).err().unwrap_or_default(),
        Err(e) => vec![ContractViolation {
            rule: "proposal-signer-invariant".into(),
            explanation: e.to_string(),
        }],
    };
    violations.extend(acceptance_checks(&proposal, keys, &initiator));
    // Never countersign over forged prior consent.
    for entry in &prior_signatures {
        if verify_signature(&entry.signer, &hash, &entry.signature).is_err() {
            violations.push(ContractViolation {
                rule: "sign-request-signatures-valid".into(),
                explanation: format!(
                    "accumulated signature from {} does not verify against the proposal hash",
                    entry.signer
                ),
            });
        }
    }
    if !violations.is_empty() {
        phase = ResponderPhase::SignedOrRejected;
        warn!(%session_id, count = violations.len(), %phase, "rejecting proposal");
        network
            .send(
                &initiator.key,
                Envelope {
                    session_id,
                    from: keys.party_ref(),
                    message: FlowMessage::SignResponse(SignOutcome::Rejected(violations)),
                },
            )
            .await?;
        return Ok(());
    }

    let entry = PartySignature { signer: keys.party_id(), signature: keys.sign(&hash) };
    network
        .send(
            &initiator.key,
            Envelope {
                session_id,
                from: keys.party_ref(),
                message: FlowMessage::SignResponse(SignOutcome::Signed(entry)),
            },
        )
        .await?;
    phase = ResponderPhase::AwaitingFinality;
    debug!(%session_id, txn = %hash, %phase, "signed, waiting for notarized result");

    loop {
        let envelope = match tokio::time::timeout(config.finality_timeout, inbox.recv()).await {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(_)) => return Err(FlowError::Internal("session channel closed".into())),
            Err(_) => {
                warn!(%session_id, %phase, "gave up waiting for notarized result");
                return Err(FlowError::CounterpartyUnresponsive { party: initiator });
            }
        };
        match envelope.message {
            FlowMessage::Finality(txn) => {
                if txn.proposal.hash() != hash {
                    return Err(FlowError::Internal(
                        "notarized transaction does not match the signed proposal".into(),
                    ));
                }
                txn.verify_signatures()?;
                vault.record_notarized(&txn).await?;
                phase = ResponderPhase::Committed;
                info!(%session_id, txn = %hash, %phase, "committed notarized transaction");
                return Ok(());
            }
            other => {
                warn!(%session_id, kind = other.kind(), "ignoring unexpected message");
            }
        }
    }
}
