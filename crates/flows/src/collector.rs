//! The signature-collection state machine.
//!
//! `BUILT → LOCAL_SIGNED → AWAITING_REMOTE(p) → COLLECTED`, aborting on
//! rejection or timeout. Requests are issued in `required_signers` order,
//! one outstanding request at a time; signatures are over the same canonical
//! hash and are order-independent in the final set. A rejection discards all
//! partial signatures: a retry must restart from a fresh proposal.

use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::transport::Network;
use crate::wire::{Envelope, FlowMessage, SignOutcome};
use accord_types::{verify_signature, PartyKeys, PartyRef, SignatureSet, TransactionProposal};
use async_channel::Receiver;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Collection protocol state, exposed for checkpointing and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorState {
    Built,
    LocalSigned,
    AwaitingRemote(PartyRef),
    Collected,
    Aborted,
}

impl std::fmt::Display for CollectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorState::Built => write!(f, "built"),
            CollectorState::LocalSigned => write!(f, "local_signed"),
            CollectorState::AwaitingRemote(p) => write!(f, "awaiting_remote({})", p.name),
            CollectorState::Collected => write!(f, "collected"),
            CollectorState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Gather every required signature over the proposal's canonical hash.
///
/// The initiator signs first; each remaining required signer is then asked
/// in turn over `network`, with responses arriving on the session `inbox`.
/// Each request is bounded by `config.collect_timeout`. Signers already
/// present in `collected` are skipped, so a resumed flow only asks for the
/// signatures it was still missing.
pub async fn collect(
    keys: &PartyKeys,
    proposal: &TransactionProposal,
    collected: SignatureSet,
    session_id: Uuid,
    network: &Network,
    inbox: &Receiver<Envelope>,
    config: &FlowConfig,
) -> Result<SignatureSet> {
    let hash = proposal.hash();
    let required = proposal.required_keys();
    let mut state = CollectorState::Built;
    debug!(%session_id, txn = %hash, signers = proposal.required_signers.len(), %state, "collector started");

    let mut signatures = collected;
    signatures.insert(keys.party_id(), keys.sign(&hash));
    state = CollectorState::LocalSigned;
    debug!(%session_id, %state, "initiator signed");

    for signer in &proposal.required_signers {
        if signatures.contains(&signer.key) {
            continue;
        }
        state = CollectorState::AwaitingRemote(signer.clone());
        debug!(%session_id, %state, "requesting signature");

        network
            .send(
                &signer.key,
                Envelope {
                    session_id,
                    from: keys.party_ref(),
                    message: FlowMessage::SignRequest {
                        proposal: proposal.clone(),
                        signatures_so_far: signatures.iter().cloned().collect(),
                    },
                },
            )
            .await?;

        loop {
            let envelope = match tokio::time::timeout(config.collect_timeout, inbox.recv()).await
            {
                Ok(Ok(envelope)) => envelope,
                Ok(Err(_)) => {
                    return Err(FlowError::Internal("session channel closed".into()));
                }
                Err(_) => {
                    state = CollectorState::Aborted;
                    warn!(%session_id, party = %signer.name, %state, "collection timed out");
                    return Err(FlowError::CounterpartyUnresponsive { party: signer.clone() });
                }
            };
            match envelope.message {
                FlowMessage::SignResponse(SignOutcome::Signed(entry)) => {
                    if entry.signer != signer.key {
                        return Err(FlowError::Internal(format!(
                            "expected signature from {}, got one from {}",
                            signer.key, entry.signer
                        )));
                    }
                    verify_signature(&entry.signer, &hash, &entry.signature)?;
                    signatures.insert(entry.signer, entry.signature);
                    debug!(%session_id, party = %signer.name, "signature received");
                    break;
                }
                FlowMessage::SignResponse(SignOutcome::Rejected(violations)) => {
                    state = CollectorState::Aborted;
                    warn!(%session_id, party = %signer.name, count = violations.len(), %state,
                        "counterparty rejected proposal");
                    return Err(FlowError::CounterpartyRejected {
                        party: signer.clone(),
                        violations,
                    });
                }
                other => {
                    warn!(%session_id, kind = other.kind(), "ignoring unexpected message");
                }
            }
        }
    }

    if !signatures.covers(&required) {
        return Err(FlowError::Internal("signature set incomplete after collection".into()));
    }
    state = CollectorState::Collected;
    info!(%session_id, txn = %hash, count = signatures.len(), %state, "all signatures collected");
    Ok(signatures)
}
