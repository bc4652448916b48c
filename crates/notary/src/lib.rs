//! The notary: the single source of truth for double-spend prevention.
//!
//! The notary adjudicates two things for a fully-signed proposal: that every
//! declared input is still unconsumed, and that the required signature set
//! is complete and valid. On success it marks the inputs consumed and issues
//! its own signature over the canonical proposal hash, establishing a single
//! global order. A conflict is permanent: the same inputs can never be
//! notarized again.

mod client;

pub use client::{InProcessTransport, NotaryClient, NotaryTransport, RetryPolicy, SubmitError};

use accord_types::{
    verify_signature, FactRef, PartyId, PartyKeys, PartyRef, Signature, SignatureSet,
    TransactionProposal,
};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Errors from notarization. `Conflict` is permanent: never retry with the
/// same inputs. The rest indicate an invalid submission.
#[derive(thiserror::Error, Debug)]
pub enum NotaryError {
    #[error("inputs already consumed: {0:?}")]
    Conflict(Vec<FactRef>),

    #[error("missing required signatures: {0:?}")]
    MissingSignatures(Vec<PartyId>),

    #[error("invalid signature from {0}")]
    InvalidSignature(PartyId),

    #[error("proposal names a different notary: {0}")]
    WrongNotary(PartyRef),
}

/// The double-spend arbiter.
///
/// The consumed-reference set sits behind a single `Mutex`: adjudication,
/// mark-consumed, and signing happen under one lock acquisition, which gives
/// the single-writer-per-input guarantee racing flows rely on.
pub struct Notary {
    keys: PartyKeys,
    consumed: Mutex<HashSet<FactRef>>,
}

impl Notary {
    pub fn new(keys: PartyKeys) -> Self {
        Self { keys, consumed: Mutex::new(HashSet::new()) }
    }

    pub fn party_ref(&self) -> PartyRef {
        self.keys.party_ref()
    }

    /// Adjudicate a fully-signed proposal.
    ///
    /// Exactly one of two concurrent submissions consuming the same input
    /// succeeds; the other observes `Conflict` with the contested refs.
    pub async fn notarize(
        &self,
        proposal: &TransactionProposal,
        signatures: &SignatureSet,
    ) -> Result<Signature, NotaryError> {
        if proposal.notary.key != self.keys.party_id() {
            return Err(NotaryError::WrongNotary(proposal.notary.clone()));
        }

        let hash = proposal.hash();
        let required = proposal.required_keys();

        let missing = signatures.missing(&required);
        if !missing.is_empty() {
            warn!(txn = %hash, ?missing, "rejecting submission with incomplete signatures");
            return Err(NotaryError::MissingSignatures(missing));
        }
        for entry in signatures.iter() {
            verify_signature(&entry.signer, &hash, &entry.signature)
                .map_err(|_| NotaryError::InvalidSignature(entry.signer))?;
        }

        let mut consumed = self.consumed.lock().await;
        let conflicts: Vec<FactRef> = proposal
            .inputs
            .iter()
            .filter(|r| consumed.contains(r))
            .copied()
            .collect();
        if !conflicts.is_empty() {
            warn!(txn = %hash, ?conflicts, "notarization conflict");
            return Err(NotaryError::Conflict(conflicts));
        }
        for input in &proposal.inputs {
            consumed.insert(*input);
        }
        drop(consumed);

        info!(txn = %hash, inputs = proposal.inputs.len(), "notarized transaction");
        Ok(self.keys.sign(&hash))
    }
}
