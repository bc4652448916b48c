//! Transaction proposals, canonical encoding, and notarized transactions.
//!
//! A proposal is canonicalized to Borsh bytes; the canonical content hash is
//! `blake3(borsh(proposal))`. Every party hashes and signs this identical
//! representation, so signatures are order-independent in the final set.

use crate::command::CommandKind;
use crate::fact::{Fact, FactRef};
use crate::party::{verify_signature, Hash, PartyId, PartyRef, Signature, SignatureError};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from proposal construction and decoding.
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("canonical decode failed: {0}")]
    Decode(#[from] borsh::io::Error),

    #[error("required signer {0} is not a participant of any input or output")]
    SignerNotParticipant(PartyRef),

    #[error("proposal has no required signers")]
    NoRequiredSigners,
}

/// A candidate state transition: consume `inputs`, produce `outputs`, under
/// `command`, with the consent of every party in `required_signers`.
///
/// The resolved `input_facts` ride along (position-matched with `inputs`) so
/// a counter-party can re-run verification without a store lookup; the
/// notary adjudicates on the refs alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TransactionProposal {
    pub notary: PartyRef,
    pub inputs: Vec<FactRef>,
    pub input_facts: Vec<Fact>,
    pub outputs: Vec<Fact>,
    pub command: CommandKind,
    /// Stable order, deduplicated. Collection requests are issued in this
    /// order for determinism.
    pub required_signers: Vec<PartyRef>,
}

impl TransactionProposal {
    /// Check the structural invariant: at least one required signer, each of
    /// which participates in some input or output fact.
    pub fn check_signers(&self) -> Result<(), ProposalError> {
        if self.required_signers.is_empty() {
            return Err(ProposalError::NoRequiredSigners);
        }
        for signer in &self.required_signers {
            let participates = self
                .input_facts
                .iter()
                .chain(self.outputs.iter())
                .any(|fact| fact.participants().iter().any(|p| p.key == signer.key));
            if !participates {
                return Err(ProposalError::SignerNotParticipant(signer.clone()));
            }
        }
        Ok(())
    }

    /// Serialize to canonical Borsh bytes. Deterministic: encoding the same
    /// proposal twice yields identical bytes.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).expect("borsh serialization cannot fail")
    }

    /// Decode from canonical bytes.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, ProposalError> {
        Ok(borsh::from_slice(bytes)?)
    }

    /// The canonical content hash all parties sign.
    pub fn hash(&self) -> Hash {
        Hash::of(&self.to_canonical_bytes())
    }

    /// Keys of the required signers.
    pub fn required_keys(&self) -> BTreeSet<PartyId> {
        self.required_signers.iter().map(|p| p.key).collect()
    }

    /// Every participant of every input and output fact, deduplicated in
    /// first-appearance order. Finality is distributed to all of these.
    pub fn participants(&self) -> Vec<PartyRef> {
        let mut out: Vec<PartyRef> = Vec::new();
        for fact in self.input_facts.iter().chain(self.outputs.iter()) {
            for p in fact.participants() {
                if !out.iter().any(|q| q.key == p.key) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// The refs the outputs of this proposal will be admitted under.
    pub fn output_refs(&self) -> Vec<FactRef> {
        let txn_hash = self.hash();
        (0..self.outputs.len() as u32)
            .map(|index| FactRef { txn_hash, index })
            .collect()
    }
}

/// One party's signature over a proposal hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySignature {
    pub signer: PartyId,
    pub signature: Signature,
}

/// An accumulating, order-independent set of party signatures, kept sorted
/// by signer key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSet {
    entries: Vec<PartySignature>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a signature, replacing any previous one from the same signer.
    pub fn insert(&mut self, signer: PartyId, signature: Signature) {
        match self.entries.binary_search_by(|e| e.signer.cmp(&signer)) {
            Ok(i) => self.entries[i].signature = signature,
            Err(i) => self.entries.insert(i, PartySignature { signer, signature }),
        }
    }

    pub fn contains(&self, signer: &PartyId) -> bool {
        self.entries.binary_search_by(|e| e.signer.cmp(signer)).is_ok()
    }

    /// True when the signer keys are a superset of `required`.
    pub fn covers(&self, required: &BTreeSet<PartyId>) -> bool {
        required.iter().all(|k| self.contains(k))
    }

    /// Required keys not yet signed for, in key order.
    pub fn missing(&self, required: &BTreeSet<PartyId>) -> Vec<PartyId> {
        required.iter().filter(|k| !self.contains(k)).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartySignature> {
        self.entries.iter()
    }
}

/// Errors from notarized-transaction verification.
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("missing required signatures: {0:?}")]
    MissingSignatures(Vec<PartyId>),

    #[error("bad signature: {0}")]
    BadSignature(#[from] SignatureError),

    #[error("proposal invariant violated: {0}")]
    Proposal(#[from] ProposalError),
}

/// A fully-signed, notarized transaction. Terminal and immutable: the inputs
/// it consumed are permanently unusable in any future proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotarizedTransaction {
    pub proposal: TransactionProposal,
    pub signatures: SignatureSet,
    pub notary_signature: Signature,
}

impl NotarizedTransaction {
    /// Verify signature completeness, every party signature, and the notary
    /// signature, all over the canonical proposal hash.
    pub fn verify_signatures(&self) -> Result<(), TransactionError> {
        let hash = self.proposal.hash();
        let required = self.proposal.required_keys();

        let missing = self.signatures.missing(&required);
        if !missing.is_empty() {
            return Err(TransactionError::MissingSignatures(missing));
        }
        for entry in self.signatures.iter() {
            verify_signature(&entry.signer, &hash, &entry.signature)?;
        }
        verify_signature(&self.proposal.notary.key, &hash, &self.notary_signature)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::{Account, FactId};
    use crate::party::PartyKeys;

    fn sample_proposal(controller: &PartyKeys, processor: &PartyKeys) -> TransactionProposal {
        let account = Account {
            fact_id: FactId::random(),
            account_id: "A1".into(),
            account_name: "Acme".into(),
            account_type: "customer".into(),
            industry: "manufacturing".into(),
            phone: "555-0100".into(),
            controller: controller.party_ref(),
            processor: processor.party_ref(),
        };
        TransactionProposal {
            notary: PartyKeys::generate("Notary").party_ref(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Account(account)],
            command: CommandKind::CreateAccount,
            required_signers: vec![controller.party_ref()],
        }
    }

    #[test]
    fn test_canonical_round_trip() {
        let c = PartyKeys::generate("Controller");
        let p = PartyKeys::generate("Processor");
        let proposal = sample_proposal(&c, &p);

        let bytes = proposal.to_canonical_bytes();
        let decoded = TransactionProposal::from_canonical_bytes(&bytes).unwrap();
        assert_eq!(decoded, proposal);
    }

    #[test]
    fn test_canonical_encoding_deterministic() {
        let c = PartyKeys::generate("Controller");
        let p = PartyKeys::generate("Processor");
        let proposal = sample_proposal(&c, &p);

        assert_eq!(proposal.to_canonical_bytes(), proposal.to_canonical_bytes());
        assert_eq!(proposal.hash(), proposal.hash());
    }

    #[test]
    fn test_hash_changes_with_content() {
        let c = PartyKeys::generate("Controller");
        let p = PartyKeys::generate("Processor");
        let a = sample_proposal(&c, &p);
        let mut b = a.clone();
        b.command = CommandKind::ShareAccount;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_check_signers_rejects_stranger() {
        let c = PartyKeys::generate("Controller");
        let p = PartyKeys::generate("Processor");
        let mut proposal = sample_proposal(&c, &p);
        proposal
            .required_signers
            .push(PartyKeys::generate("Stranger").party_ref());

        assert!(matches!(
            proposal.check_signers(),
            Err(ProposalError::SignerNotParticipant(_))
        ));
    }

    #[test]
    fn test_signature_set_covers() {
        let a = PartyKeys::generate("A");
        let b = PartyKeys::generate("B");
        let hash = Hash::of(b"proposal");

        let required: BTreeSet<PartyId> = [a.party_id(), b.party_id()].into_iter().collect();

        let mut sigs = SignatureSet::new();
        sigs.insert(a.party_id(), a.sign(&hash));
        assert!(!sigs.covers(&required));
        assert_eq!(sigs.missing(&required), vec![b.party_id()]);

        sigs.insert(b.party_id(), b.sign(&hash));
        assert!(sigs.covers(&required));
    }

    #[test]
    fn test_notarized_verify() {
        let c = PartyKeys::generate("Controller");
        let p = PartyKeys::generate("Processor");
        let notary = PartyKeys::generate("Notary");

        let mut proposal = sample_proposal(&c, &p);
        proposal.notary = notary.party_ref();
        let hash = proposal.hash();

        let mut signatures = SignatureSet::new();
        signatures.insert(c.party_id(), c.sign(&hash));

        let txn = NotarizedTransaction {
            proposal: proposal.clone(),
            signatures: signatures.clone(),
            notary_signature: notary.sign(&hash),
        };
        txn.verify_signatures().unwrap();

        // Missing required signature is detected.
        let incomplete = NotarizedTransaction {
            proposal,
            signatures: SignatureSet::new(),
            notary_signature: notary.sign(&hash),
        };
        assert!(matches!(
            incomplete.verify_signatures(),
            Err(TransactionError::MissingSignatures(_))
        ));
    }
}
