//! Wire messages exchanged between party endpoints.

use accord_contracts::ContractViolation;
use accord_types::{NotarizedTransaction, PartyRef, PartySignature, TransactionProposal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A counterparty's answer to a signing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SignOutcome {
    Signed(PartySignature),
    Rejected(Vec<ContractViolation>),
}

/// Protocol messages. One flow instance is one session; every message
/// carries the session id in its [`Envelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FlowMessage {
    /// Initiator asks a required signer for its signature. Carries the
    /// signatures gathered so far, starting with the initiator's own.
    SignRequest {
        proposal: TransactionProposal,
        signatures_so_far: Vec<PartySignature>,
    },
    SignResponse(SignOutcome),
    /// The notarized result, distributed to every participant for local
    /// commit.
    Finality(NotarizedTransaction),
}

impl FlowMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            FlowMessage::SignRequest { .. } => "sign_request",
            FlowMessage::SignResponse(_) => "sign_response",
            FlowMessage::Finality(_) => "finality",
        }
    }
}

/// A routed message between two party endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub session_id: Uuid,
    pub from: PartyRef,
    pub message: FlowMessage,
}
