//! Flow error taxonomy.
//!
//! Business failures are typed values carrying the specific violated rule or
//! conflict detail. `Transport` is the only variant a caller may retry with
//! the unchanged signed payload; `NotaryConflict` is permanent and must be
//! re-derived from current state; the rest abort the flow.

use crate::identity::ResolveError;
use accord_contracts::ContractViolation;
use accord_types::{
    FactKind, FactRef, PartyRef, ProposalError, SignatureError, TransactionError,
};
use accord_vault::VaultError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, FlowError>;

#[derive(Error, Debug)]
pub enum FlowError {
    /// Local verification failed before any network step.
    #[error("contract verification failed: {} rule(s) violated", .0.len())]
    ContractViolations(Vec<ContractViolation>),

    /// The remote verifier failed; the flow is aborted, no partial
    /// signatures are reused.
    #[error("counterparty {} rejected the proposal: {} rule(s) violated", .party.name, .violations.len())]
    CounterpartyRejected {
        party: PartyRef,
        violations: Vec<ContractViolation>,
    },

    /// A required signer did not answer within the collection timeout.
    #[error("counterparty {} did not respond in time", .party.name)]
    CounterpartyUnresponsive { party: PartyRef },

    /// An input was already consumed elsewhere. Permanent.
    #[error("notary reported a conflict on {} input(s)", .inputs.len())]
    NotaryConflict { inputs: Vec<FactRef> },

    /// A message could not be delivered. Retryable.
    #[error("transport failure: {0}")]
    Transport(String),

    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error("invalid proposal: {0}")]
    Proposal(#[from] ProposalError),

    #[error("fact store error: {0}")]
    Store(#[from] VaultError),

    /// The builder could not locate the fact being acted on.
    #[error("no unconsumed {kind} fact matches {selector}")]
    NotFound { kind: FactKind, selector: String },

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("notarized transaction failed verification: {0}")]
    Finality(#[from] TransactionError),

    #[error("session {0} is already active")]
    SessionExists(Uuid),

    #[error("internal flow error: {0}")]
    Internal(String),
}
