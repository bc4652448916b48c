//! Flow orchestration for the accord shared-ledger protocol.
//!
//! An initiator builds a transaction proposal, verifies it locally, gathers
//! every required counterparty signature, and submits the fully-signed
//! result to the notary; each counterparty independently re-verifies before
//! consenting and commits only the notarized result. Every flow instance is
//! an independent task that suspends at network round-trips; racing flows
//! are isolated solely by the notary's single-writer-per-input guarantee.

pub mod checkpoint;
pub mod collector;
pub mod config;
pub mod error;
pub mod finalizer;
pub mod identity;
pub mod node;
pub mod responder;
pub mod router;
pub mod transport;
pub mod wire;

mod flows;

pub use checkpoint::{CheckpointStore, FlowCheckpoint, InMemoryCheckpointStore};
pub use collector::CollectorState;
pub use config::{FlowConfig, FlowConfigBuilder};
pub use error::{FlowError, Result};
pub use identity::{DirectoryResolver, IdentityResolver, ResolveError};
pub use node::{InitiatorPhase, PartyNode};
pub use responder::ResponderPhase;
pub use router::SessionRouter;
pub use transport::Network;
pub use wire::{Envelope, FlowMessage, SignOutcome};
