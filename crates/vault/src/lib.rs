//! The unconsumed-fact pool.
//!
//! A fact awaiting consumption is jointly owned by its participants; the
//! pool holds each party's local view of those facts. The pool is only ever
//! updated from a notarized transaction, and the update is atomic per
//! transaction: all inputs retired and all outputs admitted as one unit, so
//! no partial view is observable. Isolation between racing flows comes from
//! the notary's single-writer-per-input guarantee, not from locks here.

mod memory;

pub use memory::InMemoryVault;

use accord_types::{Fact, FactKind, FactRef, Hash, NotarizedTransaction};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for fact store operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Errors from the fact store.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("input {0} was already consumed")]
    AlreadyConsumed(FactRef),

    #[error("fact {0} not found among unconsumed facts")]
    NotFound(FactRef),
}

/// Query and commit surface over a party's local view of the shared ledger.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// All unconsumed facts of the given kind, in admission order.
    async fn find_unconsumed(&self, kind: FactKind) -> Vec<(FactRef, Fact)>;

    /// Look up a single unconsumed fact by reference.
    async fn get_unconsumed(&self, fact_ref: &FactRef) -> Option<Fact>;

    /// Whether a reference has been consumed in this view.
    async fn is_consumed(&self, fact_ref: &FactRef) -> bool;

    /// Atomically retire the transaction's inputs and admit its outputs.
    ///
    /// Idempotent on re-delivery of the same transaction. An input that was
    /// already consumed by a different transaction is an error; an input
    /// this party never held (it was not a participant of the fact before
    /// now) is simply marked consumed.
    async fn record_notarized(&self, txn: &NotarizedTransaction) -> Result<()>;

    /// Fetch a previously recorded transaction by canonical hash.
    async fn get_transaction(&self, txn_hash: &Hash) -> Option<NotarizedTransaction>;
}
