//! In-memory fact store: an arena keyed by fact reference.

use crate::{FactStore, Result, VaultError};
use accord_types::{Fact, FactKind, FactRef, Hash, NotarizedTransaction};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct VaultInner {
    /// Unconsumed facts, plus admission order for stable queries.
    unconsumed: HashMap<FactRef, Fact>,
    admission_order: Vec<FactRef>,
    /// References retired by some notarized transaction.
    consumed: HashSet<FactRef>,
    /// Recorded transactions by canonical hash.
    transactions: HashMap<Hash, NotarizedTransaction>,
}

/// In-memory implementation of [`FactStore`].
///
/// One `RwLock` guards the whole arena so the retire-set/admit-set commit in
/// [`FactStore::record_notarized`] is atomic: readers either see the state
/// before the transaction or after it, never in between.
#[derive(Default)]
pub struct InMemoryVault {
    inner: RwLock<VaultInner>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unconsumed facts currently held.
    pub async fn unconsumed_count(&self) -> usize {
        self.inner.read().await.unconsumed.len()
    }
}

#[async_trait]
impl FactStore for InMemoryVault {
    async fn find_unconsumed(&self, kind: FactKind) -> Vec<(FactRef, Fact)> {
        let inner = self.inner.read().await;
        inner
            .admission_order
            .iter()
            .filter_map(|r| inner.unconsumed.get(r).map(|f| (*r, f.clone())))
            .filter(|(_, f)| f.kind() == kind)
            .collect()
    }

    async fn get_unconsumed(&self, fact_ref: &FactRef) -> Option<Fact> {
        self.inner.read().await.unconsumed.get(fact_ref).cloned()
    }

    async fn is_consumed(&self, fact_ref: &FactRef) -> bool {
        self.inner.read().await.consumed.contains(fact_ref)
    }

    async fn record_notarized(&self, txn: &NotarizedTransaction) -> Result<()> {
        let txn_hash = txn.proposal.hash();
        let mut inner = self.inner.write().await;

        if inner.transactions.contains_key(&txn_hash) {
            debug!(txn = %txn_hash, "transaction already recorded, skipping");
            return Ok(());
        }

        // Validate the whole retire set before touching anything.
        for input in &txn.proposal.inputs {
            if inner.consumed.contains(input) {
                return Err(VaultError::AlreadyConsumed(*input));
            }
        }

        for input in &txn.proposal.inputs {
            inner.unconsumed.remove(input);
            inner.admission_order.retain(|r| r != input);
            inner.consumed.insert(*input);
        }
        for (fact_ref, fact) in txn.proposal.output_refs().into_iter().zip(&txn.proposal.outputs)
        {
            inner.unconsumed.insert(fact_ref, fact.clone());
            inner.admission_order.push(fact_ref);
        }
        inner.transactions.insert(txn_hash, txn.clone());

        debug!(
            txn = %txn_hash,
            retired = txn.proposal.inputs.len(),
            admitted = txn.proposal.outputs.len(),
            "committed notarized transaction"
        );
        Ok(())
    }

    async fn get_transaction(&self, txn_hash: &Hash) -> Option<NotarizedTransaction> {
        self.inner.read().await.transactions.get(txn_hash).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::{
        Account, CommandKind, FactId, PartyKeys, SignatureSet, TransactionProposal,
    };

    fn create_txn(controller: &PartyKeys, processor: &PartyKeys) -> NotarizedTransaction {
        let notary = PartyKeys::generate("Notary");
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
        let proposal = TransactionProposal {
            notary: notary.party_ref(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Account(account)],
            command: CommandKind::CreateAccount,
            required_signers: vec![controller.party_ref()],
        };
        let hash = proposal.hash();
        let mut signatures = SignatureSet::new();
        signatures.insert(controller.party_id(), controller.sign(&hash));
        NotarizedTransaction {
            proposal,
            signatures,
            notary_signature: notary.sign(&hash),
        }
    }

    fn consume_txn(
        input_ref: FactRef,
        input_fact: Fact,
        controller: &PartyKeys,
    ) -> NotarizedTransaction {
        let notary = PartyKeys::generate("Notary");
        let proposal = TransactionProposal {
            notary: notary.party_ref(),
            inputs: vec![input_ref],
            input_facts: vec![input_fact],
            outputs: vec![],
            command: CommandKind::DeleteAccount,
            required_signers: vec![controller.party_ref()],
        };
        let hash = proposal.hash();
        let mut signatures = SignatureSet::new();
        signatures.insert(controller.party_id(), controller.sign(&hash));
        NotarizedTransaction {
            proposal,
            signatures,
            notary_signature: notary.sign(&hash),
        }
    }

    #[tokio::test]
    async fn test_admit_and_query() {
        let vault = InMemoryVault::new();
        let c = PartyKeys::generate("C");
        let p = PartyKeys::generate("P");

        let txn = create_txn(&c, &p);
        vault.record_notarized(&txn).await.unwrap();

        let accounts = vault.find_unconsumed(FactKind::Account).await;
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].0, txn.proposal.output_refs()[0]);
        assert!(vault.find_unconsumed(FactKind::Case).await.is_empty());
    }

    #[tokio::test]
    async fn test_retire_and_admit_is_atomic_unit() {
        let vault = InMemoryVault::new();
        let c = PartyKeys::generate("C");
        let p = PartyKeys::generate("P");

        let create = create_txn(&c, &p);
        vault.record_notarized(&create).await.unwrap();
        let (fact_ref, fact) = vault.find_unconsumed(FactKind::Account).await.remove(0);

        let delete = consume_txn(fact_ref, fact, &c);
        vault.record_notarized(&delete).await.unwrap();

        assert!(vault.find_unconsumed(FactKind::Account).await.is_empty());
        assert!(vault.is_consumed(&fact_ref).await);
        assert!(vault.get_transaction(&delete.proposal.hash()).await.is_some());
    }

    #[tokio::test]
    async fn test_double_retire_rejected() {
        let vault = InMemoryVault::new();
        let c = PartyKeys::generate("C");
        let p = PartyKeys::generate("P");

        let create = create_txn(&c, &p);
        vault.record_notarized(&create).await.unwrap();
        let (fact_ref, fact) = vault.find_unconsumed(FactKind::Account).await.remove(0);

        vault.record_notarized(&consume_txn(fact_ref, fact.clone(), &c)).await.unwrap();

        let second = consume_txn(fact_ref, fact, &c);
        let err = vault.record_notarized(&second).await.unwrap_err();
        assert!(matches!(err, VaultError::AlreadyConsumed(r) if r == fact_ref));
    }

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let vault = InMemoryVault::new();
        let c = PartyKeys::generate("C");
        let p = PartyKeys::generate("P");

        let txn = create_txn(&c, &p);
        vault.record_notarized(&txn).await.unwrap();
        vault.record_notarized(&txn).await.unwrap();

        assert_eq!(vault.unconsumed_count().await, 1);
    }
}
