//! Chat flow.
//!
//! Messages are append-only and carry only the sender's signature; the
//! recipient commits the notarized message as an observer, without a
//! signing round-trip.

use crate::error::Result;
use crate::node::PartyNode;
use accord_types::{
    CommandKind, Fact, FactId, FactKind, Message, NotarizedTransaction, PartyRef,
    TransactionProposal,
};
use chrono::Utc;

impl PartyNode {
    pub async fn send_message(
        &self,
        to: PartyRef,
        from_user_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<NotarizedTransaction> {
        let sequence_number = self.next_sequence_number(&to).await;
        let message = Message {
            fact_id: FactId::random(),
            body: body.into(),
            from_user_id: from_user_id.into(),
            to,
            from: self.party_ref(),
            sent_receipt: true,
            delivered_receipt: false,
            is_from_sender: true,
            timestamp_millis: Utc::now().timestamp_millis(),
            sequence_number,
        };
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Message(message)],
            command: CommandKind::SendMessage,
            required_signers: vec![self.party_ref()],
        };
        self.run(proposal).await
    }

    /// Next sequence number in this party's conversation with `peer`.
    async fn next_sequence_number(&self, peer: &PartyRef) -> u64 {
        let mut highest = 0u64;
        for (_, fact) in self.vault().find_unconsumed(FactKind::Message).await {
            if let Fact::Message(m) = fact {
                if m.to.key == peer.key || m.from.key == peer.key {
                    highest = highest.max(m.sequence_number);
                }
            }
        }
        highest + 1
    }
}
