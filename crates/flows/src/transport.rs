//! In-process message transport.
//!
//! A [`Network`] is a hub of reliable, ordered point-to-point channels, one
//! endpoint per party key. Real deployments would put a network protocol
//! here; the flow protocol only requires reliable ordered delivery between
//! two endpoints.

use crate::error::{FlowError, Result};
use crate::wire::Envelope;
use accord_types::PartyId;
use async_channel::{Receiver, Sender};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Per-endpoint channel capacity. Bounded so a stalled endpoint exerts
/// backpressure instead of growing without limit.
const ENDPOINT_CAPACITY: usize = 256;

/// Hub of point-to-point channels between party endpoints.
#[derive(Default)]
pub struct Network {
    endpoints: RwLock<HashMap<PartyId, Sender<Envelope>>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an endpoint for `party`, returning its inbound channel.
    /// Re-registering a party replaces its previous endpoint.
    pub async fn register(&self, party: PartyId) -> Receiver<Envelope> {
        let (tx, rx) = async_channel::bounded(ENDPOINT_CAPACITY);
        self.endpoints.write().await.insert(party, tx);
        rx
    }

    /// Deliver an envelope to a party's endpoint.
    pub async fn send(&self, to: &PartyId, envelope: Envelope) -> Result<()> {
        let tx = {
            let endpoints = self.endpoints.read().await;
            endpoints
                .get(to)
                .cloned()
                .ok_or_else(|| FlowError::Transport(format!("no endpoint for party {to}")))?
        };
        debug!(%to, session = %envelope.session_id, kind = envelope.message.kind(), "delivering");
        tx.send(envelope)
            .await
            .map_err(|_| FlowError::Transport(format!("endpoint for party {to} is closed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::FlowMessage;
    use accord_types::{NotarizedTransaction, PartyKeys};

    fn dummy_finality(keys: &PartyKeys) -> FlowMessage {
        FlowMessage::Finality(NotarizedTransaction {
            proposal: accord_types::TransactionProposal {
                notary: keys.party_ref(),
                inputs: vec![],
                input_facts: vec![],
                outputs: vec![],
                command: accord_types::CommandKind::SendMessage,
                required_signers: vec![],
            },
            signatures: accord_types::SignatureSet::new(),
            notary_signature: accord_types::Signature(vec![]),
        })
    }

    #[tokio::test]
    async fn test_delivery_preserves_order() {
        let network = Network::new();
        let a = PartyKeys::generate("A");
        let b = PartyKeys::generate("B");
        let rx = network.register(b.party_id()).await;

        for i in 0..3 {
            let mut envelope = Envelope {
                session_id: uuid::Uuid::new_v4(),
                from: a.party_ref(),
                message: dummy_finality(&a),
            };
            envelope.session_id = uuid::Uuid::from_u128(i);
            network.send(&b.party_id(), envelope).await.unwrap();
        }
        for i in 0..3 {
            let got = rx.recv().await.unwrap();
            assert_eq!(got.session_id, uuid::Uuid::from_u128(i));
        }
    }

    #[tokio::test]
    async fn test_unknown_endpoint_is_transport_error() {
        let network = Network::new();
        let a = PartyKeys::generate("A");
        let envelope = Envelope {
            session_id: uuid::Uuid::new_v4(),
            from: a.party_ref(),
            message: dummy_finality(&a),
        };
        let err = network.send(&a.party_id(), envelope).await.unwrap_err();
        assert!(matches!(err, FlowError::Transport(_)));
    }
}
