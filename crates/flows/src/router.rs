//! Session routing.
//!
//! A node's service loop receives one stream of envelopes from its network
//! endpoint; the router fans them out to the flow instance owning each
//! session. Registering an already-active session is rejected so two flows
//! can never consume each other's messages.

use crate::error::{FlowError, Result};
use crate::wire::Envelope;
use async_channel::{Receiver, Sender};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Per-session channel capacity.
const SESSION_CAPACITY: usize = 64;

#[derive(Default)]
pub struct SessionRouter {
    sessions: RwLock<HashMap<Uuid, Sender<Envelope>>>,
}

impl SessionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, returning the channel its flow reads from.
    pub async fn register_session(&self, session_id: Uuid) -> Result<Receiver<Envelope>> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session_id) {
            warn!(%session_id, "rejecting duplicate session registration");
            return Err(FlowError::SessionExists(session_id));
        }
        let (tx, rx) = async_channel::bounded(SESSION_CAPACITY);
        sessions.insert(session_id, tx);
        debug!(%session_id, "registered session");
        Ok(rx)
    }

    pub async fn unregister_session(&self, session_id: Uuid) {
        if self.sessions.write().await.remove(&session_id).is_some() {
            debug!(%session_id, "unregistered session");
        }
    }

    pub async fn is_session_registered(&self, session_id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&session_id)
    }

    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Route an envelope to its session's flow. Returns the envelope back
    /// when no such session is registered, so the caller can decide whether
    /// it starts a new responder.
    pub async fn route(&self, envelope: Envelope) -> std::result::Result<(), Envelope> {
        let tx = {
            let sessions = self.sessions.read().await;
            sessions.get(&envelope.session_id).cloned()
        };
        match tx {
            Some(tx) => match tx.send(envelope).await {
                Ok(()) => Ok(()),
                // Flow ended between lookup and send; treat as unrouted.
                Err(async_channel::SendError(envelope)) => Err(envelope),
            },
            None => Err(envelope),
        }
    }
}
