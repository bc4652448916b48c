//! Serializable flow checkpoints.
//!
//! A flow that crashes mid-protocol must be able to resume from its last
//! completed state transition. The checkpoint captures everything the
//! initiator state machine needs: the session, the phase it last completed,
//! the proposal, and the signatures gathered so far. Signatures are over
//! the canonical proposal hash, so a resumed flow re-requests only the
//! missing ones.
//!
//! The initiator writes a checkpoint before collection and again before
//! finalization, and clears it once the flow reaches a terminal state; a
//! node restarting after a crash lists [`CheckpointStore::pending`] and
//! hands each entry to `PartyNode::resume`.

use crate::error::{FlowError, Result};
use crate::node::InitiatorPhase;
use accord_types::{SignatureSet, TransactionProposal};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowCheckpoint {
    pub session_id: Uuid,
    pub phase: InitiatorPhase,
    pub proposal: TransactionProposal,
    pub signatures: SignatureSet,
}

impl FlowCheckpoint {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| FlowError::Internal(format!("checkpoint encode: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FlowError::Internal(format!("checkpoint decode: {e}")))
    }
}

/// Durable storage for in-flight flow checkpoints, keyed by session.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save(&self, checkpoint: &FlowCheckpoint) -> Result<()>;

    async fn load(&self, session_id: Uuid) -> Result<Option<FlowCheckpoint>>;

    async fn remove(&self, session_id: Uuid);

    /// Every checkpoint not yet cleared, i.e. the flows to resume after a
    /// restart.
    async fn pending(&self) -> Result<Vec<FlowCheckpoint>>;
}

/// In-memory [`CheckpointStore`] holding the serialized form, so every save
/// and load goes through the same codec a durable store would use.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    entries: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, checkpoint: &FlowCheckpoint) -> Result<()> {
        let encoded = checkpoint.to_json()?;
        self.entries.write().await.insert(checkpoint.session_id, encoded);
        Ok(())
    }

    async fn load(&self, session_id: Uuid) -> Result<Option<FlowCheckpoint>> {
        match self.entries.read().await.get(&session_id) {
            Some(json) => Ok(Some(FlowCheckpoint::from_json(json)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, session_id: Uuid) {
        self.entries.write().await.remove(&session_id);
    }

    async fn pending(&self) -> Result<Vec<FlowCheckpoint>> {
        self.entries
            .read()
            .await
            .values()
            .map(|json| FlowCheckpoint::from_json(json))
            .collect()
    }
}
