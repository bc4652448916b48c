//! A party node: keys, local vault, network endpoint, and the service loop
//! that dispatches inbound sessions.
//!
//! Each flow instance runs as its own task and suspends at every network
//! round-trip; the only process-wide shared state is the vault, which is
//! only ever updated from a notarized transaction.

use crate::checkpoint::{CheckpointStore, FlowCheckpoint, InMemoryCheckpointStore};
use crate::collector;
use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::finalizer;
use crate::responder;
use crate::router::SessionRouter;
use crate::transport::Network;
use crate::wire::{Envelope, FlowMessage};
use accord_contracts::verify_proposal;
use accord_notary::{InProcessTransport, Notary, NotaryClient, RetryPolicy};
use accord_types::{
    NotarizedTransaction, PartyId, PartyKeys, PartyRef, SignatureSet, TransactionProposal,
};
use accord_vault::{FactStore, InMemoryVault};
use async_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Initiator-side flow phase, exposed through the progress hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiatorPhase {
    Generating,
    LocalVerifying,
    Signing,
    Collecting,
    Finalizing,
    Done,
    Failed,
}

impl std::fmt::Display for InitiatorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitiatorPhase::Generating => write!(f, "generating"),
            InitiatorPhase::LocalVerifying => write!(f, "local_verifying"),
            InitiatorPhase::Signing => write!(f, "signing"),
            InitiatorPhase::Collecting => write!(f, "collecting"),
            InitiatorPhase::Finalizing => write!(f, "finalizing"),
            InitiatorPhase::Done => write!(f, "done"),
            InitiatorPhase::Failed => write!(f, "failed"),
        }
    }
}

/// One participant in the network: holds this party's keys and local vault,
/// runs inbound responder sessions, and initiates flows.
pub struct PartyNode {
    pub(crate) keys: PartyKeys,
    pub(crate) config: FlowConfig,
    pub(crate) notary: PartyRef,
    notary_client: NotaryClient,
    vault: Arc<dyn FactStore>,
    network: Arc<Network>,
    router: SessionRouter,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl PartyNode {
    /// Create a node, attach it to the network, and start its service loop.
    pub async fn start(
        name: &str,
        network: Arc<Network>,
        notary: Arc<Notary>,
        config: FlowConfig,
    ) -> Arc<Self> {
        let keys = PartyKeys::generate(name);
        let inbox = network.register(keys.party_id()).await;
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
        };
        let node = Arc::new(Self {
            notary: notary.party_ref(),
            notary_client: NotaryClient::new(Arc::new(InProcessTransport::new(notary)), retry),
            keys,
            config,
            vault: Arc::new(InMemoryVault::new()),
            network,
            router: SessionRouter::new(),
            checkpoints: Arc::new(InMemoryCheckpointStore::new()),
        });
        tokio::spawn(Self::service_loop(Arc::clone(&node), inbox));
        info!(party = %node.keys.party_ref(), "node started");
        node
    }

    pub fn party_ref(&self) -> PartyRef {
        self.keys.party_ref()
    }

    pub fn party_id(&self) -> PartyId {
        self.keys.party_id()
    }

    pub fn vault(&self) -> &Arc<dyn FactStore> {
        &self.vault
    }

    pub fn checkpoints(&self) -> &Arc<dyn CheckpointStore> {
        &self.checkpoints
    }

    /// Dispatch loop: envelopes for live sessions go to their flow; a fresh
    /// sign request starts a responder; a bare notarized result is an
    /// observer commit (this party participates but was not asked to sign).
    async fn service_loop(node: Arc<Self>, inbox: Receiver<Envelope>) {
        while let Ok(envelope) = inbox.recv().await {
            match node.router.route(envelope).await {
                Ok(()) => {}
                Err(envelope) => node.handle_unrouted(envelope).await,
            }
        }
        debug!(party = %node.keys.party_ref(), "service loop stopped");
    }

    async fn handle_unrouted(self: &Arc<Self>, envelope: Envelope) {
        match &envelope.message {
            FlowMessage::SignRequest { .. } => {
                let session_id = envelope.session_id;
                match self.router.register_session(session_id).await {
                    Ok(session_rx) => {
                        let node = Arc::clone(self);
                        tokio::spawn(async move {
                            let result = responder::respond(
                                &node.keys,
                                node.vault.as_ref(),
                                &node.network,
                                &session_rx,
                                envelope,
                                &node.config,
                            )
                            .await;
                            if let Err(e) = result {
                                warn!(%session_id, error = %e, "responder session failed");
                            }
                            node.router.unregister_session(session_id).await;
                        });
                    }
                    Err(e) => warn!(%session_id, error = %e, "could not start responder"),
                }
            }
            FlowMessage::Finality(txn) => self.observer_commit(txn).await,
            FlowMessage::SignResponse(_) => {
                warn!(session_id = %envelope.session_id, "signature response for unknown session");
            }
        }
    }

    async fn observer_commit(&self, txn: &NotarizedTransaction) {
        if let Err(e) = txn.verify_signatures() {
            warn!(error = %e, "discarding notarized transaction that fails verification");
            return;
        }
        match self.vault.record_notarized(txn).await {
            Ok(()) => {
                info!(txn = %txn.proposal.hash(), "observer commit");
            }
            Err(e) => warn!(error = %e, "observer commit failed"),
        }
    }

    /// Drive a proposal through the full initiator state machine.
    pub async fn run(&self, proposal: TransactionProposal) -> Result<NotarizedTransaction> {
        let (progress, _) = watch::channel(InitiatorPhase::Generating);
        self.run_with_progress(proposal, progress).await
    }

    /// Like [`run`](Self::run), publishing each phase transition on the
    /// given watch channel.
    pub async fn run_with_progress(
        &self,
        proposal: TransactionProposal,
        progress: watch::Sender<InitiatorPhase>,
    ) -> Result<NotarizedTransaction> {
        self.execute(Uuid::new_v4(), proposal, SignatureSet::new(), progress).await
    }

    /// Resume an interrupted flow from its persisted checkpoint. Signatures
    /// already gathered are reused; only the missing ones are re-requested.
    pub async fn resume(&self, checkpoint: FlowCheckpoint) -> Result<NotarizedTransaction> {
        info!(
            session_id = %checkpoint.session_id,
            phase = %checkpoint.phase,
            collected = checkpoint.signatures.len(),
            "resuming flow from checkpoint"
        );
        let (progress, _) = watch::channel(checkpoint.phase);
        self.execute(checkpoint.session_id, checkpoint.proposal, checkpoint.signatures, progress)
            .await
    }

    async fn execute(
        &self,
        session_id: Uuid,
        proposal: TransactionProposal,
        collected: SignatureSet,
        progress: watch::Sender<InitiatorPhase>,
    ) -> Result<NotarizedTransaction> {
        let inbox = self.router.register_session(session_id).await?;
        let result = self.drive(session_id, proposal, collected, &inbox, &progress).await;
        self.router.unregister_session(session_id).await;
        // The flow reached a terminal state; only a crash leaves a
        // checkpoint behind.
        self.checkpoints.remove(session_id).await;
        match &result {
            Ok(txn) => {
                let _ = progress.send(InitiatorPhase::Done);
                info!(%session_id, txn = %txn.proposal.hash(), "flow done");
            }
            Err(e) => {
                let _ = progress.send(InitiatorPhase::Failed);
                warn!(%session_id, error = %e, "flow failed");
            }
        }
        result
    }

    async fn drive(
        &self,
        session_id: Uuid,
        proposal: TransactionProposal,
        collected: SignatureSet,
        inbox: &Receiver<Envelope>,
        progress: &watch::Sender<InitiatorPhase>,
    ) -> Result<NotarizedTransaction> {
        self.transition(session_id, progress, InitiatorPhase::LocalVerifying);
        proposal.check_signers()?;
        verify_proposal(&proposal).map_err(FlowError::ContractViolations)?;

        self.transition(session_id, progress, InitiatorPhase::Signing);
        self.transition(session_id, progress, InitiatorPhase::Collecting);
        self.checkpoint(session_id, InitiatorPhase::Collecting, &proposal, &collected)
            .await?;
        let signatures = collector::collect(
            &self.keys,
            &proposal,
            collected,
            session_id,
            &self.network,
            inbox,
            &self.config,
        )
        .await?;

        self.transition(session_id, progress, InitiatorPhase::Finalizing);
        self.checkpoint(session_id, InitiatorPhase::Finalizing, &proposal, &signatures)
            .await?;
        finalizer::finalize(
            &self.keys,
            proposal,
            signatures,
            &self.notary_client,
            self.vault.as_ref(),
            &self.network,
            session_id,
        )
        .await
    }

    async fn checkpoint(
        &self,
        session_id: Uuid,
        phase: InitiatorPhase,
        proposal: &TransactionProposal,
        signatures: &SignatureSet,
    ) -> Result<()> {
        self.checkpoints
            .save(&FlowCheckpoint {
                session_id,
                phase,
                proposal: proposal.clone(),
                signatures: signatures.clone(),
            })
            .await
    }

    fn transition(
        &self,
        session_id: Uuid,
        progress: &watch::Sender<InitiatorPhase>,
        phase: InitiatorPhase,
    ) {
        debug!(%session_id, %phase, "flow transition");
        let _ = progress.send(phase);
    }
}
