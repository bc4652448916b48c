//! Submission client for the notary.
//!
//! Transport failures are retryable with the identical already-signed
//! payload: re-signing is unnecessary and re-submission is idempotent on an
//! unchanged proposal hash. A rejection from the notary itself is final.

use crate::{Notary, NotaryError};
use accord_types::{Signature, SignatureSet, TransactionProposal};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Errors from a single submission attempt.
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    /// The notary adjudicated and said no. Final.
    #[error("notary rejected submission: {0}")]
    Rejected(#[from] NotaryError),

    /// The submission never reached the notary. Retryable.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// How a submission reaches the notary.
#[async_trait]
pub trait NotaryTransport: Send + Sync {
    async fn submit(
        &self,
        proposal: &TransactionProposal,
        signatures: &SignatureSet,
    ) -> Result<Signature, SubmitError>;
}

/// Direct in-process transport to a [`Notary`].
pub struct InProcessTransport {
    notary: Arc<Notary>,
}

impl InProcessTransport {
    pub fn new(notary: Arc<Notary>) -> Self {
        Self { notary }
    }
}

#[async_trait]
impl NotaryTransport for InProcessTransport {
    async fn submit(
        &self,
        proposal: &TransactionProposal,
        signatures: &SignatureSet,
    ) -> Result<Signature, SubmitError> {
        Ok(self.notary.notarize(proposal, signatures).await?)
    }
}

/// Retry policy for transient transport failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Client handle that submits fully-signed proposals, retrying transient
/// transport failures with exponential backoff.
pub struct NotaryClient {
    transport: Arc<dyn NotaryTransport>,
    policy: RetryPolicy,
}

impl NotaryClient {
    pub fn new(transport: Arc<dyn NotaryTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Convenience constructor for an in-process notary.
    pub fn in_process(notary: Arc<Notary>) -> Self {
        Self::new(Arc::new(InProcessTransport::new(notary)), RetryPolicy::default())
    }

    pub async fn submit(
        &self,
        proposal: &TransactionProposal,
        signatures: &SignatureSet,
    ) -> Result<Signature, SubmitError> {
        let mut backoff = self.policy.initial_backoff;
        let mut attempt = 0u32;
        loop {
            match self.transport.submit(proposal, signatures).await {
                Ok(sig) => return Ok(sig),
                Err(SubmitError::Rejected(e)) => return Err(SubmitError::Rejected(e)),
                Err(SubmitError::Transport(reason)) => {
                    if attempt >= self.policy.max_retries {
                        warn!(%reason, attempt, "notary submission gave up");
                        return Err(SubmitError::Transport(reason));
                    }
                    debug!(%reason, attempt, ?backoff, "retrying notary submission");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.policy.max_backoff);
                    attempt += 1;
                }
            }
        }
    }
}
