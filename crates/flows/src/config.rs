//! Flow configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and retry knobs shared by every flow on a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// How long to wait for each counterparty's signature before the flow
    /// aborts with `CounterpartyUnresponsive`.
    pub collect_timeout: Duration,

    /// How long a responder waits for the notarized result after signing.
    pub finality_timeout: Duration,

    /// Maximum retries for transient notary transport failures.
    pub max_retries: u32,

    /// Initial backoff between notary submission retries.
    pub initial_backoff: Duration,

    /// Backoff ceiling.
    pub max_backoff: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            collect_timeout: Duration::from_secs(30),
            finality_timeout: Duration::from_secs(60),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// Builder for [`FlowConfig`].
pub struct FlowConfigBuilder {
    config: FlowConfig,
}

impl FlowConfigBuilder {
    pub fn new() -> Self {
        Self { config: FlowConfig::default() }
    }

    pub fn collect_timeout(mut self, timeout: Duration) -> Self {
        self.config.collect_timeout = timeout;
        self
    }

    pub fn finality_timeout(mut self, timeout: Duration) -> Self {
        self.config.finality_timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.config.initial_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.config.max_backoff = backoff;
        self
    }

    pub fn build(self) -> FlowConfig {
        self.config
    }
}

impl Default for FlowConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
