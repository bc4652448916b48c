//! Violation reporting for business-rule verification.
//!
//! Verification is conjunctive: every rule for the command must hold.
//! Rather than stopping at the first failure, a [`Verdict`] accumulates
//! every violated rule so callers can see the full diagnosis at once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single violated business rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractViolation {
    /// Stable rule identifier, e.g. `transfer-only-controller-changes`.
    pub rule: String,
    /// Human-readable explanation of what failed.
    pub explanation: String,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.explanation)
    }
}

/// Accumulator for rule checks over one proposal.
#[derive(Debug, Default)]
pub struct Verdict {
    violations: Vec<ContractViolation>,
}

impl Verdict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation unless `condition` holds.
    pub fn require(&mut self, condition: bool, rule: &str, explanation: impl Into<String>) {
        if !condition {
            self.violations.push(ContractViolation {
                rule: rule.to_string(),
                explanation: explanation.into(),
            });
        }
    }

    /// Record an unconditional violation.
    pub fn fail(&mut self, rule: &str, explanation: impl Into<String>) {
        self.require(false, rule, explanation);
    }

    pub fn into_result(self) -> Result<(), Vec<ContractViolation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}
