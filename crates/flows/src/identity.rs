//! Name-to-identity resolution.
//!
//! Callers supply human-readable names; the protocol works with keys.
//! Ambiguity is always surfaced to the caller, never resolved by picking
//! one.

use accord_types::PartyRef;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no known party matches \"{0}\"")]
    NoMatch(String),

    #[error("\"{name}\" is ambiguous: {} parties match", .matches.len())]
    AmbiguousMatch { name: String, matches: Vec<PartyRef> },
}

/// Resolves display names to party identities.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<PartyRef, ResolveError>;
}

/// Resolver backed by a static membership directory.
pub struct DirectoryResolver {
    entries: Vec<PartyRef>,
}

impl DirectoryResolver {
    pub fn new(entries: Vec<PartyRef>) -> Self {
        Self { entries }
    }
}

impl IdentityResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Result<PartyRef, ResolveError> {
        let mut matches: Vec<PartyRef> = self
            .entries
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect();
        match matches.len() {
            0 => Err(ResolveError::NoMatch(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(ResolveError::AmbiguousMatch { name: name.to_string(), matches }),
        }
    }
}
