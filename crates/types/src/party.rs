//! Party identity, keys, signatures, and content hashes.
//!
//! A party is identified by its Ed25519 verifying key. Display names exist
//! for humans only and never participate in equality or ordering.

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// BLAKE3 content hash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    BorshSerialize, BorshDeserialize,
)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Hash arbitrary bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Hash(blake3::hash(bytes).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// A party's cryptographic identity: the raw Ed25519 verifying key bytes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    BorshSerialize, BorshDeserialize,
)]
pub struct PartyId(pub [u8; 32]);

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Opaque handle to a party: a human-readable name plus the key that
/// actually identifies it. Two refs are the same party iff their keys match.
#[derive(Debug, Clone, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PartyRef {
    pub name: String,
    pub key: PartyId,
}

impl PartyRef {
    pub fn new(name: impl Into<String>, key: PartyId) -> Self {
        Self { name: name.into(), key }
    }
}

impl PartialEq for PartyRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PartyRef {}

impl PartialOrd for PartyRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartyRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl std::hash::Hash for PartyRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for PartyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.key)
    }
}

/// An Ed25519 signature over a 32-byte content hash.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// Errors from signature parsing and verification.
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("invalid public key for party {0}")]
    InvalidPublicKey(PartyId),

    #[error("signature verification failed for party {0}")]
    Verification(PartyId),
}

/// A party's signing keypair plus its display name.
#[derive(Clone)]
pub struct PartyKeys {
    name: String,
    signing: SigningKey,
}

impl PartyKeys {
    /// Generate a fresh keypair.
    pub fn generate(name: impl Into<String>) -> Self {
        let signing = SigningKey::generate(&mut rand::rngs::OsRng);
        Self { name: name.into(), signing }
    }

    pub fn party_id(&self) -> PartyId {
        PartyId(self.signing.verifying_key().to_bytes())
    }

    pub fn party_ref(&self) -> PartyRef {
        PartyRef::new(self.name.clone(), self.party_id())
    }

    /// Sign a canonical content hash.
    pub fn sign(&self, hash: &Hash) -> Signature {
        Signature(self.signing.sign(hash.as_bytes()).to_bytes().to_vec())
    }
}

impl fmt::Debug for PartyKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartyKeys")
            .field("name", &self.name)
            .field("party_id", &self.party_id())
            .finish()
    }
}

/// Verify an Ed25519 signature over a content hash against a party's key.
pub fn verify_signature(
    signer: &PartyId,
    hash: &Hash,
    signature: &Signature,
) -> Result<(), SignatureError> {
    let sig = ed25519_dalek::Signature::from_slice(&signature.0)
        .map_err(|_| SignatureError::InvalidSignatureLength(signature.0.len()))?;

    let key = VerifyingKey::from_bytes(&signer.0)
        .map_err(|_| SignatureError::InvalidPublicKey(*signer))?;

    key.verify(hash.as_bytes(), &sig)
        .map_err(|_| SignatureError::Verification(*signer))
}
