//! Fact types: the immutable records parties jointly evolve.
//!
//! Each fact names its participants, the parties entitled to be notified of
//! its creation and consumption. Contact, Lead and Case additionally carry a
//! linear identifier that stays stable across successive versions of the
//! same logical entity. Messages are append-only and never consumed.

use crate::party::{Hash, PartyRef};
use crate::uuid_borsh;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identity of a single fact version.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    BorshSerialize, BorshDeserialize,
)]
pub struct FactId(
    #[borsh(
        serialize_with = "uuid_borsh::serialize",
        deserialize_with = "uuid_borsh::deserialize"
    )]
    pub Uuid,
);

impl FactId {
    pub fn random() -> Self {
        FactId(Uuid::new_v4())
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a logical entity across successive fact versions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    BorshSerialize, BorshDeserialize,
)]
pub struct LinearId(
    #[borsh(
        serialize_with = "uuid_borsh::serialize",
        deserialize_with = "uuid_borsh::deserialize"
    )]
    pub Uuid,
);

impl LinearId {
    pub fn random() -> Self {
        LinearId(Uuid::new_v4())
    }
}

impl fmt::Display for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a fact awaiting consumption: the hash of the transaction
/// that admitted it plus the output index within that transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    BorshSerialize, BorshDeserialize,
)]
pub struct FactRef {
    pub txn_hash: Hash,
    pub index: u32,
}

impl fmt::Display for FactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txn_hash, self.index)
    }
}

/// Fact family discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Account,
    Contact,
    Lead,
    Case,
    Message,
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactKind::Account => write!(f, "account"),
            FactKind::Contact => write!(f, "contact"),
            FactKind::Lead => write!(f, "lead"),
            FactKind::Case => write!(f, "case"),
            FactKind::Message => write!(f, "message"),
        }
    }
}

/// A CRM account shared between its controller and processor.
///
/// Accounts carry no linear identifier: each version is a fresh fact, and a
/// transfer consumes the old fact and produces a new one with only the
/// controller differing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Account {
    pub fact_id: FactId,
    pub account_id: String,
    pub account_name: String,
    pub account_type: String,
    pub industry: String,
    pub phone: String,
    pub controller: PartyRef,
    pub processor: PartyRef,
}

impl Account {
    /// True when every field except `controller` (and the per-version
    /// `fact_id`) is identical. This is the transfer structural rule.
    pub fn same_except_controller(&self, other: &Account) -> bool {
        self.account_id == other.account_id
            && self.account_name == other.account_name
            && self.account_type == other.account_type
            && self.industry == other.industry
            && self.phone == other.phone
            && self.processor == other.processor
    }
}

/// A contact record with a persistent linear identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Contact {
    pub fact_id: FactId,
    pub contact_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub controller: PartyRef,
    pub processor: PartyRef,
    pub linear_id: LinearId,
}

/// A sales lead with a persistent linear identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Lead {
    pub fact_id: FactId,
    pub lead_id: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub controller: PartyRef,
    pub processor: PartyRef,
    pub linear_id: LinearId,
}

/// Case lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    New,
    Unstarted,
    Started,
    Working,
    Escalated,
    Closed,
    OutOfScope,
}

/// Case priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CasePriority {
    High,
    Medium,
    Low,
}

/// A support case between a submitter and a resolver.
///
/// Invariant (enforced by the submit rule): `submitter != resolver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Case {
    pub fact_id: FactId,
    pub case_id: String,
    pub description: String,
    pub case_number: String,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub submitter: PartyRef,
    pub resolver: PartyRef,
    pub linear_id: LinearId,
}

/// A chat message between two parties. Append-only, never consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Message {
    pub fact_id: FactId,
    pub body: String,
    pub from_user_id: String,
    pub to: PartyRef,
    pub from: PartyRef,
    pub sent_receipt: bool,
    pub delivered_receipt: bool,
    pub is_from_sender: bool,
    /// Milliseconds since the Unix epoch, as observed by the sender.
    pub timestamp_millis: i64,
    pub sequence_number: u64,
}

/// A typed, immutable shared record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    Account(Account),
    Contact(Contact),
    Lead(Lead),
    Case(Case),
    Message(Message),
}

impl Fact {
    pub fn kind(&self) -> FactKind {
        match self {
            Fact::Account(_) => FactKind::Account,
            Fact::Contact(_) => FactKind::Contact,
            Fact::Lead(_) => FactKind::Lead,
            Fact::Case(_) => FactKind::Case,
            Fact::Message(_) => FactKind::Message,
        }
    }

    pub fn fact_id(&self) -> FactId {
        match self {
            Fact::Account(a) => a.fact_id,
            Fact::Contact(c) => c.fact_id,
            Fact::Lead(l) => l.fact_id,
            Fact::Case(c) => c.fact_id,
            Fact::Message(m) => m.fact_id,
        }
    }

    /// Ordered, deduplicated participant set. Every participant is entitled
    /// to receive the notarized transaction touching this fact.
    pub fn participants(&self) -> Vec<PartyRef> {
        let raw = match self {
            Fact::Account(a) => vec![a.controller.clone(), a.processor.clone()],
            Fact::Contact(c) => vec![c.controller.clone(), c.processor.clone()],
            Fact::Lead(l) => vec![l.controller.clone(), l.processor.clone()],
            Fact::Case(c) => vec![c.submitter.clone(), c.resolver.clone()],
            Fact::Message(m) => vec![m.to.clone(), m.from.clone()],
        };
        let mut out: Vec<PartyRef> = Vec::with_capacity(raw.len());
        for p in raw {
            if !out.iter().any(|q| q.key == p.key) {
                out.push(p);
            }
        }
        out
    }

    pub fn as_account(&self) -> Option<&Account> {
        match self {
            Fact::Account(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_contact(&self) -> Option<&Contact> {
        match self {
            Fact::Contact(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_lead(&self) -> Option<&Lead> {
        match self {
            Fact::Lead(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_case(&self) -> Option<&Case> {
        match self {
            Fact::Case(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Fact::Message(m) => Some(m),
            _ => None,
        }
    }
}
