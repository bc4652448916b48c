//! Per-use-case flow constructors.
//!
//! Each operation resolves its current facts, builds the candidate outputs
//! and proposal, and hands the rest to the initiator state machine on
//! [`PartyNode`](crate::node::PartyNode).

mod accounts;
mod cases;
mod chat;
mod contacts;
