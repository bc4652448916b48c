//! Core data model for the accord shared-ledger protocol.
//!
//! Facts are immutable typed records jointly owned by their participants.
//! A change is never an in-place mutation: it is a transaction proposal that
//! consumes input facts and produces output facts under a declared command,
//! carries the consent of every required signer, and becomes authoritative
//! only once the notary has adjudicated uniqueness.

mod command;
mod fact;
mod party;
mod proposal;

pub use command::CommandKind;
pub use fact::{
    Account, Case, CasePriority, CaseStatus, Contact, Fact, FactId, FactKind, FactRef, Lead,
    LinearId, Message,
};
pub use party::{verify_signature, Hash, PartyId, PartyKeys, PartyRef, Signature, SignatureError};
pub use proposal::{
    NotarizedTransaction, PartySignature, ProposalError, SignatureSet, TransactionError,
    TransactionProposal,
};

/// Borsh adapter for [`uuid::Uuid`], serialized as the raw 16 bytes.
pub(crate) mod uuid_borsh {
    use uuid::Uuid;

    pub fn serialize<W: borsh::io::Write>(uuid: &Uuid, writer: &mut W) -> borsh::io::Result<()> {
        writer.write_all(uuid.as_bytes())
    }

    pub fn deserialize<R: borsh::io::Read>(reader: &mut R) -> borsh::io::Result<Uuid> {
        let mut buf = [0u8; 16];
        reader.read_exact(&mut buf)?;
        Ok(Uuid::from_bytes(buf))
    }
}
