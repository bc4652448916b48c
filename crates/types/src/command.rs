//! Transaction commands: the declared intent of a proposed state transition.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The intent of a transaction. The verifier dispatches on this with an
/// exhaustive match, so adding a variant fails to compile until every rule
/// set handles it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    CreateAccount,
    TransferAccount,
    ShareAccount,
    DeleteAccount,
    CreateContact,
    CreateLead,
    SubmitCase,
    StartCase,
    CloseCase,
    EscalateCase,
    CloseOutOfScopeCase,
    SendMessage,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::CreateAccount => write!(f, "create_account"),
            CommandKind::TransferAccount => write!(f, "transfer_account"),
            CommandKind::ShareAccount => write!(f, "share_account"),
            CommandKind::DeleteAccount => write!(f, "delete_account"),
            CommandKind::CreateContact => write!(f, "create_contact"),
            CommandKind::CreateLead => write!(f, "create_lead"),
            CommandKind::SubmitCase => write!(f, "submit_case"),
            CommandKind::StartCase => write!(f, "start_case"),
            CommandKind::CloseCase => write!(f, "close_case"),
            CommandKind::EscalateCase => write!(f, "escalate_case"),
            CommandKind::CloseOutOfScopeCase => write!(f, "close_out_of_scope_case"),
            CommandKind::SendMessage => write!(f, "send_message"),
        }
    }
}
