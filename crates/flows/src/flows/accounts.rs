//! Account flows: create, transfer, share, delete.

use crate::error::{FlowError, Result};
use crate::node::PartyNode;
use accord_types::{
    Account, CommandKind, Fact, FactId, FactKind, FactRef, NotarizedTransaction, PartyRef,
    TransactionProposal,
};

impl PartyNode {
    /// Create an account controlled by this party and shared with
    /// `processor`.
    pub async fn create_account(
        &self,
        account_id: impl Into<String>,
        account_name: impl Into<String>,
        account_type: impl Into<String>,
        industry: impl Into<String>,
        phone: impl Into<String>,
        processor: PartyRef,
    ) -> Result<NotarizedTransaction> {
        let account = Account {
            fact_id: FactId::random(),
            account_id: account_id.into(),
            account_name: account_name.into(),
            account_type: account_type.into(),
            industry: industry.into(),
            phone: phone.into(),
            controller: self.party_ref(),
            processor,
        };
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Account(account)],
            command: CommandKind::CreateAccount,
            required_signers: vec![self.party_ref()],
        };
        self.run(proposal).await
    }

    /// Hand control of an account to `new_controller`. Every field except
    /// the controller is carried forward; the new controller must consent.
    pub async fn transfer_account(
        &self,
        account_id: &str,
        new_controller: PartyRef,
    ) -> Result<NotarizedTransaction> {
        let (input_ref, input) = self.lookup_account(account_id).await?;
        let output = Account {
            fact_id: FactId::random(),
            controller: new_controller.clone(),
            ..input.clone()
        };
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![input_ref],
            input_facts: vec![Fact::Account(input)],
            outputs: vec![Fact::Account(output)],
            command: CommandKind::TransferAccount,
            required_signers: vec![new_controller],
        };
        self.run(proposal).await
    }

    /// Re-issue an account with a different processor.
    pub async fn share_account(
        &self,
        account_id: &str,
        new_processor: PartyRef,
    ) -> Result<NotarizedTransaction> {
        let (input_ref, input) = self.lookup_account(account_id).await?;
        let output = Account {
            fact_id: FactId::random(),
            processor: new_processor,
            ..input.clone()
        };
        let controller = output.controller.clone();
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![input_ref],
            input_facts: vec![Fact::Account(input)],
            outputs: vec![Fact::Account(output)],
            command: CommandKind::ShareAccount,
            required_signers: vec![controller],
        };
        self.run(proposal).await
    }

    /// Retire an account. Only its controller may do so.
    pub async fn delete_account(&self, account_id: &str) -> Result<NotarizedTransaction> {
        let (input_ref, input) = self.lookup_account(account_id).await?;
        let controller = input.controller.clone();
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![input_ref],
            input_facts: vec![Fact::Account(input)],
            outputs: vec![],
            command: CommandKind::DeleteAccount,
            required_signers: vec![controller],
        };
        self.run(proposal).await
    }

    pub(crate) async fn lookup_account(&self, account_id: &str) -> Result<(FactRef, Account)> {
        for (fact_ref, fact) in self.vault().find_unconsumed(FactKind::Account).await {
            if let Fact::Account(account) = fact {
                if account.account_id == account_id {
                    return Ok((fact_ref, account));
                }
            }
        }
        Err(FlowError::NotFound {
            kind: FactKind::Account,
            selector: account_id.to_string(),
        })
    }
}
