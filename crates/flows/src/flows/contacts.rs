//! Contact and lead creation flows.

use crate::error::Result;
use crate::node::PartyNode;
use accord_types::{
    CommandKind, Contact, Fact, FactId, Lead, LinearId, NotarizedTransaction, PartyRef,
    TransactionProposal,
};

impl PartyNode {
    /// Record a contact controlled by this party and shared with
    /// `processor`.
    pub async fn create_contact(
        &self,
        contact_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        processor: PartyRef,
    ) -> Result<NotarizedTransaction> {
        let contact = Contact {
            fact_id: FactId::random(),
            contact_id: contact_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            controller: self.party_ref(),
            processor,
            linear_id: LinearId::random(),
        };
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Contact(contact)],
            command: CommandKind::CreateContact,
            required_signers: vec![self.party_ref()],
        };
        self.run(proposal).await
    }

    /// Record a sales lead controlled by this party and shared with
    /// `processor`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_lead(
        &self,
        lead_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        company: impl Into<String>,
        title: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        country: impl Into<String>,
        processor: PartyRef,
    ) -> Result<NotarizedTransaction> {
        let lead = Lead {
            fact_id: FactId::random(),
            lead_id: lead_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            company: company.into(),
            title: title.into(),
            email: email.into(),
            phone: phone.into(),
            country: country.into(),
            controller: self.party_ref(),
            processor,
            linear_id: LinearId::random(),
        };
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Lead(lead)],
            command: CommandKind::CreateLead,
            required_signers: vec![self.party_ref()],
        };
        self.run(proposal).await
    }
}
