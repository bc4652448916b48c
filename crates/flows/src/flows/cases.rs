//! Case flows: submit, start, close, escalate, close out of scope.

use crate::error::{FlowError, Result};
use crate::node::PartyNode;
use accord_types::{
    Case, CasePriority, CaseStatus, CommandKind, Fact, FactId, FactKind, FactRef, LinearId,
    NotarizedTransaction, PartyRef, TransactionProposal,
};

impl PartyNode {
    /// Open a case against `resolver`. Both parties must consent.
    pub async fn submit_case(
        &self,
        case_id: impl Into<String>,
        description: impl Into<String>,
        case_number: impl Into<String>,
        priority: CasePriority,
        resolver: PartyRef,
    ) -> Result<NotarizedTransaction> {
        let case = Case {
            fact_id: FactId::random(),
            case_id: case_id.into(),
            description: description.into(),
            case_number: case_number.into(),
            status: CaseStatus::New,
            priority,
            submitter: self.party_ref(),
            resolver: resolver.clone(),
            linear_id: LinearId::random(),
        };
        let proposal = TransactionProposal {
            notary: self.notary.clone(),
            inputs: vec![],
            input_facts: vec![],
            outputs: vec![Fact::Case(case)],
            command: CommandKind::SubmitCase,
            required_signers: vec![self.party_ref(), resolver],
        };
        self.run(proposal).await
    }

    /// Move a case to `Started`. Both parties must consent.
    pub async fn start_case(&self, case_id: &str) -> Result<NotarizedTransaction> {
        let (input_ref, input) = self.lookup_case(case_id).await?;
        let output = Case {
            fact_id: FactId::random(),
            status: CaseStatus::Started,
            ..input.clone()
        };
        let required = vec![input.submitter.clone(), input.resolver.clone()];
        self.run(case_transition(
            self.notary.clone(),
            input_ref,
            input,
            output,
            CommandKind::StartCase,
            required,
        ))
        .await
    }

    /// Close a case. Only the submitter's consent is required; the
    /// submitter must be unchanged on the output.
    pub async fn close_case(&self, case_id: &str) -> Result<NotarizedTransaction> {
        let (input_ref, input) = self.lookup_case(case_id).await?;
        let output = Case {
            fact_id: FactId::random(),
            status: CaseStatus::Closed,
            ..input.clone()
        };
        let required = vec![input.submitter.clone()];
        self.run(case_transition(
            self.notary.clone(),
            input_ref,
            input,
            output,
            CommandKind::CloseCase,
            required,
        ))
        .await
    }

    /// Escalate a case to high priority.
    pub async fn escalate_case(&self, case_id: &str) -> Result<NotarizedTransaction> {
        let (input_ref, input) = self.lookup_case(case_id).await?;
        let output = Case {
            fact_id: FactId::random(),
            status: CaseStatus::Escalated,
            priority: CasePriority::High,
            ..input.clone()
        };
        let required = vec![input.submitter.clone(), input.resolver.clone()];
        self.run(case_transition(
            self.notary.clone(),
            input_ref,
            input,
            output,
            CommandKind::EscalateCase,
            required,
        ))
        .await
    }

    /// Mark a case out of scope. Only the resolver may do so, and the
    /// submitter, resolver, and description must be unchanged.
    pub async fn close_out_of_scope_case(&self, case_id: &str) -> Result<NotarizedTransaction> {
        let (input_ref, input) = self.lookup_case(case_id).await?;
        let output = Case {
            fact_id: FactId::random(),
            status: CaseStatus::OutOfScope,
            ..input.clone()
        };
        let required = vec![input.resolver.clone()];
        self.run(case_transition(
            self.notary.clone(),
            input_ref,
            input,
            output,
            CommandKind::CloseOutOfScopeCase,
            required,
        ))
        .await
    }

    pub(crate) async fn lookup_case(&self, case_id: &str) -> Result<(FactRef, Case)> {
        for (fact_ref, fact) in self.vault().find_unconsumed(FactKind::Case).await {
            if let Fact::Case(case) = fact {
                if case.case_id == case_id {
                    return Ok((fact_ref, case));
                }
            }
        }
        Err(FlowError::NotFound { kind: FactKind::Case, selector: case_id.to_string() })
    }
}

fn case_transition(
    notary: PartyRef,
    input_ref: FactRef,
    input: Case,
    output: Case,
    command: CommandKind,
    required_signers: Vec<PartyRef>,
) -> TransactionProposal {
    TransactionProposal {
        notary,
        inputs: vec![input_ref],
        input_facts: vec![Fact::Case(input)],
        outputs: vec![Fact::Case(output)],
        command,
        required_signers,
    }
}
