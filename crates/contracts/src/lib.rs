//! Pure business-rule verification for accord transaction proposals.
//!
//! [`verify`] is a pure function of its arguments: no I/O, no clocks, no
//! shared state. It dispatches on the command kind with an exhaustive match;
//! each command's rules are conjunctive and every violated rule is reported,
//! not just the first. Malformed shape (wrong input/output arity) is a
//! [`ContractViolation`] like any other rule failure, never a panic.

mod account;
mod case;
mod chat;
mod contact;
mod lead;
mod violation;

pub use violation::{ContractViolation, Verdict};

use accord_types::{CommandKind, Fact, PartyId, TransactionProposal};
use std::collections::BTreeSet;

/// Decide whether a transition is legal.
///
/// `signers` is the set of keys whose consent the proposal declares; each
/// command's rule set decides which of them are actually required.
pub fn verify(
    command: CommandKind,
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
) -> Result<(), Vec<ContractViolation>> {
    let mut verdict = Verdict::new();
    match command {
        CommandKind::CreateAccount => account::verify_create(inputs, outputs, signers, &mut verdict),
        CommandKind::TransferAccount => {
            account::verify_transfer(inputs, outputs, signers, &mut verdict)
        }
        CommandKind::ShareAccount => account::verify_share(inputs, outputs, signers, &mut verdict),
        CommandKind::DeleteAccount => account::verify_delete(inputs, outputs, signers, &mut verdict),
        CommandKind::CreateContact => contact::verify_create(inputs, outputs, signers, &mut verdict),
        CommandKind::CreateLead => lead::verify_create(inputs, outputs, signers, &mut verdict),
        CommandKind::SubmitCase => case::verify_submit(inputs, outputs, signers, &mut verdict),
        CommandKind::StartCase => case::verify_start(inputs, outputs, signers, &mut verdict),
        CommandKind::CloseCase => case::verify_close(inputs, outputs, signers, &mut verdict),
        CommandKind::EscalateCase => case::verify_escalate(inputs, outputs, &mut verdict),
        CommandKind::CloseOutOfScopeCase => {
            case::verify_close_out_of_scope(inputs, outputs, signers, &mut verdict)
        }
        CommandKind::SendMessage => chat::verify_send(inputs, outputs, signers, &mut verdict),
    }
    verdict.into_result()
}

/// Verify a whole proposal against its own declared signer set.
pub fn verify_proposal(proposal: &TransactionProposal) -> Result<(), Vec<ContractViolation>> {
    verify(
        proposal.command,
        &proposal.input_facts,
        &proposal.outputs,
        &proposal.required_keys(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::{
        Account, Case, CasePriority, CaseStatus, Contact, FactId, Lead, LinearId, Message,
        PartyKeys, PartyRef,
    };

    fn keys(n: &str) -> PartyKeys {
        PartyKeys::generate(n)
    }

    fn signer_set(parties: &[&PartyKeys]) -> BTreeSet<PartyId> {
        parties.iter().map(|k| k.party_id()).collect()
    }

    fn account(controller: PartyRef, processor: PartyRef) -> Account {
        Account {
            fact_id: FactId::random(),
            account_id: "A1".into(),
            account_name: "Acme".into(),
            account_type: "customer".into(),
            industry: "manufacturing".into(),
            phone: "555-0100".into(),
            controller,
            processor,
        }
    }

    fn case(submitter: PartyRef, resolver: PartyRef) -> Case {
        Case {
            fact_id: FactId::random(),
            case_id: "C1".into(),
            description: "printer on fire".into(),
            case_number: "0001".into(),
            status: CaseStatus::New,
            priority: CasePriority::High,
            submitter,
            resolver,
            linear_id: LinearId::random(),
        }
    }

    fn rules_of(err: Vec<ContractViolation>) -> Vec<String> {
        err.into_iter().map(|v| v.rule).collect()
    }

    #[test]
    fn test_create_account_controller_signs() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let output = Fact::Account(account(p1.party_ref(), p2.party_ref()));

        // Signed only by the controller: succeeds.
        verify(CommandKind::CreateAccount, &[], &[output.clone()], &signer_set(&[&p1])).unwrap();

        // Signed only by the processor: fails on the signer rule.
        let err = verify(CommandKind::CreateAccount, &[], &[output], &signer_set(&[&p2]))
            .unwrap_err();
        assert_eq!(rules_of(err), vec!["create-account-controller-signs"]);
    }

    #[test]
    fn test_create_account_rejects_inputs() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let fact = Fact::Account(account(p1.party_ref(), p2.party_ref()));

        let err = verify(
            CommandKind::CreateAccount,
            &[fact.clone()],
            &[fact],
            &signer_set(&[&p1]),
        )
        .unwrap_err();
        assert!(rules_of(err).contains(&"create-account-no-inputs".to_string()));
    }

    #[test]
    fn test_create_account_wrong_kind_output() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let output = Fact::Case(case(p1.party_ref(), p2.party_ref()));

        let err =
            verify(CommandKind::CreateAccount, &[], &[output], &signer_set(&[&p1])).unwrap_err();
        assert!(rules_of(err).contains(&"create-account-one-output".to_string()));
    }

    #[test]
    fn test_transfer_only_controller_changes() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let p3 = keys("P3");
        let input = account(p1.party_ref(), p2.party_ref());

        let mut output = input.clone();
        output.fact_id = FactId::random();
        output.controller = p3.party_ref();

        verify(
            CommandKind::TransferAccount,
            &[Fact::Account(input.clone())],
            &[Fact::Account(output.clone())],
            &signer_set(&[&p3]),
        )
        .unwrap();

        // Any other field differing fails the structural rule.
        output.industry = "media".into();
        let err = verify(
            CommandKind::TransferAccount,
            &[Fact::Account(input)],
            &[Fact::Account(output)],
            &signer_set(&[&p3]),
        )
        .unwrap_err();
        assert!(rules_of(err).contains(&"transfer-only-controller-changes".to_string()));
    }

    #[test]
    fn test_transfer_reports_all_violations() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let p3 = keys("P3");
        let input = account(p1.party_ref(), p2.party_ref());

        let mut output = input.clone();
        output.fact_id = FactId::random();
        output.controller = p3.party_ref();
        output.phone = "555-0199".into();

        // Wrong signer AND changed field: both rules reported.
        let err = verify(
            CommandKind::TransferAccount,
            &[Fact::Account(input)],
            &[Fact::Account(output)],
            &signer_set(&[&p1]),
        )
        .unwrap_err();
        let rules = rules_of(err);
        assert!(rules.contains(&"transfer-only-controller-changes".to_string()));
        assert!(rules.contains(&"transfer-account-controller-signs".to_string()));
    }

    #[test]
    fn test_delete_account_input_controller_signs() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let input = Fact::Account(account(p1.party_ref(), p2.party_ref()));

        verify(CommandKind::DeleteAccount, &[input.clone()], &[], &signer_set(&[&p1])).unwrap();

        let err =
            verify(CommandKind::DeleteAccount, &[input], &[], &signer_set(&[&p2])).unwrap_err();
        assert_eq!(rules_of(err), vec!["delete-account-controller-signs"]);
    }

    #[test]
    fn test_submit_case_distinct_parties() {
        let p1 = keys("P1");
        let p2 = keys("P2");

        // submitter == resolver always fails, regardless of signer set.
        let same = Fact::Case(case(p1.party_ref(), p1.party_ref()));
        let err = verify(CommandKind::SubmitCase, &[], &[same], &signer_set(&[&p1, &p2]))
            .unwrap_err();
        assert!(rules_of(err).contains(&"submit-case-distinct-parties".to_string()));

        let ok = Fact::Case(case(p1.party_ref(), p2.party_ref()));
        verify(CommandKind::SubmitCase, &[], &[ok], &signer_set(&[&p1, &p2])).unwrap();
    }

    #[test]
    fn test_submit_case_both_must_sign() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let output = Fact::Case(case(p1.party_ref(), p2.party_ref()));

        let err =
            verify(CommandKind::SubmitCase, &[], &[output], &signer_set(&[&p1])).unwrap_err();
        assert_eq!(rules_of(err), vec!["submit-case-both-sign"]);
    }

    #[test]
    fn test_close_case_submitter_rules() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let p3 = keys("P3");
        let input = case(p1.party_ref(), p2.party_ref());

        let mut output = input.clone();
        output.fact_id = FactId::random();
        output.status = CaseStatus::Closed;

        verify(
            CommandKind::CloseCase,
            &[Fact::Case(input.clone())],
            &[Fact::Case(output.clone())],
            &signer_set(&[&p1]),
        )
        .unwrap();

        // Swapped submitter is rejected.
        output.submitter = p3.party_ref();
        let err = verify(
            CommandKind::CloseCase,
            &[Fact::Case(input)],
            &[Fact::Case(output)],
            &signer_set(&[&p1, &p3]),
        )
        .unwrap_err();
        assert!(rules_of(err).contains(&"close-case-submitter-unchanged".to_string()));
    }

    #[test]
    fn test_escalate_case_shape_only() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let input = case(p1.party_ref(), p2.party_ref());
        let mut output = input.clone();
        output.fact_id = FactId::random();
        output.status = CaseStatus::Escalated;

        // No signer constraints at all.
        verify(
            CommandKind::EscalateCase,
            &[Fact::Case(input.clone())],
            &[Fact::Case(output)],
            &BTreeSet::new(),
        )
        .unwrap();

        // But the one-in/one-out shape still holds.
        let err = verify(CommandKind::EscalateCase, &[Fact::Case(input)], &[], &BTreeSet::new())
            .unwrap_err();
        assert!(rules_of(err).contains(&"escalate-case-one-output".to_string()));
    }

    #[test]
    fn test_close_out_of_scope_names_changed_field() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let input = case(p1.party_ref(), p2.party_ref());

        let mut output = input.clone();
        output.fact_id = FactId::random();
        output.status = CaseStatus::OutOfScope;
        output.description = "rewritten".into();

        let err = verify(
            CommandKind::CloseOutOfScopeCase,
            &[Fact::Case(input)],
            &[Fact::Case(output)],
            &signer_set(&[&p2]),
        )
        .unwrap_err();
        assert_eq!(rules_of(err), vec!["out-of-scope-description-unchanged"]);
    }

    #[test]
    fn test_close_out_of_scope_resolver_signs() {
        let p1 = keys("P1");
        let p2 = keys("P2");
        let input = case(p1.party_ref(), p2.party_ref());
        let mut output = input.clone();
        output.fact_id = FactId::random();
        output.status = CaseStatus::OutOfScope;

        let err = verify(
            CommandKind::CloseOutOfScopeCase,
            &[Fact::Case(input.clone())],
            &[Fact::Case(output.clone())],
            &signer_set(&[&p1]),
        )
        .unwrap_err();
        assert_eq!(rules_of(err), vec!["out-of-scope-resolver-signs"]);

        verify(
            CommandKind::CloseOutOfScopeCase,
            &[Fact::Case(input)],
            &[Fact::Case(output)],
            &signer_set(&[&p2]),
        )
        .unwrap();
    }

    #[test]
    fn test_send_message_sender_signs() {
        let sender = keys("Sender");
        let recipient = keys("Recipient");
        let message = Fact::Message(Message {
            fact_id: FactId::random(),
            body: "hello".into(),
            from_user_id: "u-1".into(),
            to: recipient.party_ref(),
            from: sender.party_ref(),
            sent_receipt: true,
            delivered_receipt: false,
            is_from_sender: true,
            timestamp_millis: 1_700_000_000_000,
            sequence_number: 1,
        });

        verify(CommandKind::SendMessage, &[], &[message.clone()], &signer_set(&[&sender]))
            .unwrap();

        let err = verify(CommandKind::SendMessage, &[], &[message], &signer_set(&[&recipient]))
            .unwrap_err();
        assert_eq!(rules_of(err), vec!["send-message-sender-signs"]);
    }

    #[test]
    fn test_create_contact_and_lead() {
        let p1 = keys("P1");
        let p2 = keys("P2");

        let contact = Fact::Contact(Contact {
            fact_id: FactId::random(),
            contact_id: "CT1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0101".into(),
            controller: p1.party_ref(),
            processor: p2.party_ref(),
            linear_id: LinearId::random(),
        });
        verify(CommandKind::CreateContact, &[], &[contact.clone()], &signer_set(&[&p1])).unwrap();
        let err =
            verify(CommandKind::CreateContact, &[], &[contact], &signer_set(&[&p2])).unwrap_err();
        assert_eq!(rules_of(err), vec!["create-contact-controller-signs"]);

        let lead = Fact::Lead(Lead {
            fact_id: FactId::random(),
            lead_id: "L1".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            company: "Navy".into(),
            title: "RADM".into(),
            email: "grace@example.com".into(),
            phone: "555-0102".into(),
            country: "US".into(),
            controller: p1.party_ref(),
            processor: p2.party_ref(),
            linear_id: LinearId::random(),
        });
        verify(CommandKind::CreateLead, &[], &[lead], &signer_set(&[&p1])).unwrap();
    }
}
