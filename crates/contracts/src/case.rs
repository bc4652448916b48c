//! Rule sets for the case command family.

use crate::violation::Verdict;
use accord_types::{Case, Fact, PartyId};
use std::collections::BTreeSet;

fn single_case<'a>(
    facts: &'a [Fact],
    role: &str,
    rule: &str,
    verdict: &mut Verdict,
) -> Option<&'a Case> {
    let cases: Vec<&Case> = facts.iter().filter_map(Fact::as_case).collect();
    if cases.len() == 1 && facts.len() == 1 {
        Some(cases[0])
    } else {
        verdict.fail(
            rule,
            format!(
                "expected exactly one case {}, found {} facts ({} cases)",
                role,
                facts.len(),
                cases.len()
            ),
        );
        None
    }
}

pub(crate) fn verify_submit(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    verdict.require(
        inputs.is_empty(),
        "submit-case-no-inputs",
        format!("no inputs should be consumed, found {}", inputs.len()),
    );
    if let Some(output) = single_case(outputs, "output", "submit-case-one-output", verdict) {
        verdict.require(
            output.resolver.key != output.submitter.key,
            "submit-case-distinct-parties",
            "the submitter must be different to the resolver",
        );
        verdict.require(
            signers.contains(&output.submitter.key) && signers.contains(&output.resolver.key),
            "submit-case-both-sign",
            "the resolver and submitter are both required signers",
        );
    }
}

pub(crate) fn verify_start(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    single_case(inputs, "input", "start-case-one-input", verdict);
    if let Some(output) = single_case(outputs, "output", "start-case-one-output", verdict) {
        verdict.require(
            signers.contains(&output.submitter.key) && signers.contains(&output.resolver.key),
            "start-case-both-sign",
            "the submitter and resolver are both required signers",
        );
    }
}

pub(crate) fn verify_close(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    let input = single_case(inputs, "input", "close-case-one-input", verdict);
    let output = single_case(outputs, "output", "close-case-one-output", verdict);
    if let (Some(input), Some(output)) = (input, output) {
        verdict.require(
            output.submitter.key == input.submitter.key,
            "close-case-submitter-unchanged",
            "the submitter may not change on close",
        );
        verdict.require(
            signers.contains(&output.submitter.key),
            "close-case-submitter-signs",
            format!("submitter {} must sign the close", output.submitter),
        );
    }
}

/// Escalation is intentionally unrestricted beyond the one-in/one-out shape:
/// any participant may escalate without structural or signer constraints.
pub(crate) fn verify_escalate(inputs: &[Fact], outputs: &[Fact], verdict: &mut Verdict) {
    single_case(inputs, "input", "escalate-case-one-input", verdict);
    single_case(outputs, "output", "escalate-case-one-output", verdict);
}

pub(crate) fn verify_close_out_of_scope(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    let input = single_case(inputs, "input", "out-of-scope-one-input", verdict);
    let output = single_case(outputs, "output", "out-of-scope-one-output", verdict);
    if let (Some(input), Some(output)) = (input, output) {
        verdict.require(
            output.submitter.key == input.submitter.key,
            "out-of-scope-submitter-unchanged",
            "submitter may not change when closing out of scope",
        );
        verdict.require(
            output.resolver.key == input.resolver.key,
            "out-of-scope-resolver-unchanged",
            "resolver may not change when closing out of scope",
        );
        verdict.require(
            output.description == input.description,
            "out-of-scope-description-unchanged",
            "description may not change when closing out of scope",
        );
        verdict.require(
            signers.contains(&output.resolver.key),
            "out-of-scope-resolver-signs",
            format!("resolver {} must sign the out-of-scope close", output.resolver),
        );
    }
}
