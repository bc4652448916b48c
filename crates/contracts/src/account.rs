//! Rule sets for the account command family.

use crate::violation::Verdict;
use accord_types::{Account, Fact, PartyId};
use std::collections::BTreeSet;

/// Expect exactly one account among `facts`; any other shape is a violation.
fn single_account<'a>(
    facts: &'a [Fact],
    role: &str,
    rule: &str,
    verdict: &mut Verdict,
) -> Option<&'a Account> {
    let accounts: Vec<&Account> = facts.iter().filter_map(Fact::as_account).collect();
    if accounts.len() == 1 && facts.len() == 1 {
        Some(accounts[0])
    } else {
        verdict.fail(
            rule,
            format!(
                "expected exactly one account {}, found {} facts ({} accounts)",
                role,
                facts.len(),
                accounts.len()
            ),
        );
        None
    }
}

pub(crate) fn verify_create(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    verdict.require(
        inputs.is_empty(),
        "create-account-no-inputs",
        format!("no inputs must be consumed, found {}", inputs.len()),
    );
    if let Some(output) = single_account(outputs, "output", "create-account-one-output", verdict) {
        verdict.require(
            signers.contains(&output.controller.key),
            "create-account-controller-signs",
            format!("controller {} must sign the account issue", output.controller),
        );
    }
}

pub(crate) fn verify_transfer(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    let input = single_account(inputs, "input", "transfer-account-one-input", verdict);
    let output = single_account(outputs, "output", "transfer-account-one-output", verdict);
    if let (Some(input), Some(output)) = (input, output) {
        verdict.require(
            input.same_except_controller(output),
            "transfer-only-controller-changes",
            "no account data may change except the controller field",
        );
        verdict.require(
            signers.contains(&output.controller.key),
            "transfer-account-controller-signs",
            format!("new controller {} must sign the transfer", output.controller),
        );
    }
}

pub(crate) fn verify_share(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    single_account(inputs, "input", "share-account-one-input", verdict);
    if let Some(output) = single_account(outputs, "output", "share-account-one-output", verdict) {
        verdict.require(
            signers.contains(&output.controller.key),
            "share-account-controller-signs",
            format!("controller {} must sign the share", output.controller),
        );
    }
}

pub(crate) fn verify_delete(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    verdict.require(
        outputs.is_empty(),
        "delete-account-no-outputs",
        format!("no outputs may be produced, found {}", outputs.len()),
    );
    if let Some(input) = single_account(inputs, "input", "delete-account-one-input", verdict) {
        verdict.require(
            signers.contains(&input.controller.key),
            "delete-account-controller-signs",
            format!("controller {} of the retired account must sign", input.controller),
        );
    }
}
