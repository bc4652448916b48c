//! Rule set for the contact command family.

use crate::violation::Verdict;
use accord_types::{Fact, PartyId};
use std::collections::BTreeSet;

pub(crate) fn verify_create(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    verdict.require(
        inputs.is_empty(),
        "create-contact-no-inputs",
        format!("no inputs must be consumed, found {}", inputs.len()),
    );
    let contacts: Vec<_> = outputs.iter().filter_map(Fact::as_contact).collect();
    if contacts.len() == 1 && outputs.len() == 1 {
        let output = contacts[0];
        verdict.require(
            signers.contains(&output.controller.key),
            "create-contact-controller-signs",
            format!("controller {} must sign the contact issue", output.controller),
        );
    } else {
        verdict.fail(
            "create-contact-one-output",
            format!(
                "expected exactly one contact output, found {} facts ({} contacts)",
                outputs.len(),
                contacts.len()
            ),
        );
    }
}
