//! Rule set for the lead command family.

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
        "create-lead-no-inputs",
        format!("no inputs must be consumed, found {}", inputs.len()),
    );
    let leads: Vec<_> = outputs.iter().filter_map(Fact::as_lead).collect();
    if leads.len() == 1 && outputs.len() == 1 {
        let output = leads[0];
        verdict.require(
            signers.contains(&output.controller.key),
            "create-lead-controller-signs",
            format!("controller {} must sign the lead issue", output.controller),
        );
    } else {
        verdict.fail(
            "create-lead-one-output",
            format!(
                "expected exactly one lead output, found {} facts ({} leads)",
                outputs.len(),
                leads.len()
            ),
        );
    }
}
