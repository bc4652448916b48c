//! Rule set for the message command family. Messages are append-only: they
//! consume nothing and are never consumed.

use crate::violation::Verdict;
use accord_types::{Fact, PartyId};
use std::collections::BTreeSet;

pub(crate) fn verify_send(
    inputs: &[Fact],
    outputs: &[Fact],
    signers: &BTreeSet<PartyId>,
    verdict: &mut Verdict,
) {
    verdict.require(
        inputs.is_empty(),
        "send-message-no-inputs",
        format!("messages consume nothing, found {} inputs", inputs.len()),
    );
    let messages: Vec<_> = outputs.iter().filter_map(Fact::as_message).collect();
    if messages.len() == 1 && outputs.len() == 1 {
        let output = messages[0];
        verdict.require(
            signers.contains(&output.from.key),
            "send-message-sender-signs",
            format!("sender {} must sign the message", output.from),
        );
    } else {
        verdict.fail(
            "send-message-one-output",
            format!(
                "expected exactly one message output, found {} facts ({} messages)",
                outputs.len(),
                messages.len()
            ),
        );
    }
}
