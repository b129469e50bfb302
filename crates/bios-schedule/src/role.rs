use std::fmt;

use bios_core::{AccountName, BiosError, ProducerDef};
use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;

/// The part an operator plays in the launch. Always derived from the
/// schedule, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Slot 0: creates genesis and runs the boot sequence.
    BootNode,
    /// Slots 1..=21: verifies the boot node's work.
    AppointedProducer,
    /// Everybody else: joins once the appointed producers are satisfied.
    Participant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::BootNode => "boot node",
            Role::AppointedProducer => "appointed block producer",
            Role::Participant => "participant",
        })
    }
}

pub fn resolve_role(schedule: &Schedule, local: &AccountName) -> Role {
    if schedule
        .boot_node()
        .is_some_and(|p| p.account_name == *local)
    {
        Role::BootNode
    } else if schedule.appointed().iter().any(|p| p.account_name == *local) {
        Role::AppointedProducer
    } else {
        Role::Participant
    }
}

/// Every identity the local operator answers to: its own launch-file entry,
/// followed by each schedule entry cloned from it, in schedule order.
///
/// Fails with `UnknownProducer` when `local` is not among `candidates`.
pub fn my_producer_defs(
    candidates: &[ProducerDef],
    schedule: &Schedule,
    local: &AccountName,
) -> Result<Vec<ProducerDef>, BiosError> {
    let mine = candidates
        .iter()
        .find(|p| p.account_name == *local)
        .ok_or_else(|| BiosError::UnknownProducer(local.to_string()))?;

    let mut out = vec![mine.clone()];
    out.extend(
        schedule
            .producers()
            .iter()
            .filter(|p| p.cloned_from.as_ref() == Some(local))
            .cloned(),
    );
    Ok(out)
}
