//! bios-schedule
//!
//! Turns the launch file's candidate list into the launch schedule and
//! tells each operator which part it plays in the boot.
//!
//! Schedule layout (22 slots once padded):
//!   slot 0       - boot node
//!   slots 1..=21 - appointed block producers
//!   remaining    - participants (only when more than 22 candidates exist)

pub mod role;
pub mod schedule;

pub use role::{my_producer_defs, resolve_role, Role};
pub use schedule::{build_schedule, Schedule, ShuffleSeed};

#[cfg(test)]
mod fixtures;
