//! bios-boot
//!
//! The launch itself. One `Orchestrator` per process runs, in order:
//!
//!   1. `init` hook and the schedule/role summary
//!   2. by role:
//!        boot node   - ephemeral key, genesis, boot sequence in batches,
//!                      kickstart data published (`boot`)
//!        appointed   - wait for kickstart data, connect, poll until the
//!                      system account is disabled (`verify`)
//!        participant - wait for kickstart data, connect (`verify`)
//!   3. `regproducer` for the local account, whatever the role
//!   4. `done` hook
//!
//! Nothing runs concurrently; every chain call, hook and input wait completes
//! before the next starts.

pub mod batch;
pub mod boot;
pub mod config;
pub mod context;
pub mod input;
pub mod ops;
pub mod orchestrator;
pub mod verify;

pub use batch::chunk_actions;
pub use boot::{run_boot_node, submit_boot_sequence, BootOutcome};
pub use config::{Config, ContractLocation, DebugConfig, OpeningBalances, ProducerConfig, ProducerParameters};
pub use context::{load_launch_data, load_snapshot, LaunchContext};
pub use input::{KickstartSource, StdinKickstartSource, TextKickstartSource};
pub use ops::{ActionBuilder, OpRegistry};
pub use orchestrator::{print_role_summary, regproducer_action, Orchestrator, RunReport};
pub use verify::{is_disabled, run_appointed_producer, run_participant, wait_for_kickstart};

#[cfg(test)]
mod testing;
