//! bios-hooks
//!
//! Lifecycle notifications for operators' own automation (start a node,
//! post to a channel, page someone). Hook keys, in launch order:
//!
//!   init                    - process started
//!   start_bios_boot         - boot node: genesis and ephemeral keys ready
//!   publish_kickstart_data  - boot node: encoded kickstart text ready to relay
//!   connect_as_abp          - appointed producer: kickstart data received
//!   connect_as_participant  - participant: kickstart data received
//!   done                    - own producer registered, launch finished
//!
//! Each hook may POST its JSON payload to a URL, run a shell command with the
//! payload on stdin, both, or nothing.

pub mod dispatch;
pub mod event;

pub use dispatch::{ConfiguredHooks, HookConfig, HookDispatcher, MemoryHooks};
pub use event::{HookEvent, HOOK_KEYS};
