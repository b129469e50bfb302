use bios_core::{AccountName, ProducerDef};
use bios_genesis::KickstartPayload;
use serde::Serialize;

/// Every hook key, in launch order.
pub const HOOK_KEYS: [&str; 6] = [
    "init",
    "start_bios_boot",
    "publish_kickstart_data",
    "connect_as_abp",
    "connect_as_participant",
    "done",
];

/// A lifecycle notification. The variant selects the hook key; the fields
/// are the JSON payload delivered to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HookEvent {
    Init {
        my_account: AccountName,
        role: String,
    },
    StartBiosBoot {
        genesis_json: String,
        public_key: String,
        private_key: String,
    },
    PublishKickstartData {
        kickstart_data: String,
    },
    ConnectAsAbp {
        kickstart_data: KickstartPayload,
        my_producer_defs: Vec<ProducerDef>,
    },
    ConnectAsParticipant {
        kickstart_data: KickstartPayload,
        my_producer_def: ProducerDef,
    },
    Done {
        my_account: AccountName,
    },
}

impl HookEvent {
    /// Config key of the hook this event is delivered to.
    pub fn key(&self) -> &'static str {
        match self {
            HookEvent::Init { .. } => "init",
            HookEvent::StartBiosBoot { .. } => "start_bios_boot",
            HookEvent::PublishKickstartData { .. } => "publish_kickstart_data",
            HookEvent::ConnectAsAbp { .. } => "connect_as_abp",
            HookEvent::ConnectAsParticipant { .. } => "connect_as_participant",
            HookEvent::Done { .. } => "done",
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("HookEvent serialization is infallible")
    }
}
