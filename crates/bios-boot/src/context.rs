use std::path::Path;
use std::time::Duration;

use bios_core::constants::{DISABLED_POLL_INTERVAL_SECS, MIN_SCHEDULE_SLOTS};
use bios_core::{AccountName, BiosError, LaunchData, ProducerDef, Snapshot};
use bios_schedule::{build_schedule, my_producer_defs, resolve_role, Role, Schedule, ShuffleSeed};
use tracing::info;

use crate::config::Config;

/// Everything a launch stage reads. Built once, before the first stage,
/// and passed by reference through every stage after that.
pub struct LaunchContext {
    pub config: Config,
    pub launch: LaunchData,
    pub schedule: Schedule,
    pub snapshot: Snapshot,
    /// Delay between checks of the system account while verifying.
    pub poll_interval: Duration,
}

impl LaunchContext {
    /// Build the schedule from the launch file and check that the local
    /// account is one of its candidates.
    pub fn new(
        config: Config,
        launch: LaunchData,
        snapshot: Snapshot,
        seed: &ShuffleSeed,
    ) -> Result<Self, BiosError> {
        let schedule = build_schedule(
            &launch.producers,
            seed,
            MIN_SCHEDULE_SLOTS,
            config.debug.no_shuffle,
        )?;
        let ctx = Self {
            config,
            launch,
            schedule,
            snapshot,
            poll_interval: Duration::from_secs(DISABLED_POLL_INTERVAL_SECS),
        };
        let mine = ctx.my_producer_defs()?;
        info!(
            account = %ctx.local_account(),
            identities = mine.len(),
            schedule_len = ctx.schedule.len(),
            "launch context ready"
        );
        Ok(ctx)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn local_account(&self) -> &AccountName {
        &self.config.producer.my_account
    }

    /// Derived from the schedule on every call.
    pub fn role(&self) -> Role {
        resolve_role(&self.schedule, self.local_account())
    }

    pub fn my_producer_defs(&self) -> Result<Vec<ProducerDef>, BiosError> {
        my_producer_defs(&self.launch.producers, &self.schedule, self.local_account())
    }
}

/// Read the shared launch file.
pub fn load_launch_data(path: &Path) -> Result<LaunchData, BiosError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        BiosError::Configuration(format!("reading launch data {}: {e}", path.display()))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        BiosError::Configuration(format!("parsing launch data {}: {e}", path.display()))
    })
}

/// Read the opening-balances snapshot, if one is configured.
pub fn load_snapshot(config: &Config) -> Result<Snapshot, BiosError> {
    let Some(path) = &config.opening_balances.snapshot_path else {
        return Ok(Snapshot::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        BiosError::Configuration(format!("reading snapshot {}: {e}", path.display()))
    })?;
    let snapshot: Snapshot = serde_json::from_str(&text).map_err(|e| {
        BiosError::Configuration(format!("parsing snapshot {}: {e}", path.display()))
    })?;
    info!(lines = snapshot.0.len(), path = %path.display(), "snapshot loaded");
    Ok(snapshot)
}
