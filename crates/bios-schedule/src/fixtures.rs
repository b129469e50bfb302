use bios_core::testing::producer;
use bios_core::ProducerDef;
use chrono::{TimeZone, Utc};

use crate::schedule::ShuffleSeed;

/// `producer00`, `producer01`, ... in launch-file order.
pub fn candidates(n: usize) -> Vec<ProducerDef> {
    (0..n).map(|i| producer(&format!("producer{i:02}"), i as u8)).collect()
}

pub fn seed() -> ShuffleSeed {
    ShuffleSeed::new(
        Utc.with_ymd_and_hms(2018, 6, 1, 12, 0, 0).unwrap(),
        (1..=32).collect(),
    )
}
