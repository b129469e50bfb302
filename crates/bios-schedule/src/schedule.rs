use bios_core::constants::{
    CLONE_NAME_PREFIX_LEN, MAX_CLONE_SUFFIXES, MIN_SCHEDULE_SLOTS, ZERO_SEED_LEN,
};
use bios_core::{AccountName, BiosError, ProducerDef};
use bios_crypto::shuffle_key;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Public randomness the schedule is derived from: a timestamp everybody
/// agrees on plus an opaque root (e.g. a block hash or merkle root).
///
/// The seed time also becomes the genesis timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleSeed {
    pub time: DateTime<Utc>,
    pub root: Vec<u8>,
}

impl ShuffleSeed {
    pub fn new(time: DateTime<Utc>, root: Vec<u8>) -> Self {
        Self { time, root }
    }

    /// The seed recorded when shuffling is skipped.
    pub fn zero(time: DateTime<Utc>) -> Self {
        Self {
            time,
            root: vec![0u8; ZERO_SEED_LEN],
        }
    }
}

/// Ordered launch schedule: boot node first, then the appointed producers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    producers: Vec<ProducerDef>,
    seed: ShuffleSeed,
}

impl Schedule {
    pub fn producers(&self) -> &[ProducerDef] {
        &self.producers
    }

    pub fn seed(&self) -> &ShuffleSeed {
        &self.seed
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    pub fn boot_node(&self) -> Option<&ProducerDef> {
        self.producers.first()
    }

    /// Slots 1..=21 (fewer if the schedule is shorter).
    pub fn appointed(&self) -> &[ProducerDef] {
        let end = self.producers.len().min(MIN_SCHEDULE_SLOTS);
        self.producers.get(1..end).unwrap_or(&[])
    }
}

/// Build the launch schedule from the launch file's candidates.
///
/// Unless `no_shuffle` is set, the candidates are permuted with a Fisher–Yates
/// shuffle driven by ChaCha20 keyed with
/// `BLAKE3("bios-shuffle" || seed.time as i64 BE || seed.root)`; the same
/// seed and candidates always give the same order. With `no_shuffle` the
/// launch-file order is kept and an all-zero root is recorded.
///
/// A schedule shorter than `min_slots` is padded with clones of
/// candidates 1.. in round-robin (slot 0 is never cloned). The i-th clone is
/// named `<first 10 chars of source>.<letter i>` and points back to its source.
pub fn build_schedule(
    candidates: &[ProducerDef],
    seed: &ShuffleSeed,
    min_slots: usize,
    no_shuffle: bool,
) -> Result<Schedule, BiosError> {
    let needed = min_slots.saturating_sub(candidates.len());
    if needed > MAX_CLONE_SUFFIXES {
        return Err(BiosError::ScheduleTooSmall {
            needed,
            max: MAX_CLONE_SUFFIXES,
        });
    }
    if needed > 0 && candidates.len() < 2 {
        return Err(BiosError::ScheduleTooSmall { needed, max: 0 });
    }

    let mut producers = candidates.to_vec();
    let recorded_seed = if no_shuffle {
        debug!("skipping shuffle, using launch file order");
        ShuffleSeed::zero(seed.time)
    } else {
        let key = shuffle_key(seed.time.timestamp(), &seed.root);
        let mut rng = ChaCha20Rng::from_seed(key);
        producers.shuffle(&mut rng);
        seed.clone()
    };

    let sources = producers.len() - 1;
    for i in 0..needed {
        let source = &producers[1 + i % sources];
        let clone = source.clone_as(clone_name(&source.account_name, i));
        producers.push(clone);
    }

    info!(
        candidates = candidates.len(),
        clones = needed,
        shuffled = !no_shuffle,
        "launch schedule built"
    );

    Ok(Schedule {
        producers,
        seed: recorded_seed,
    })
}

/// Name of the `index`-th (0-based) clone of `source`.
fn clone_name(source: &AccountName, index: usize) -> AccountName {
    let suffix = char::from(b'a' + index as u8);
    AccountName(format!("{}.{}", source.prefix(CLONE_NAME_PREFIX_LEN), suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{candidates, seed};
    use std::collections::HashSet;

    fn names(s: &Schedule) -> Vec<&str> {
        s.producers().iter().map(|p| p.account_name.as_str()).collect()
    }

    #[test]
    fn no_shuffle_keeps_full_list_unchanged() {
        let cands = candidates(25);
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, true).unwrap();
        assert_eq!(schedule.producers(), cands.as_slice());
        assert_eq!(schedule.seed().root, vec![0u8; ZERO_SEED_LEN]);
        assert_eq!(schedule.seed().time, seed().time);
    }

    #[test]
    fn exactly_min_slots_needs_no_clones() {
        let cands = candidates(22);
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, true).unwrap();
        assert_eq!(schedule.len(), 22);
        assert!(schedule.producers().iter().all(|p| !p.is_clone()));
    }

    #[test]
    fn five_candidates_pad_to_22_cycling_sources() {
        let cands = candidates(5);
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, true).unwrap();

        assert_eq!(schedule.len(), 22);
        assert_eq!(&schedule.producers()[..5], cands.as_slice());

        for (i, clone) in schedule.producers()[5..].iter().enumerate() {
            let source = &cands[1 + i % 4];
            let letter = char::from(b'a' + i as u8);
            assert_eq!(
                clone.account_name.as_str(),
                format!("{}.{}", source.account_name, letter)
            );
            assert_eq!(clone.cloned_from.as_ref(), Some(&source.account_name));
            assert_eq!(clone.initial_block_signing_public_key, source.initial_block_signing_public_key);
        }
        assert_eq!(schedule.producers()[21].account_name.as_str(), "producer01.q");
    }

    #[test]
    fn boot_node_is_never_cloned() {
        let cands = candidates(3);
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, true).unwrap();
        let boot = &cands[0].account_name;
        assert!(schedule
            .producers()
            .iter()
            .all(|p| p.cloned_from.as_ref() != Some(boot)));
    }

    #[test]
    fn clone_names_are_unique() {
        let cands = candidates(2);
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, true).unwrap();
        let unique: HashSet<_> = names(&schedule).into_iter().collect();
        assert_eq!(unique.len(), 22);
    }

    #[test]
    fn long_source_names_are_cut_to_ten_chars() {
        let mut cands = candidates(2);
        cands[1].account_name = "averylongprod".into();
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, true).unwrap();
        assert_eq!(schedule.producers()[2].account_name.as_str(), "averylongp.a");
        assert_eq!(schedule.producers()[21].account_name.as_str(), "averylongp.t");
    }

    #[test]
    fn too_few_candidates_fails() {
        // 22 - 1 = 21 clones would fit the alphabet, but there is nothing to clone.
        let err = build_schedule(&candidates(1), &seed(), MIN_SCHEDULE_SLOTS, true).unwrap_err();
        assert!(matches!(err, BiosError::ScheduleTooSmall { needed: 21, .. }));

        assert!(matches!(
            build_schedule(&[], &seed(), MIN_SCHEDULE_SLOTS, false),
            Err(BiosError::ScheduleTooSmall { needed: 22, .. })
        ));
    }

    #[test]
    fn clone_alphabet_exhaustion_fails() {
        // 30 slots from 3 candidates needs 27 clones.
        let err = build_schedule(&candidates(3), &seed(), 30, true).unwrap_err();
        assert!(matches!(
            err,
            BiosError::ScheduleTooSmall { needed: 27, max: 26 }
        ));
        // 26 clones is the most that fits.
        assert_eq!(build_schedule(&candidates(4), &seed(), 30, true).unwrap().len(), 30);
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let cands = candidates(30);
        let a = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, false).unwrap();
        let b = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, false).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed(), &seed());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let cands = candidates(30);
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, false).unwrap();
        let mut got = names(&schedule);
        got.sort_unstable();
        let mut want: Vec<_> = cands.iter().map(|p| p.account_name.as_str()).collect();
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn different_seed_changes_order() {
        let cands = candidates(30);
        let a = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, false).unwrap();
        let other = ShuffleSeed::new(seed().time, vec![0xff; 32]);
        let b = build_schedule(&cands, &other, MIN_SCHEDULE_SLOTS, false).unwrap();
        assert_ne!(names(&a), names(&b), "30! orders; a collision here is not credible");
    }

    #[test]
    fn shuffled_short_list_clones_from_shuffled_order() {
        let cands = candidates(6);
        let schedule = build_schedule(&cands, &seed(), MIN_SCHEDULE_SLOTS, false).unwrap();
        let p = schedule.producers();
        assert_eq!(p.len(), 22);
        assert_eq!(p[6].cloned_from.as_ref(), Some(&p[1].account_name));
        assert_eq!(p[7].cloned_from.as_ref(), Some(&p[2].account_name));
    }

    #[test]
    fn appointed_slots() {
        let schedule = build_schedule(&candidates(25), &seed(), MIN_SCHEDULE_SLOTS, true).unwrap();
        assert_eq!(schedule.boot_node().unwrap().account_name.as_str(), "producer00");
        assert_eq!(schedule.appointed().len(), 21);
        assert_eq!(schedule.appointed()[20].account_name.as_str(), "producer21");
    }
}
