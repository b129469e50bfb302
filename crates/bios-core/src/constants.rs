/// ─── BIOS Launch Constants ──────────────────────────────────────────────────
///
/// One boot node plus twenty-one appointed block producers make the first
/// production schedule of a brand-new network.

// ── Schedule ─────────────────────────────────────────────────────────────────

/// Number of slots in a full launch schedule: slot 0 is the boot node,
/// slots 1..=21 are the appointed block producers.
pub const MIN_SCHEDULE_SLOTS: usize = 22;

/// Number of appointed block producers following the boot node.
pub const APPOINTED_PRODUCER_COUNT: usize = 21;

/// Clone suffixes are single lowercase letters, so at most 26 clones exist.
pub const MAX_CLONE_SUFFIXES: usize = 26;

/// Source account names are cut to this length before a clone suffix
/// (`.` + letter) is appended, keeping clones within the 12-char name limit.
pub const CLONE_NAME_PREFIX_LEN: usize = 10;

/// Length of the all-zero seed root recorded when shuffling is skipped.
pub const ZERO_SEED_LEN: usize = 16;

/// Domain separator mixed into the shuffle key derivation.
pub const SHUFFLE_DOMAIN: &[u8] = b"bios-shuffle";

// ── Boot sequence ────────────────────────────────────────────────────────────

/// Per-transaction action limit. Large transfer steps exhaust per-transaction
/// resources somewhere above ~400 actions.
pub const ACTIONS_PER_BATCH: usize = 400;

/// The privileged system account created with the chain.
pub const SYSTEM_ACCOUNT: &str = "eosio";

/// Account that receives resigned system authorities.
pub const PRODUCERS_ACCOUNT: &str = "eosio.prods";

/// Account holding the token contract.
pub const TOKEN_ACCOUNT: &str = "eosio.token";

// ── Verification ─────────────────────────────────────────────────────────────

/// Interval between polls of the system account while waiting for it to be
/// disabled (seconds).
pub const DISABLED_POLL_INTERVAL_SECS: u64 = 1;

// ── Genesis ──────────────────────────────────────────────────────────────────

/// Genesis timestamp layout: UTC, second precision, no zone suffix.
pub const GENESIS_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ── Keys ─────────────────────────────────────────────────────────────────────

/// Text prefix for Dilithium2 public keys.
pub const PUBLIC_KEY_PREFIX: &str = "PUB_DIL2_";

/// Text prefix for Dilithium2 private keys.
pub const PRIVATE_KEY_PREFIX: &str = "PVT_DIL2_";

/// Dilithium2 public key size in bytes (NIST FIPS 204).
pub const PUBLIC_KEY_BYTES: usize = 1312;
