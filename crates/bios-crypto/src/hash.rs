use bios_core::constants::SHUFFLE_DOMAIN;

/// Derive the 32-byte shuffle RNG key from a seed's time and root:
/// BLAKE3(SHUFFLE_DOMAIN || unix_seconds as i64 BE || root).
pub fn shuffle_key(unix_seconds: i64, root: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(SHUFFLE_DOMAIN);
    hasher.update(&unix_seconds.to_be_bytes());
    hasher.update(root);
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_key_depends_on_time_and_root() {
        let base = shuffle_key(1_528_000_000, &[1, 2, 3]);
        assert_eq!(base, shuffle_key(1_528_000_000, &[1, 2, 3]));
        assert_ne!(base, shuffle_key(1_528_000_001, &[1, 2, 3]));
        assert_ne!(base, shuffle_key(1_528_000_000, &[1, 2, 4]));
    }
}
