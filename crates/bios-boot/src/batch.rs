/// Split a step's actions into the transactions pushed for it.
///
/// The current transaction is closed only once it holds more than `limit`
/// actions, so every transaction but the last carries `limit + 1` actions.
/// Operators have boot sequences that depend on exactly this packing.
pub fn chunk_actions<T>(items: Vec<T>, limit: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for item in items {
        if current.len() > limit {
            out.push(std::mem::take(&mut current));
        }
        current.push(item);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bios_core::constants::ACTIONS_PER_BATCH;

    fn sizes(n: usize) -> Vec<usize> {
        chunk_actions((0..n).collect(), ACTIONS_PER_BATCH)
            .iter()
            .map(Vec::len)
            .collect()
    }

    #[test]
    fn no_actions_no_transactions() {
        assert!(sizes(0).is_empty());
    }

    #[test]
    fn packing_sizes() {
        assert_eq!(sizes(1), vec![1]);
        assert_eq!(sizes(400), vec![400]);
        assert_eq!(sizes(401), vec![401]);
        assert_eq!(sizes(402), vec![401, 1]);
        assert_eq!(sizes(450), vec![401, 49]);
        assert_eq!(sizes(800), vec![401, 399]);
        assert_eq!(sizes(801), vec![401, 400]);
    }

    #[test]
    fn order_is_preserved() {
        let chunks = chunk_actions((0..1000).collect::<Vec<u32>>(), ACTIONS_PER_BATCH);
        let flat: Vec<u32> = chunks.into_iter().flatten().collect();
        assert_eq!(flat, (0..1000).collect::<Vec<u32>>());
    }
}
