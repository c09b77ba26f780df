use proptest::prelude::*;
use suffix_squish::{reference, SuffixTree, MAX_COPY_LEN};

fn small_alphabet(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 1..max_len)
}

#[test]
fn test_distinct_substrings_of_every_prefix() {
    let text = b"mississippi_missouri_mississippi";
    let mut tree = SuffixTree::new(text, MAX_COPY_LEN);
    for n in 1..=text.len() {
        assert!(tree.commit_next_symbol());
        assert_eq!(
            tree.distinct_substrings(),
            reference::distinct_substrings(&text[..n]),
            "prefix of length {n}"
        );
    }
    assert!(!tree.commit_next_symbol());
}

proptest! {
    #[test]
    fn prop_tree_spells_every_substring(data in small_alphabet(300), cut in 0usize..300) {
        let n = cut.min(data.len());
        let mut tree = SuffixTree::new(&data, MAX_COPY_LEN);
        prop_assert_eq!(tree.commit(n), n);
        prop_assert_eq!(tree.distinct_substrings(), reference::distinct_substrings(&data[..n]));
    }

    #[test]
    fn prop_match_bounds(
        data in small_alphabet(300),
        target in prop::collection::vec(0u8..4, 0..20),
        min_start in 0usize..300,
    ) {
        let mut tree = SuffixTree::new(&data, MAX_COPY_LEN);
        tree.commit_all();
        if let Some(m) = tree.find_longest_match_after(&target, min_start) {
            prop_assert!(m.len >= 1);
            prop_assert!(m.len <= target.len());
            prop_assert!(m.start >= min_start);
            prop_assert!(m.start + m.len <= data.len());
            prop_assert_eq!(&data[m.start..m.start + m.len], &target[..m.len]);
        }
    }

    #[test]
    fn prop_latest_occurrence_never_decreases(data in small_alphabet(200)) {
        let probes: [&[u8]; 4] = [&[0], &[0, 1], &[1, 1], &[2, 3, 0]];
        let mut tree = SuffixTree::new(&data, MAX_COPY_LEN);
        let mut last = vec![None; probes.len()];
        while tree.commit_next_symbol() {
            for (probe, seen) in probes.iter().zip(last.iter_mut()) {
                let now = tree.latest_occurrence_of(probe);
                prop_assert!(now >= *seen);
                *seen = now;
            }
        }
    }
}
