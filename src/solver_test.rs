use {
    crate::solver::{best_candidate, covers, solve, Candidate, PartitionSet},
    proptest::prelude::*,
};

fn set(ids: &[u64]) -> PartitionSet {
    ids.iter().copied().collect()
}

fn candidate(tiebreaker: u64, vnode: u64, keyspace: &[u64]) -> Candidate {
    Candidate {
        tiebreaker,
        vnode,
        keyspace: set(keyspace),
    }
}

#[test]
fn covers_arithmetic() {
    assert_eq!(covers(&set(&[1, 2]), &set(&[0, 1, 2, 3])), 2);
    assert_eq!(covers(&set(&[1, 2]), &set(&[0, 1])), 1);
    assert_eq!(covers(&set(&[1, 2, 3]), &set(&[4, 5, 6, 7])), 0);
}

#[test]
fn best_vnode_selection() {
    let wanted = set(&[0, 1, 2, 3, 4]);

    // More coverage wins regardless of tiebreaker.
    let candidates = [
        candidate(2, 0, &[6, 7, 0, 1, 2]),
        candidate(1, 7, &[5, 6, 7, 0, 1]),
    ];
    let (score, position) = best_candidate(&wanted, &candidates).unwrap();
    assert_eq!((score, candidates[position].vnode), (3, 0));

    // Equal coverage: the lower tiebreaker wins.
    let candidates = [
        candidate(2, 0, &[6, 7, 0, 1, 2]),
        candidate(1, 7, &[6, 7, 0, 1, 2]),
    ];
    let (_, position) = best_candidate(&wanted, &candidates).unwrap();
    assert_eq!(candidates[position].vnode, 7);

    let candidates = [
        candidate(2, 0, &[6, 7, 0, 1, 2]),
        candidate(3, 7, &[6, 7, 0, 1, 2]),
    ];
    let (_, position) = best_candidate(&wanted, &candidates).unwrap();
    assert_eq!(candidates[position].vnode, 0);

    // Full tie: the lower vnode id wins.
    let candidates = [
        candidate(1, 5, &[0, 1]),
        candidate(1, 3, &[0, 1]),
    ];
    let (_, position) = best_candidate(&wanted, &candidates).unwrap();
    assert_eq!(candidates[position].vnode, 3);

    assert_eq!(best_candidate(&wanted, &[]), None);
}

#[test]
fn single_pass_reference() {
    // 8 partitions, replication 3, request id 1234 (offset 1).
    let coverage = solve(8, 3, 1234 % 3, &set(&[]), 1).unwrap();
    assert_eq!(
        coverage,
        [
            (2, vec![0, 1, 7]),
            (4, vec![2, 3]),
            (7, vec![4, 5, 6]),
        ]
    );
}

#[test]
fn insufficient_returns_partial() {
    // Only vnodes 6 and 7 are up; they reach partitions 3..=6.
    let failure = solve(8, 3, 0, &set(&[0, 1, 2, 3, 4, 5]), 1).unwrap_err();
    assert_eq!(failure.uncovered, set(&[0, 1, 2, 7]));
    assert_eq!(failure.partial, [(6, vec![3, 4, 5]), (7, vec![6])]);
}

#[test]
fn saturating_passes_use_every_vnode() {
    // With as many passes as replicas, the 24 coverage slots of an
    // 8-partition ring exhaust every vnode's keyspace.
    let coverage = solve(8, 3, 0, &set(&[]), 3).unwrap();
    assert_eq!(coverage.len(), 8);
    for (vnode, partitions) in &coverage {
        assert_eq!(
            set(partitions),
            crate::partition::n_keyspaces(*vnode, 3, 8)
        );
    }
}

#[test]
fn zero_passes_yield_nothing() {
    assert!(solve(8, 3, 0, &set(&[]), 0).unwrap().is_empty());
}

#[test]
fn offset_rotates_selection() {
    let chosen = |offset: u64| -> Vec<u64> {
        solve(8, 4, offset, &set(&[]), 1)
            .unwrap()
            .into_iter()
            .map(|(vnode, _)| vnode)
            .collect()
    };

    assert_eq!(chosen(0), chosen(0));
    assert_ne!(chosen(0), chosen(1));
    assert_ne!(chosen(1), chosen(2));
}

proptest! {
    /// One pass covers every partition exactly once.
    #[test]
    fn pass_covers_every_partition(
        p_log in 1u32..7,
        n_raw in 1u64..9,
        req_id in 0u64..10_000,
    ) {
        let partition_count = 1u64 << p_log;
        let n_val = n_raw.min(partition_count);
        let coverage =
            solve(partition_count, n_val, req_id % n_val, &set(&[]), 1).unwrap();

        let mut seen = vec![0u32; partition_count as usize];
        for (_, partitions) in &coverage {
            for partition in partitions {
                seen[*partition as usize] += 1;
            }
        }
        prop_assert!(seen.iter().all(|count| *count == 1));
    }

    /// `passes` passes credit every partition to `passes` distinct
    /// vnodes, and never more vnodes than partitions are chosen.
    #[test]
    fn passes_multiply_coverage(
        p_log in 1u32..6,
        n_raw in 1u64..9,
        passes_raw in 1u64..5,
        req_id in 0u64..10_000,
    ) {
        let partition_count = 1u64 << p_log;
        let n_val = n_raw.min(partition_count);
        let passes = passes_raw.min(n_val);
        let coverage =
            solve(partition_count, n_val, req_id % n_val, &set(&[]), passes).unwrap();

        prop_assert!(coverage.len() as u64 <= partition_count);
        prop_assert!(
            coverage.len() as u64 >= partition_count.div_ceil(n_val)
        );

        let mut seen = vec![0u64; partition_count as usize];
        for (vnode, partitions) in &coverage {
            // Credited partitions come from the vnode's own keyspace.
            let keyspace = crate::partition::n_keyspaces(*vnode, n_val, partition_count);
            for partition in partitions {
                prop_assert!(keyspace.contains(partition));
                seen[*partition as usize] += 1;
            }
        }
        prop_assert!(seen.iter().all(|count| *count == passes));
    }

    /// Identical inputs produce identical coverage.
    #[test]
    fn deterministic(
        p_log in 1u32..7,
        n_raw in 1u64..9,
        req_id in 0u64..10_000,
        down in prop::collection::btree_set(0u64..64, 0..8),
    ) {
        let partition_count = 1u64 << p_log;
        let n_val = n_raw.min(partition_count);
        let unavailable: PartitionSet =
            down.into_iter().filter(|vnode| *vnode < partition_count).collect();

        let first = solve(partition_count, n_val, req_id % n_val, &unavailable, 1);
        let second = solve(partition_count, n_val, req_id % n_val, &unavailable, 1);
        prop_assert_eq!(first, second);
    }

    /// Down vnodes never appear in the output, complete or partial.
    #[test]
    fn down_vnodes_never_chosen(
        p_log in 1u32..7,
        n_raw in 1u64..9,
        req_id in 0u64..10_000,
        down in prop::collection::btree_set(0u64..64, 0..16),
    ) {
        let partition_count = 1u64 << p_log;
        let n_val = n_raw.min(partition_count);
        let unavailable: PartitionSet =
            down.into_iter().filter(|vnode| *vnode < partition_count).collect();

        let coverage = match solve(partition_count, n_val, req_id % n_val, &unavailable, 1) {
            Ok(coverage) => coverage,
            Err(failure) => failure.partial,
        };
        for (vnode, _) in &coverage {
            prop_assert!(!unavailable.contains(vnode));
        }
    }
}
