use {
    crate::partition::{n_keyspaces, PartitionId},
    std::{
        cmp::Reverse,
        collections::{BTreeMap, BTreeSet},
    },
    tracing::trace,
};

/// Sorted set of partition ids.
///
/// Ordered containers keep iteration deterministic, which whole-plan
/// comparisons depend on.
pub(crate) type PartitionSet = BTreeSet<PartitionId>;

/// Solved coverage: `(vnode, partitions credited to it)`, ascending by
/// vnode id, each partition list sorted.
pub(crate) type Coverage = Vec<(PartitionId, Vec<PartitionId>)>;

/// A vnode still eligible for selection within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    /// Secondary sort key: `(vnode + offset) mod P`. Rotating the offset
    /// across requests rotates which of several tied vnodes wins.
    pub tiebreaker: PartitionId,
    pub vnode: PartitionId,
    /// Partitions this vnode can still contribute.
    pub keyspace: PartitionSet,
}

/// A solver run that could not finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Insufficient {
    /// Partitions the failing pass left uncovered.
    pub uncovered: PartitionSet,
    /// Everything credited before the run stopped, merged per vnode.
    pub partial: Coverage,
}

/// Number of partitions in `keyspace` that are still wanted.
pub(crate) fn covers(keyspace: &PartitionSet, wanted: &PartitionSet) -> usize {
    keyspace.intersection(wanted).count()
}

/// Position and score of the best remaining candidate.
///
/// The order is strict: more coverage first, then the smaller tiebreaker,
/// then the smaller vnode id.
pub(crate) fn best_candidate(
    uncovered: &PartitionSet,
    candidates: &[Candidate],
) -> Option<(usize, usize)> {
    candidates
        .iter()
        .enumerate()
        .map(|(position, candidate)| (covers(&candidate.keyspace, uncovered), position, candidate))
        .min_by_key(|(score, _, candidate)| (Reverse(*score), candidate.tiebreaker, candidate.vnode))
        .map(|(score, position, _)| (score, position))
}

struct PassFailure {
    uncovered: PartitionSet,
    picks: Vec<(PartitionId, PartitionSet)>,
}

/// One greedy pass: select vnodes until every partition in `all` is
/// covered, or no candidate adds coverage.
fn cover_all(
    all: &PartitionSet,
    mut candidates: Vec<Candidate>,
) -> Result<Vec<(PartitionId, PartitionSet)>, PassFailure> {
    let mut uncovered = all.clone();
    let mut picks = Vec::new();

    while !uncovered.is_empty() {
        let selected = match best_candidate(&uncovered, &candidates) {
            Some((score, position)) if score > 0 => candidates.remove(position),
            _ => return Err(PassFailure { uncovered, picks }),
        };

        let contributed: PartitionSet = uncovered
            .intersection(&selected.keyspace)
            .copied()
            .collect();
        trace!(
            vnode = selected.vnode,
            covered = contributed.len(),
            remaining = uncovered.len() - contributed.len(),
            "selected coverage vnode"
        );
        for partition in &selected.keyspace {
            uncovered.remove(partition);
        }
        picks.push((selected.vnode, contributed));
    }

    Ok(picks)
}

/// Candidate list for one pass.
///
/// A vnode that already contributed in an earlier pass stays eligible,
/// but only for the partitions not yet credited to it.
fn candidates(
    partition_count: u64,
    n_val: u64,
    offset: u64,
    unavailable: &PartitionSet,
    credited: &BTreeMap<PartitionId, PartitionSet>,
) -> Vec<Candidate> {
    let nothing = PartitionSet::new();
    (0..partition_count)
        .filter(|vnode| !unavailable.contains(vnode))
        .map(|vnode| {
            let already = credited.get(&vnode).unwrap_or(&nothing);
            Candidate {
                tiebreaker: (vnode + offset) % partition_count,
                vnode,
                keyspace: n_keyspaces(vnode, n_val, partition_count)
                    .difference(already)
                    .copied()
                    .collect(),
            }
        })
        .collect()
}

fn credit(credited: &mut BTreeMap<PartitionId, PartitionSet>, picks: Vec<(PartitionId, PartitionSet)>) {
    for (vnode, partitions) in picks {
        credited.entry(vnode).or_default().extend(partitions);
    }
}

fn flatten(credited: BTreeMap<PartitionId, PartitionSet>) -> Coverage {
    credited
        .into_iter()
        .map(|(vnode, partitions)| (vnode, partitions.into_iter().collect()))
        .collect()
}

/// Greedy set cover over the ring's partitions, applied `passes` times.
///
/// Each pass covers every partition once; across passes a partition ends
/// up credited to `passes` distinct vnodes. `offset` rotates the
/// tiebreaker so equal requests with different ids spread their load over
/// different vnode sets. Zero passes yield an empty coverage.
pub(crate) fn solve(
    partition_count: u64,
    n_val: u64,
    offset: u64,
    unavailable: &PartitionSet,
    passes: u64,
) -> Result<Coverage, Insufficient> {
    let all: PartitionSet = (0..partition_count).collect();
    let mut credited = BTreeMap::new();

    for _ in 0..passes {
        let eligible = candidates(partition_count, n_val, offset, unavailable, &credited);
        match cover_all(&all, eligible) {
            Ok(picks) => credit(&mut credited, picks),
            Err(failure) => {
                credit(&mut credited, failure.picks);
                return Err(Insufficient {
                    uncovered: failure.uncovered,
                    partial: flatten(credited),
                });
            }
        }
    }

    Ok(flatten(credited))
}
