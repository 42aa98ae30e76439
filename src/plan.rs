use {
    crate::{
        error::{CoverageError, CoverageResult},
        index::{RingIndex, RING_BITS},
        partition::{data_bits, partition_index, PartitionId},
        ring::RingView,
    },
    serde::{Deserialize, Serialize},
};

/// Equal-sized hash range finer than a partition.
///
/// Subpartition `id` spans `[id << bit_shift, (id + 1) << bit_shift)`;
/// `bit_shift` is `160 - log2(count)` for a ring split into `count`
/// subpartitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subpartition {
    pub id: u64,
    pub bit_shift: u32,
}

impl Subpartition {
    pub fn new(id: u64, bit_shift: u32) -> Self {
        Self { id, bit_shift }
    }

    /// Inclusive lower bound of the range.
    pub fn start(&self) -> RingIndex {
        RingIndex::from_shifted(self.id, self.bit_shift)
    }

    /// Exclusive upper bound of the range, `None` when the range reaches
    /// the end of the hash space.
    pub fn end(&self) -> Option<RingIndex> {
        let next = self.id + 1;
        let fits = self.bit_shift + (u64::BITS - next.leading_zeros()) <= RING_BITS;
        fits.then(|| RingIndex::from_shifted(next, self.bit_shift))
    }
}

/// Restriction attached to one planned vnode.
///
/// A vnode carries a filter exactly when it contributes less than its
/// whole keyspace; the caller discards keys the filter does not admit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// Keep only keys whose partition upper-bound hash is listed.
    Partitions(Vec<RingIndex>),
    /// Keep only keys inside the subpartition's hash range.
    Subpartition(Subpartition),
}

/// Descriptor of a single previously planned vnode.
///
/// Captured from a plan when one vnode of it fails mid-stream, shipped to
/// the retrying process, and replayed there as a one-element plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnodeCoverage {
    pub index: RingIndex,
    pub partition_filters: Vec<RingIndex>,
    pub subpartition: Option<Subpartition>,
}

impl VnodeCoverage {
    /// Descriptor for a vnode that contributed its whole keyspace.
    pub fn new(index: RingIndex) -> Self {
        Self {
            index,
            partition_filters: Vec::new(),
            subpartition: None,
        }
    }

    /// Descriptor for a vnode restricted to the given partition hashes.
    pub fn with_filters(index: RingIndex, partition_filters: Vec<RingIndex>) -> Self {
        Self {
            index,
            partition_filters,
            subpartition: None,
        }
    }

    /// Descriptor for one subpartition of a subpartition plan.
    pub fn subpartitioned(index: RingIndex, subpartition: Subpartition) -> Self {
        Self {
            index,
            partition_filters: Vec::new(),
            subpartition: Some(subpartition),
        }
    }
}

/// Traditional coverage plan: the chosen vnodes plus per-vnode filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveragePlan<N> {
    /// Chosen vnodes, one `(index, owner)` entry each.
    pub vnodes: Vec<(RingIndex, N)>,
    /// Filters for the vnodes contributing less than their whole
    /// keyspace.
    pub filters: Vec<(RingIndex, Filter)>,
}

impl<N> CoveragePlan<N> {
    /// Replay descriptor for the plan entry at `index`, if the plan has
    /// one.
    pub fn coverage_of(&self, index: RingIndex) -> Option<VnodeCoverage> {
        self.vnodes.iter().find(|(entry, _)| *entry == index)?;

        let filter = self
            .filters
            .iter()
            .find(|(entry, _)| *entry == index)
            .map(|(_, filter)| filter);
        Some(match filter {
            Some(Filter::Partitions(hashes)) => VnodeCoverage::with_filters(index, hashes.clone()),
            Some(Filter::Subpartition(subpartition)) => {
                VnodeCoverage::subpartitioned(index, *subpartition)
            }
            None => VnodeCoverage::new(index),
        })
    }
}

/// One entry of a subpartition plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubpartitionEntry<N> {
    pub index: RingIndex,
    pub node: N,
    pub subpartition: Subpartition,
}

/// Output of the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan<N> {
    /// Vnode list plus filters; also the shape of a replayed descriptor.
    Coverage(CoveragePlan<N>),
    /// One entry per requested subpartition, duplicates allowed.
    Subpartitions(Vec<SubpartitionEntry<N>>),
}

impl<N> Plan<N> {
    pub fn as_coverage(&self) -> Option<&CoveragePlan<N>> {
        match self {
            Plan::Coverage(plan) => Some(plan),
            Plan::Subpartitions(_) => None,
        }
    }

    pub fn as_subpartitions(&self) -> Option<&[SubpartitionEntry<N>]> {
        match self {
            Plan::Coverage(_) => None,
            Plan::Subpartitions(entries) => Some(entries),
        }
    }
}

/// Converts solver coverage into the public plan shape.
///
/// Solver output ascends by vnode id; the emitted plan lists vnodes in the
/// reverse order. A vnode whose contribution is a strict subset of its
/// keyspace gets a filter entry holding each contributed partition as its
/// upper-bound hash, `((partition + 1) mod P)` times the ring increment.
pub(crate) fn assemble<R: RingView>(
    ring: &R,
    n_val: u64,
    coverage: &[(PartitionId, Vec<PartitionId>)],
) -> CoverageResult<CoveragePlan<R::Node>> {
    let partition_count = ring.partition_count();
    let mut vnodes = Vec::with_capacity(coverage.len());
    let mut filters = Vec::new();

    for (vnode, partitions) in coverage.iter().rev() {
        let index = partition_index(vnode % partition_count, partition_count);
        let node = ring.owner(index).ok_or(CoverageError::UnknownIndex(index))?;
        if (partitions.len() as u64) < n_val {
            let hashes = partitions
                .iter()
                .map(|partition| partition_index((partition + 1) % partition_count, partition_count))
                .collect();
            filters.push((index, Filter::Partitions(hashes)));
        }
        vnodes.push((index, node));
    }

    Ok(CoveragePlan { vnodes, filters })
}

/// Builds the subpartition plan: one entry per subpartition id, each
/// routed to the vnode of the partition containing the range's start.
///
/// Availability is not consulted here and identical vnode entries are not
/// merged; callers parallelize per subpartition.
pub(crate) fn subpartitions<R: RingView>(
    ring: &R,
    count: u64,
) -> CoverageResult<Vec<SubpartitionEntry<R::Node>>> {
    let partition_count = ring.partition_count();
    let bit_shift = data_bits(count);

    (0..count)
        .map(|id| {
            let subpartition = Subpartition::new(id, bit_shift);
            let partition = ring.partition_at(subpartition.start());
            let index = partition_index(partition, partition_count);
            let node = ring.owner(index).ok_or(CoverageError::UnknownIndex(index))?;
            Ok(SubpartitionEntry {
                index,
                node,
                subpartition,
            })
        })
        .collect()
}
