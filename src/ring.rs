use {
    crate::{
        error::{CoverageError, CoverageResult},
        index::RingIndex,
        partition::{partition_index, partition_of, PartitionId},
    },
    auto_impl::auto_impl,
    serde::{Deserialize, Serialize},
    std::{fmt, hash::Hash},
};

/// Identity of a physical node owning vnodes on the ring.
///
/// Deployments use whatever identifies a process in the cluster; tests
/// use string names. Anything cloneable and hashable qualifies.
pub trait Node: Clone + Eq + Hash + fmt::Debug + 'static {}

impl<T: Clone + Eq + Hash + fmt::Debug + 'static> Node for T {}

/// Read-only view of a ring snapshot.
///
/// The planner captures the view once at the start of a planning call; a
/// membership change after that point does not affect the in-flight plan.
/// Implementations must report one entry per partition, ascending by
/// index.
#[auto_impl(&)]
pub trait RingView {
    type Node: Node;

    /// Number of partitions in the ring. Always a nonzero power of two.
    fn partition_count(&self) -> u64;

    /// All `(index, owner)` entries, ascending by index.
    fn entries(&self) -> Vec<(RingIndex, Self::Node)>;

    /// Owner of the vnode at the given index.
    fn owner(&self, index: RingIndex) -> Option<Self::Node>;

    /// Partition responsible for the given hash.
    fn partition_at(&self, hash: RingIndex) -> PartitionId {
        partition_of(hash, self.partition_count())
    }
}

/// Immutable snapshot of ring ownership.
///
/// The in-crate [`RingView`] implementation, for embedders without a
/// separate ring manager and for tests. Holds one `(index, owner)` entry
/// per partition, ascending by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSnapshot<N> {
    partition_count: u64,
    entries: Vec<(RingIndex, N)>,
}

impl<N: Node> RingSnapshot<N> {
    /// Builds a snapshot by assigning partitions round-robin over `nodes`.
    pub fn assign(partition_count: u64, nodes: &[N]) -> CoverageResult<Self> {
        if partition_count == 0 || !partition_count.is_power_of_two() {
            return Err(CoverageError::InvalidPartitionCount(partition_count));
        }
        if nodes.is_empty() {
            return Err(CoverageError::EmptyNodeList);
        }

        let entries = (0..partition_count)
            .map(|partition| {
                let owner = nodes[partition as usize % nodes.len()].clone();
                (partition_index(partition, partition_count), owner)
            })
            .collect();
        Ok(Self {
            partition_count,
            entries,
        })
    }
}

impl<N: Node> RingView for RingSnapshot<N> {
    type Node = N;

    fn partition_count(&self) -> u64 {
        self.partition_count
    }

    fn entries(&self) -> Vec<(RingIndex, N)> {
        self.entries.clone()
    }

    fn owner(&self, index: RingIndex) -> Option<N> {
        self.entries
            .binary_search_by(|(entry, _)| entry.cmp(&index))
            .ok()
            .map(|position| self.entries[position].1.clone())
    }
}
