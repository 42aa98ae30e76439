use {
    crate::{
        index::RingIndex,
        ring::{Node, RingView},
    },
    auto_impl::auto_impl,
    std::collections::HashSet,
};

/// Liveness source consumed by the planner.
///
/// For a given service, reports the vnodes whose owners are currently
/// down. Down vnodes are excluded from selection but still count toward
/// the coverage a plan owes.
#[auto_impl(&)]
pub trait AvailabilityOracle<N: Node> {
    /// `(index, owner)` pairs for every vnode that must not be planned.
    ///
    /// Entries follow ring order; the planner only consumes the indices.
    fn offline_owners<R>(&self, service: &str, ring: &R) -> Vec<(RingIndex, N)>
    where
        R: RingView<Node = N>;
}

/// Oracle for deployments without liveness data: every vnode is up.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOnline;

impl<N: Node> AvailabilityOracle<N> for AllOnline {
    fn offline_owners<R>(&self, _service: &str, _ring: &R) -> Vec<(RingIndex, N)>
    where
        R: RingView<Node = N>,
    {
        Vec::new()
    }
}

/// Oracle backed by a fixed set of downed nodes.
///
/// Every vnode owned by a downed node is reported offline, the projection
/// a node-liveness service performs onto the ring.
#[derive(Debug, Clone, Default)]
pub struct NodeOutages<N: Node> {
    down: HashSet<N>,
}

impl<N: Node> NodeOutages<N> {
    pub fn new<I: IntoIterator<Item = N>>(down: I) -> Self {
        Self {
            down: down.into_iter().collect(),
        }
    }

    /// Marks another node as down.
    pub fn mark_down(&mut self, node: N) {
        self.down.insert(node);
    }
}

impl<N: Node> AvailabilityOracle<N> for NodeOutages<N> {
    fn offline_owners<R>(&self, _service: &str, ring: &R) -> Vec<(RingIndex, N)>
    where
        R: RingView<Node = N>,
    {
        ring.entries()
            .into_iter()
            .filter(|(_, owner)| self.down.contains(owner))
            .collect()
    }
}
