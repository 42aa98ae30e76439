mod availability;
pub mod error;
mod index;
mod partition;
mod plan;
mod request;
mod ring;
mod solver;

#[cfg(test)]
mod solver_test;

pub use {
    availability::{AllOnline, AvailabilityOracle, NodeOutages},
    error::*,
    index::{RingIndex, RING_BITS},
    partition::{data_bits, n_keyspaces, partition_index, partition_of, ring_shift, PartitionId},
    plan::{CoveragePlan, Filter, Plan, Subpartition, SubpartitionEntry, VnodeCoverage},
    request::{NValSpec, PlanRequest, Target},
    ring::{Node, RingSnapshot, RingView},
};
use {
    solver::PartitionSet,
    tracing::{debug, warn},
};

/// Coverage planner over a consistent-hash ring.
///
/// Given a ring of `P` partitions each replicated onto `N` successive
/// vnodes, computes a near-minimal set of vnodes whose aggregate
/// responsibility covers every partition, so a fold or full-keyspace
/// query visits every key exactly once while touching as few vnodes as
/// possible.
///
/// Coverage is solved greedily; ties between equally useful vnodes are
/// broken by a rotation derived from the request id, so repeated requests
/// spread their load across different vnode sets while each single
/// request stays deterministic.
///
/// The planner is pure: both collaborators are read once per call, no
/// state survives between calls, and concurrent calls need no
/// coordination. `local_node` is where replayed descriptors are routed;
/// retries are issued by the process co-located with the failed vnode, so
/// embedders pass their own identity here.
pub struct Planner<R, A>
where
    R: RingView,
    A: AvailabilityOracle<R::Node>,
{
    ring: R,
    availability: A,
    local_node: R::Node,
}

impl<R, A> Planner<R, A>
where
    R: RingView,
    A: AvailabilityOracle<R::Node>,
{
    pub fn new(ring: R, availability: A, local_node: R::Node) -> Self {
        Self {
            ring,
            availability,
            local_node,
        }
    }

    /// Computes the plan for one request.
    ///
    /// Dispatches on the request shape: a captured descriptor replays as
    /// a one-element plan, a subpartition spec produces one entry per
    /// subpartition, and anything else runs the coverage solver.
    pub fn create_plan(&self, request: PlanRequest) -> CoverageResult<Plan<R::Node>> {
        let PlanRequest {
            target,
            n_val,
            pvc,
            req_id,
            service,
        } = request;

        match target {
            Target::Replay(descriptor) => self.replay(descriptor),
            Target::All | Target::AllUp => match n_val {
                NValSpec::Subpartitions {
                    n_val,
                    ring_size,
                    count,
                } => self.subpartition_plan(n_val, ring_size, count),
                NValSpec::NVal(n_val) => {
                    let best_effort = matches!(target, Target::AllUp);
                    self.coverage_plan(n_val, pvc, req_id, &service, best_effort)
                }
            },
        }
    }

    fn replay(&self, descriptor: VnodeCoverage) -> CoverageResult<Plan<R::Node>> {
        let VnodeCoverage {
            index,
            partition_filters,
            subpartition,
        } = descriptor;
        debug!(%index, "replaying single-vnode coverage");

        let filters = match subpartition {
            Some(subpartition) => vec![(index, Filter::Subpartition(subpartition))],
            None if partition_filters.is_empty() => Vec::new(),
            None => vec![(index, Filter::Partitions(partition_filters))],
        };
        Ok(Plan::Coverage(CoveragePlan {
            vnodes: vec![(index, self.local_node.clone())],
            filters,
        }))
    }

    fn coverage_plan(
        &self,
        n_val: u64,
        pvc: u64,
        req_id: u64,
        service: &str,
        best_effort: bool,
    ) -> CoverageResult<Plan<R::Node>> {
        let partition_count = self.checked_partition_count()?;
        if n_val == 0 || n_val > partition_count {
            return Err(CoverageError::InvalidNVal(n_val));
        }
        if pvc == 0 {
            return Err(CoverageError::InvalidPvc);
        }

        let unavailable: PartitionSet = self
            .availability
            .offline_owners(service, &self.ring)
            .into_iter()
            .map(|(index, _)| partition_of(index, partition_count))
            .collect();
        let offset = req_id % n_val;
        let passes = pvc.min(n_val);
        debug!(
            partition_count,
            n_val,
            passes,
            offset,
            unavailable = unavailable.len(),
            "planning ring coverage"
        );

        match solver::solve(partition_count, n_val, offset, &unavailable, passes) {
            Ok(coverage) => Ok(Plan::Coverage(plan::assemble(&self.ring, n_val, &coverage)?)),
            Err(insufficient) if best_effort => {
                warn!(
                    uncovered = insufficient.uncovered.len(),
                    "assembling partial coverage plan"
                );
                Ok(Plan::Coverage(plan::assemble(
                    &self.ring,
                    n_val,
                    &insufficient.partial,
                )?))
            }
            Err(_) => Err(CoverageError::InsufficientVnodes),
        }
    }

    // Availability is not consulted for subpartition plans.
    // TODO: filter subpartitions through the oracle once callers can
    // retarget an offline range instead of failing the whole request.
    fn subpartition_plan(
        &self,
        n_val: u64,
        ring_size: u64,
        count: u64,
    ) -> CoverageResult<Plan<R::Node>> {
        let partition_count = self.checked_partition_count()?;
        if n_val == 0 || n_val > partition_count {
            return Err(CoverageError::InvalidNVal(n_val));
        }
        if count == 0 || !count.is_power_of_two() {
            return Err(CoverageError::InvalidSubpartitionCount(count));
        }
        if ring_size != partition_count {
            return Err(CoverageError::RingSizeMismatch {
                requested: ring_size,
                actual: partition_count,
            });
        }

        debug!(partition_count, count, "planning subpartition coverage");
        Ok(Plan::Subpartitions(plan::subpartitions(&self.ring, count)?))
    }

    fn checked_partition_count(&self) -> CoverageResult<u64> {
        let partition_count = self.ring.partition_count();
        if partition_count == 0 || !partition_count.is_power_of_two() {
            return Err(CoverageError::InvalidPartitionCount(partition_count));
        }
        Ok(partition_count)
    }
}
