use {
    crate::plan::VnodeCoverage,
    serde::{Deserialize, Serialize},
};

/// Which vnodes a plan may draw on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Cover every partition; fail if the available vnodes cannot.
    All,
    /// Cover what the currently available vnodes can reach.
    AllUp,
    /// Rebuild the one-vnode plan described by a captured descriptor.
    Replay(VnodeCoverage),
}

/// Replication parameters of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NValSpec {
    /// Plan coverage against the replication factor.
    NVal(u64),
    /// Split the ring into `count` subpartitions instead of planning
    /// whole vnodes. `ring_size` restates the partition count the caller
    /// believes in and must match the snapshot.
    Subpartitions {
        n_val: u64,
        ring_size: u64,
        count: u64,
    },
}

/// Inputs of one planning call.
///
/// Constructed per mode and refined with the chainable setters:
///
/// ```
/// use coverage::PlanRequest;
///
/// let request = PlanRequest::new(3).allup().pvc(2).req_id(42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub(crate) target: Target,
    pub(crate) n_val: NValSpec,
    pub(crate) pvc: u64,
    pub(crate) req_id: u64,
    pub(crate) service: String,
}

impl PlanRequest {
    /// Coverage request against replication factor `n_val`.
    ///
    /// Defaults: every partition must be covered once, request id 0,
    /// service `"kv"`.
    pub fn new(n_val: u64) -> Self {
        Self {
            target: Target::All,
            n_val: NValSpec::NVal(n_val),
            pvc: 1,
            req_id: 0,
            service: "kv".to_string(),
        }
    }

    /// Subpartition request: `count` ranges over a ring of `ring_size`
    /// partitions.
    pub fn subpartitioned(n_val: u64, ring_size: u64, count: u64) -> Self {
        Self {
            n_val: NValSpec::Subpartitions {
                n_val,
                ring_size,
                count,
            },
            ..Self::new(n_val)
        }
    }

    /// Replay of a previously captured descriptor.
    pub fn replay(descriptor: VnodeCoverage) -> Self {
        Self {
            target: Target::Replay(descriptor),
            ..Self::new(1)
        }
    }

    /// Accept a partial plan when some vnodes are down.
    ///
    /// No effect on a replay request.
    pub fn allup(mut self) -> Self {
        if !matches!(self.target, Target::Replay(_)) {
            self.target = Target::AllUp;
        }
        self
    }

    /// Number of distinct vnodes that must cover each partition.
    ///
    /// Clamped to the replication factor during planning.
    pub fn pvc(mut self, pvc: u64) -> Self {
        self.pvc = pvc;
        self
    }

    /// Request identity, used only to rotate vnode selection between
    /// requests.
    pub fn req_id(mut self, req_id: u64) -> Self {
        self.req_id = req_id;
        self
    }

    /// Service name handed to the availability oracle.
    pub fn service<S: Into<String>>(mut self, service: S) -> Self {
        self.service = service.into();
        self
    }
}
