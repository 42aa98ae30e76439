use crate::index::RingIndex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoverageError {
    /// The vnodes currently available cannot cover every partition the
    /// requested number of times.
    #[error("insufficient vnodes available")]
    InsufficientVnodes,

    /// Replication factor of zero, or larger than the ring.
    #[error("invalid replication factor: {0}")]
    InvalidNVal(u64),

    /// Requested coverage factor of zero.
    #[error("coverage factor must be positive")]
    InvalidPvc,

    /// Ring snapshot with a partition count that is zero or not a power
    /// of two.
    #[error("partition count must be a nonzero power of two, got {0}")]
    InvalidPartitionCount(u64),

    /// Subpartition request for a count that is zero or not a power of
    /// two.
    #[error("subpartition count must be a nonzero power of two, got {0}")]
    InvalidSubpartitionCount(u64),

    /// Subpartition request built against a different ring size than the
    /// snapshot holds.
    #[error("request names a ring of {requested} partitions, snapshot has {actual}")]
    RingSizeMismatch { requested: u64, actual: u64 },

    /// The ring snapshot reported no owner for an index it produced.
    #[error("ring has no owner for index {0}")]
    UnknownIndex(RingIndex),

    /// Ring construction from an empty node list.
    #[error("cannot build a ring without nodes")]
    EmptyNodeList,
}

pub type CoverageResult<T> = Result<T, CoverageError>;
