use {
    crate::index::{RingIndex, RING_BITS},
    std::collections::BTreeSet,
};

/// Identifier of a ring partition, in `[0, partition_count)`.
///
/// The partition's upper-bound hash is `partition_id` times the ring
/// increment; a vnode is named by the partition id of its primary
/// position.
pub type PartitionId = u64;

/// Bit shift equivalent of the ring increment `2^160 / P`.
///
/// Partition counts are powers of two, so multiplying by the increment is
/// a left shift by this amount.
pub fn ring_shift(partition_count: u64) -> u32 {
    debug_assert!(partition_count.is_power_of_two());
    RING_BITS - partition_count.trailing_zeros()
}

/// Hash-space position of the given partition.
pub fn partition_index(partition: PartitionId, partition_count: u64) -> RingIndex {
    RingIndex::from_shifted(partition, ring_shift(partition_count))
}

/// Partition responsible for the given hash.
pub fn partition_of(hash: RingIndex, partition_count: u64) -> PartitionId {
    hash.high_bits(ring_shift(partition_count))
}

/// The set of partitions for which `vnode` is one of the `n_val`
/// successor owners on the ring.
///
/// For `vnode` at partition `v` these are the `n_val` partitions
/// immediately counter-clockwise of it: `{(P + v - N + k) mod P}` for
/// `k` in `[0, N)`. Returned sorted; cardinality is `min(n_val, P)`.
pub fn n_keyspaces(vnode: PartitionId, n_val: u64, partition_count: u64) -> BTreeSet<PartitionId> {
    let n_val = n_val.min(partition_count);
    (0..n_val)
        .map(|k| (partition_count + vnode - n_val + k) % partition_count)
        .collect()
}

/// Bit shift separating a subpartition id from the hash bits below it.
///
/// A request for `subpartitions` ranges (a power of two) leaves
/// `160 - log2(subpartitions)` data bits per range.
pub fn data_bits(subpartitions: u64) -> u32 {
    debug_assert!(subpartitions.is_power_of_two());
    RING_BITS - subpartitions.trailing_zeros()
}
