use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Width of the ring's hash space in bits.
pub const RING_BITS: u32 = 160;

const LIMBS: usize = 3;

/// Position in the 160-bit hash space of the ring.
///
/// Every position handled by the planner is a partition or subpartition
/// boundary, i.e. a small integer shifted left by the ring increment, so
/// the only arithmetic the type supports is shifting values in and out of
/// the hash space. Stored as three big-endian `u64` limbs; the top 32 bits
/// are always zero.
///
/// `Display` renders the exact decimal integer, the form boundary hashes
/// appear in at the execution layer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RingIndex([u64; LIMBS]);

impl RingIndex {
    /// The lowest position on the ring.
    pub const ZERO: Self = Self([0; LIMBS]);

    /// Returns `value << shift` as a ring position.
    ///
    /// The shifted value must fit into [`RING_BITS`] bits.
    pub fn from_shifted(value: u64, shift: u32) -> Self {
        debug_assert!(shift <= RING_BITS);
        debug_assert!(value == 0 || shift + (u64::BITS - value.leading_zeros()) <= RING_BITS);
        if value == 0 {
            return Self::ZERO;
        }

        let mut limbs = [0u64; LIMBS];
        let limb = (shift / u64::BITS) as usize;
        let offset = shift % u64::BITS;

        limbs[LIMBS - 1 - limb] = value << offset;
        if offset != 0 && limb + 1 < LIMBS {
            limbs[LIMBS - 2 - limb] = value >> (u64::BITS - offset);
        }
        Self(limbs)
    }

    /// Returns `self >> shift`.
    ///
    /// Only the top 64 bits of the hash space can be extracted this way,
    /// which is all the planner needs: partition and subpartition counts
    /// never exceed `2^64`.
    pub fn high_bits(self, shift: u32) -> u64 {
        debug_assert!(shift >= RING_BITS - u64::BITS && shift <= RING_BITS);
        if shift == RING_BITS {
            return 0;
        }

        let limb = (shift / u64::BITS) as usize;
        let offset = shift % u64::BITS;

        let mut value = self.0[LIMBS - 1 - limb] >> offset;
        if offset != 0 && limb + 1 < LIMBS {
            value |= self.0[LIMBS - 2 - limb] << (u64::BITS - offset);
        }
        value
    }

    /// Whether this is the lowest position on the ring.
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

// Division of the 192-bit limb value by a single small divisor, used only
// to produce the decimal rendering.
fn div_rem(limbs: &mut [u64; LIMBS], divisor: u64) -> u64 {
    let mut rem: u128 = 0;
    for limb in limbs.iter_mut() {
        let cur = (rem << u64::BITS) | u128::from(*limb);
        *limb = (cur / u128::from(divisor)) as u64;
        rem = cur % u128::from(divisor);
    }
    rem as u64
}

impl fmt::Display for RingIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Largest power of ten below 2^64; the value is printed in chunks
        // of 19 decimal digits.
        const CHUNK: u64 = 10_000_000_000_000_000_000;

        let mut limbs = self.0;
        let mut chunks = Vec::with_capacity(LIMBS);
        loop {
            chunks.push(div_rem(&mut limbs, CHUNK));
            if limbs == [0; LIMBS] {
                break;
            }
        }

        let mut rest = chunks.iter().rev();
        if let Some(head) = rest.next() {
            write!(f, "{head}")?;
        }
        for chunk in rest {
            write!(f, "{chunk:019}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RingIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RingIndex({self})")
    }
}
