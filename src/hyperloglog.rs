//! ## HyperLogLog registers
//! Dense HyperLogLog representation with `M = 2^P` registers of one byte each.
//!
//! [Original HyperLogLog paper](http://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)
//!
//! Register encoding:
//! - `registers[i]` stores the maximum rank observed for hashes routed to register `i`,
//!   where rank is the number of leading zeros of the remaining `64 - P` hash bits plus one.
//! - Ranks never exceed `64 - P + 1`, which fits into `u8` for every supported precision.

use std::mem::{size_of, size_of_val};

/// 2^64 as floating point, used by the large range correction
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct HyperLogLog {
    /// Number of bits used for register indices
    precision: u8,
    /// Register ranks
    registers: Box<[u8]>,
}

impl HyperLogLog {
    /// Create new instance of `HyperLogLog` representation with all registers set to 0.
    /// Caller must ensure that `precision` is within supported range.
    #[inline]
    pub(crate) fn new(precision: u8) -> Self {
        Self {
            precision,
            registers: vec![0u8; 1 << precision].into_boxed_slice(),
        }
    }

    /// Number of registers
    #[inline]
    pub(crate) fn m(&self) -> usize {
        self.registers.len()
    }

    /// Return register index and rank of a 64-bit hash
    #[inline]
    pub(crate) fn decode_hash(&self, hash: u64) -> (usize, u8) {
        let p = u32::from(self.precision);
        let idx = (hash >> (64 - p)) as usize;
        // remaining bits are shifted to the top; an all-zero remainder yields 64 - p leading zeros
        let rest = hash << p;
        let rank = rest.leading_zeros().min(64 - p) + 1;
        (idx, rank as u8)
    }

    /// Insert a 64-bit hash. Returns true if a register was raised.
    #[inline]
    pub(crate) fn insert_hash(&mut self, hash: u64) -> bool {
        let (idx, rank) = self.decode_hash(hash);
        self.update_rank(idx, rank)
    }

    /// Raise register `idx` to `new_rank` if it is currently lower
    #[inline]
    fn update_rank(&mut self, idx: usize, new_rank: u8) -> bool {
        let register = &mut self.registers[idx];
        if new_rank > *register {
            *register = new_rank;
            return true;
        }
        false
    }

    /// Merge two `HyperLogLog` representations of equal precision.
    #[inline]
    pub(crate) fn merge(&mut self, rhs: &HyperLogLog) {
        for (lhs, &rhs) in self.registers.iter_mut().zip(rhs.registers.iter()) {
            *lhs = (*lhs).max(rhs);
        }
    }

    /// Return register ranks
    #[inline]
    pub(crate) fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Return number of zero registers and harmonic sum `Σ 2^(-register[i])`
    #[inline]
    fn zeros_and_sum(&self) -> (usize, f64) {
        self.registers
            .iter()
            .fold((0, 0.0), |(zeros, sum), &rank| {
                (zeros + usize::from(rank == 0), sum + inv_pow2(rank))
            })
    }

    /// Return cardinality estimate of `HyperLogLog` representation
    pub(crate) fn estimate(&self) -> f64 {
        let m = self.m() as f64;
        let (zeros, sum) = self.zeros_and_sum();
        let raw = alpha(self.m()) * m * m / sum;

        if raw <= 2.5 * m && zeros > 0 {
            // small range correction: linear counting over empty registers
            m * (m / zeros as f64).ln()
        } else if raw >= TWO_POW_64 {
            // saturated registers: the correction is undefined past the hash space
            raw
        } else if raw > TWO_POW_64 / 30.0 {
            // large range correction for hash collisions in the 64-bit space
            -TWO_POW_64 * (1.0 - raw / TWO_POW_64).ln()
        } else {
            raw
        }
    }

    /// Return memory size of `HyperLogLog`
    #[inline]
    pub(crate) fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.registers)
    }
}

/// Return `2^(-rank)`
#[inline]
fn inv_pow2(rank: u8) -> f64 {
    f64::from_bits((1023 - u64::from(rank)) << 52)
}

/// Parameter for bias correction
#[inline]
pub(crate) fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}
