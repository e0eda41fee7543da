//! Hash strategies used by the bloom filter to derive bit indices.
//!
//! A strategy maps an item and a hash slot `i` in `[0, k)` to an index in
//! `[0, size)`. The mapping must be deterministic and should behave like `k`
//! independent uniform draws over the bit array.
//!
//! Three strategies are provided and can be selected at runtime via [`HashFamily`]:
//! - [`SeededWyHash`]: one wyhash pass per slot, seeded by `seed + slot` (default).
//! - [`DoubleHashing`]: two wyhash passes per item combined with the
//!   Kirsch-Mitzenmacher scheme `h0 + i * h1`.
//! - [`SaltedSha256`]: SHA-256 of `"{item}_{slot}"` reduced modulo `size` over
//!   the whole 256-bit digest. Slow, but stable across platforms and releases.
//!
//! Reference: Kirsch and Mitzenmacher (2008), "Less Hashing, Same Performance:
//! Building a Better Bloom Filter".

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use sha2::{Digest, Sha256};
use wyhash::wyhash;

/// Default seed used by wyhash-based strategies.
pub const DEFAULT_SEED: u64 = 0x5eed_b10f;

/// Strategy trait which must be implemented by all bloom filter hash families.
#[enum_dispatch]
pub trait HashStrategy {
    /// Return bit index in `[0, size)` for `item` and hash `slot`.
    fn index(&self, item: &[u8], slot: u32, size: usize) -> usize;
}

/// Independent wyhash per slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededWyHash {
    pub seed: u64,
}

/// Kirsch-Mitzenmacher double hashing on top of wyhash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleHashing {
    pub seed: u64,
}

/// SHA-256 digest of the item salted with `_{slot}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaltedSha256;

impl Default for SeededWyHash {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl Default for DoubleHashing {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl HashStrategy for SeededWyHash {
    #[inline]
    fn index(&self, item: &[u8], slot: u32, size: usize) -> usize {
        let hash = wyhash(item, self.seed.wrapping_add(u64::from(slot)));
        (hash % size as u64) as usize
    }
}

impl HashStrategy for DoubleHashing {
    #[inline]
    fn index(&self, item: &[u8], slot: u32, size: usize) -> usize {
        let h0 = wyhash(item, self.seed);
        let h1 = wyhash(item, h0);
        // slot is shifted to 1-based so that slot 0 still mixes in `h1`
        let hash = h0.wrapping_add(u64::from(slot + 1).wrapping_mul(h1));
        ((hash >> 1) % size as u64) as usize
    }
}

impl HashStrategy for SaltedSha256 {
    fn index(&self, item: &[u8], slot: u32, size: usize) -> usize {
        let mut hasher = Sha256::new();
        hasher.update(item);
        hasher.update(b"_");
        hasher.update(slot.to_string().as_bytes());
        let digest = hasher.finalize();
        digest_mod(&digest, size as u64) as usize
    }
}

/// Reduce a big-endian digest modulo `m` using Horner's method.
#[inline]
fn digest_mod(digest: &[u8], m: u64) -> u64 {
    let m = u128::from(m);
    let mut rem = 0u128;
    for &byte in digest {
        rem = ((rem << 8) | u128::from(byte)) % m;
    }
    rem as u64
}

/// Runtime-selectable hash family
#[enum_dispatch(HashStrategy)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFamily {
    SeededWyHash,
    DoubleHashing,
    SaltedSha256,
}

impl Default for HashFamily {
    fn default() -> Self {
        HashFamily::SeededWyHash(SeededWyHash::default())
    }
}

impl FromStr for HashFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wyhash" => Ok(SeededWyHash::default().into()),
            "double" => Ok(DoubleHashing::default().into()),
            "sha256" => Ok(SaltedSha256.into()),
            other => Err(format!(
                "unknown hash family `{other}`, expected one of: wyhash, double, sha256"
            )),
        }
    }
}

impl Display for HashFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HashFamily::SeededWyHash(_) => f.write_str("wyhash"),
            HashFamily::DoubleHashing(_) => f.write_str("double"),
            HashFamily::SaltedSha256(_) => f.write_str("sha256"),
        }
    }
}
