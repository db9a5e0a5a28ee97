//! FNV-1a hashing.
//!
//! The hash containers take their hash function as a plain `fn` slot in the
//! descriptor; [`fnv1a`] is the primitive the built-in key helpers feed
//! bytes through. The 32-bit FNV parameters run in a 64-bit accumulator
//! without truncation, so results are deterministic across platforms and
//! runs (no per-process seeding).

/// FNV-1a offset basis.
const FNV_OFFSET_BASIS: u64 = 2_166_136_261;

/// FNV-1a prime.
const FNV_PRIME: u64 = 16_777_619;

/// Hash `data` with FNV-1a: XOR each byte into the accumulator, then
/// multiply by the prime.
#[must_use]
pub fn fnv1a(data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
