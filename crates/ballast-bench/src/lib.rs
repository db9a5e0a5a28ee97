//! Benchmark profiles and utilities for the ballast allocation toolkit.
//!
//! Provides the shared workload builders the `benches/` targets run
//! against:
//!
//! - [`bench_arena`]: a large eagerly committed arena sized so no
//!   benchmark workload ever chains
//! - [`key_sequence`]: deterministic, well-spread `u64` keys for map
//!   workloads
//! - [`map_profile`]: a populated map at a given size and resolution

#![deny(rustdoc::broken_intra_doc_links)]

use ballast_arena::{Arena, ArenaConfig};
use ballast_map::{helpers, CollisionResolution, HashMap, MapDesc};

/// Arena sized for benchmark workloads: 64 MiB eager blocks.
pub fn bench_arena() -> Arena {
    let config = ArenaConfig {
        block_size: 64 * 1024 * 1024,
        tag: "bench".to_string(),
        ..ArenaConfig::new()
    };
    Arena::new(config).unwrap()
}

/// `count` deterministic keys spread over the `u64` space.
///
/// A fixed multiplicative scramble rather than a RNG so every run and
/// every machine benches the identical probe patterns.
pub fn key_sequence(count: u64, seed: u64) -> Vec<u64> {
    (0..count)
        .map(|i| {
            seed.wrapping_add(i)
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .rotate_left(23)
        })
        .collect()
}

/// A heap-backed map populated with `keys.len()` entries
/// (`value = key.wrapping_mul(3)`).
pub fn map_profile(resolution: CollisionResolution, keys: &[u64]) -> HashMap<u64, u64> {
    let mut map =
        HashMap::new(MapDesc::new(64, helpers::hash_pod, helpers::equal).with_resolution(resolution))
            .unwrap();
    for &key in keys {
        map.insert(key, key.wrapping_mul(3));
    }
    map
}
