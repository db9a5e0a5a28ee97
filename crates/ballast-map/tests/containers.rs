//! Integration test: hash containers under both collision-resolution
//! strategies, on the heap and on arenas.
//!
//! Every scenario runs against open addressing and separate chaining;
//! where an arena backs the map, the arena outlives it and is checked
//! for cursor sanity afterwards.

use ballast_arena::{Arena, ArenaConfig, SharedArena};
use ballast_map::{helpers, CollisionResolution, HashMap, HashSet, MapDesc, SetDesc};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const BOTH: [CollisionResolution; 2] =
    [CollisionResolution::OpenAddressing, CollisionResolution::Chaining];

fn str_map(resolution: CollisionResolution) -> HashMap<&'static str, u32> {
    HashMap::new(MapDesc::new(8, helpers::hash_str, helpers::equal).with_resolution(resolution))
        .unwrap()
}

fn int_map(resolution: CollisionResolution) -> HashMap<u64, u64> {
    HashMap::new(MapDesc::new(8, helpers::hash_pod, helpers::equal).with_resolution(resolution))
        .unwrap()
}

#[test]
fn string_keys_round_trip() {
    for resolution in BOTH {
        let mut map = str_map(resolution);
        for (key, value) in [("life", 42), ("foo", 16), ("bar", 32), ("baz", 64), ("foobar", 48)]
        {
            assert!(map.insert(key, value), "{key} should be fresh");
        }

        assert_eq!(map.get(&"life"), Some(42));
        assert_eq!(map.get(&"foo"), Some(16));
        assert_eq!(map.get(&"bar"), Some(32));
        assert_eq!(map.get(&"baz"), Some(64));
        assert_eq!(map.get(&"foobar"), Some(48));
        assert_eq!(map.len(), 5);

        assert_eq!(map.remove(&"foo"), Some(16));
        assert_eq!(map.get(&"foo"), None);
        assert_eq!(map.get(&"foobar"), Some(48));
        assert_eq!(map.len(), 4);
    }
}

#[test]
fn duplicate_insert_keeps_the_first_value() {
    for resolution in BOTH {
        let mut map = str_map(resolution);
        assert!(map.insert("life", 42));
        assert!(!map.insert("life", 8));
        assert_eq!(map.get(&"life"), Some(42));

        assert_eq!(map.set("life", 8), Some(42));
        assert_eq!(map.get(&"life"), Some(8));
    }
}

#[test]
fn mass_insert_then_remove_evens() {
    for resolution in BOTH {
        let mut map = int_map(resolution);
        for key in 0..4096u64 {
            assert!(map.insert(key, key * key));
        }
        assert_eq!(map.len(), 4096);

        for key in (0..4096u64).step_by(2) {
            assert_eq!(map.remove(&key), Some(key * key));
        }
        assert_eq!(map.len(), 2048);

        for key in 0..4096u64 {
            if key % 2 == 0 {
                assert_eq!(map.get(&key), None, "even key {key} should be gone");
            } else {
                assert_eq!(map.get(&key), Some(key * key), "odd key {key} should remain");
            }
        }
    }
}

#[test]
fn shuffled_removal_order_does_not_matter() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0ba1_1a57);
    for resolution in BOTH {
        let mut map = int_map(resolution);
        let mut keys: Vec<u64> = (0..512).collect();
        for &key in &keys {
            map.insert(key, key + 1);
        }
        keys.shuffle(&mut rng);
        for &key in keys.iter().take(256) {
            assert_eq!(map.remove(&key), Some(key + 1));
        }
        for &key in keys.iter().take(256) {
            assert_eq!(map.get(&key), None);
        }
        for &key in keys.iter().skip(256) {
            assert_eq!(map.get(&key), Some(key + 1));
        }
    }
}

#[test]
fn removed_keys_reinsert_with_new_values() {
    for resolution in BOTH {
        let mut map = int_map(resolution);
        for key in 0..100u64 {
            map.insert(key, key);
        }
        for key in 0..100u64 {
            map.remove(&key);
        }
        for key in 0..100u64 {
            assert!(map.insert(key, key + 1000));
        }
        for key in 0..100u64 {
            assert_eq!(map.get(&key), Some(key + 1000));
        }
    }
}

#[test]
fn iteration_is_complete_and_duplicate_free() {
    for resolution in BOTH {
        let mut map = int_map(resolution);
        for key in 0..1000u64 {
            map.insert(key, key * 7);
        }
        let mut seen = std::collections::HashSet::new();
        for (&key, &value) in map.iter() {
            assert_eq!(value, key * 7);
            assert!(seen.insert(key), "key {key} yielded twice");
        }
        assert_eq!(seen.len(), 1000);
    }
}

#[test]
fn open_addressing_survives_growth() {
    let mut map: HashMap<u64, u64> =
        HashMap::new(MapDesc::new(8, helpers::hash_pod, helpers::equal)).unwrap();
    let mut last_capacity = map.capacity();
    let mut grew = 0;
    for key in 0..2048u64 {
        map.insert(key, key.rotate_left(17));
        if map.capacity() != last_capacity {
            assert!(map.capacity() > last_capacity);
            last_capacity = map.capacity();
            grew += 1;
            // Everything inserted so far survived the rehash.
            for prior in 0..=key {
                assert_eq!(map.get(&prior), Some(prior.rotate_left(17)));
            }
        }
    }
    assert!(grew >= 5, "expected repeated growth, saw {grew}");
}

// ── Arena-backed maps ───────────────────────────────────────────────────

fn scratch_arena() -> SharedArena {
    let config = ArenaConfig {
        block_size: 4 * 1024 * 1024,
        tag: "map-backing".to_string(),
        ..ArenaConfig::new()
    };
    Arena::new(config).unwrap().into_shared()
}

#[test]
fn arena_backed_maps_behave_like_heap_maps() {
    let arena = scratch_arena();
    for resolution in BOTH {
        let mut map: HashMap<u64, u64, SharedArena> = HashMap::new(
            MapDesc::new(8, helpers::hash_pod, helpers::equal)
                .with_resolution(resolution)
                .with_allocator(arena.clone()),
        )
        .unwrap();
        for key in 0..500u64 {
            assert!(map.insert(key, key * 2));
        }
        for key in 0..500u64 {
            assert_eq!(map.get(&key), Some(key * 2));
        }
        assert_eq!(map.remove(&250), Some(500));
        assert_eq!(map.get(&250), None);
    }
}

#[test]
fn dropping_an_arena_backed_map_leaves_the_arena_usable() {
    let arena = scratch_arena();
    let before = arena.pos();
    {
        let mut map: HashMap<u32, u32, SharedArena> = HashMap::new(
            MapDesc::new(64, helpers::hash_pod, helpers::equal)
                .with_allocator(arena.clone()),
        )
        .unwrap();
        map.insert(1, 2);
    }
    // The map's frees are stack-discipline no-ops at worst; the arena
    // reclaims everything at once.
    arena.pop_to(before);
    assert_eq!(arena.pos(), before);
    let _later = arena.push(128);
}

// ── Set facade ──────────────────────────────────────────────────────────

#[test]
fn set_membership_protocol() {
    for resolution in BOTH {
        let mut set: HashSet<u32> = HashSet::new(
            SetDesc::new(8, helpers::hash_pod, helpers::equal).with_resolution(resolution),
        )
        .unwrap();

        assert!(set.insert(42));
        assert!(!set.insert(42));
        assert!(set.contains(&42));
        assert!(!set.contains(&8));

        assert!(set.insert(8));
        assert!(set.remove(&42));
        assert!(!set.remove(&42));
        assert!(!set.contains(&42));
        assert!(set.contains(&8));
        assert_eq!(set.len(), 1);
    }
}

#[test]
fn set_mass_membership() {
    for resolution in BOTH {
        let mut set: HashSet<u64> = HashSet::new(
            SetDesc::new(16, helpers::hash_pod, helpers::equal).with_resolution(resolution),
        )
        .unwrap();
        for value in 0..4096u64 {
            assert!(set.insert(value));
        }
        for value in (0..4096u64).step_by(2) {
            assert!(set.remove(&value));
        }
        for value in 0..4096u64 {
            assert_eq!(set.contains(&value), value % 2 == 1);
        }
        assert_eq!(set.len(), 2048);
    }
}

#[test]
fn set_on_an_arena() {
    let arena = scratch_arena();
    let mut set: HashSet<u64, SharedArena> = HashSet::new(
        SetDesc::new(8, helpers::hash_pod, helpers::equal)
            .with_resolution(CollisionResolution::Chaining)
            .with_allocator(arena),
    )
    .unwrap();
    for value in 0..100u64 {
        set.insert(value);
    }
    assert_eq!(set.len(), 100);
    assert_eq!(set.iter().count(), 100);
}
