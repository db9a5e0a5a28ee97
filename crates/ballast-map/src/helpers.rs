//! Built-in hash and equality functions for descriptor slots.
//!
//! These match the shape the descriptors expect (`fn(&K) -> u64` and
//! `fn(&K, &K) -> bool`) so common key types need no hand-written
//! functions. All hashers are FNV-1a over the key's bytes; see
//! [`fnv1a`].

use ballast_core::fnv1a;

/// Hash a string key over its UTF-8 bytes.
pub fn hash_str(key: &&str) -> u64 {
    fnv1a(key.as_bytes())
}

/// Hash a byte-slice key.
pub fn hash_bytes(key: &&[u8]) -> u64 {
    fnv1a(key)
}

/// Hash a plain-copy key over its in-memory representation.
///
/// Only suitable for types without padding bytes: padding has
/// unspecified content, so two equal values of a padded type can hash
/// differently. Use a field-wise hash function for such keys.
pub fn hash_pod<K: Copy>(key: &K) -> u64 {
    // SAFETY: `K: Copy` data is readable as bytes for its full size;
    // the padding caveat is documented above.
    let bytes = unsafe {
        std::slice::from_raw_parts((key as *const K).cast::<u8>(), std::mem::size_of::<K>())
    };
    fnv1a(bytes)
}

/// Equality slot filler for any comparable key.
pub fn equal<K: PartialEq>(a: &K, b: &K) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_str_matches_the_primitive_over_bytes() {
        assert_eq!(hash_str(&"life"), fnv1a(b"life"));
        assert_eq!(hash_bytes(&b"life".as_slice()), fnv1a(b"life"));
    }

    #[test]
    fn hash_pod_distinguishes_values() {
        assert_ne!(hash_pod(&1u64), hash_pod(&2u64));
        assert_eq!(hash_pod(&7u32), hash_pod(&7u32));
    }

    #[test]
    fn hash_pod_sees_the_full_width() {
        // Same low bytes, different high bytes.
        assert_ne!(hash_pod(&0x0000_0001u64), hash_pod(&0x0100_0000_0000_0001u64));
    }

    #[test]
    fn equal_forwards_to_partial_eq() {
        assert!(equal(&"a", &"a"));
        assert!(!equal(&1, &2));
    }
}
