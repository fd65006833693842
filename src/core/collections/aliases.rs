use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for simplices.
///
/// `DenseSlotMap` is used with the default `dense-slotmap` feature and `SlotMap`
/// with `--no-default-features`. Public methods expose simplices by index and
/// never by this type.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Internal storage backend for simplices.
///
/// `DenseSlotMap` is used with the default `dense-slotmap` feature and `SlotMap`
/// with `--no-default-features`. Public methods expose simplices by index and
/// never by this type.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// `HashMap` with the non-cryptographic `FxHasher`.
///
/// # Security Warning
///
/// ⚠️ **Not DoS-resistant**: keys here are always face indices, disc
/// coordinates or masks produced by the crate itself.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<(usize, usize), usize> = FastHashMap::default();
/// map.insert((0, 3), 7);
/// assert_eq!(map.get(&(0, 3)), Some(&7));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Build hasher behind [`FastHashMap`] and [`FastHashSet`].
pub type FastBuildHasher = FxBuildHasher;

/// `HashSet` with the non-cryptographic `FxHasher`.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::collections::FastHashSet;
///
/// let mut seen: FastHashSet<Vec<u8>> = FastHashSet::default();
/// assert!(seen.insert(vec![0, 1, 3]));
/// assert!(!seen.insert(vec![0, 1, 3]));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized `Vec` that stays on the stack for up to `N` elements.
///
/// # Size Guidelines
///
/// - **N=4**: vertices or facets of a tetrahedron
/// - **N=8**: simplex data up to [`MAX_PRACTICAL_DIMENSION_SIZE`]
/// - **N=16**: disc buffers within one tetrahedron
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 4> = SmallBuffer::new();
/// buffer.extend([0, 1, 2, 3]);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC SIZE CONSTANTS AND TYPE ALIASES
// =============================================================================

/// Maximum number of vertices of a supported simplex.
///
/// Triangulations are supported in dimensions `D < MAX_PRACTICAL_DIMENSION_SIZE`,
/// which keeps permutations and facet buffers inline.
pub const MAX_PRACTICAL_DIMENSION_SIZE: usize = 8;

/// Per-simplex buffer holding one entry per facet.
pub type FacetBuffer<T> = SmallBuffer<T, MAX_PRACTICAL_DIMENSION_SIZE>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_collections_basic_operations() {
        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        assert!(map.is_empty());

        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));
        assert_eq!(map.len(), 1);

        let mut set: FastHashSet<u64> = FastHashSet::default();
        set.insert(789);
        assert!(set.contains(&789));
        assert!(!set.contains(&999));
    }

    #[test]
    fn test_facet_buffer_stays_inline() {
        let mut buffer: FacetBuffer<Option<usize>> = FacetBuffer::new();
        for _ in 0..4 {
            buffer.push(None);
        }
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.spilled());

        let mut small: SmallBuffer<i32, 2> = SmallBuffer::new();
        small.extend([1, 2, 3]);
        assert!(small.spilled());
    }
}
