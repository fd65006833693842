//! Fixed and dynamic bitmasks over coordinate positions.
//!
//! The double description method tracks, for every ray, the set of coordinates
//! where the ray is zero. Most triangulations fit in one machine word, so the
//! enumerators are generic over [`Bitmask`] and the driver picks the narrowest
//! implementation that holds every coordinate.

use std::fmt;
use std::hash::Hash;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised when constructing a bitmask.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BitmaskError {
    /// A fixed-width mask was asked to hold more bits than it has.
    #[error("bitmask of {capacity} bits cannot hold {requested} positions")]
    TooNarrow {
        /// Number of positions requested.
        requested: usize,
        /// Number of bits available in the fixed-width type.
        capacity: usize,
    },
}

// =============================================================================
// BITMASK TRAIT
// =============================================================================

/// A set of positions `0..len`.
///
/// All binary operations assume both operands were created with the same length.
pub trait Bitmask: Clone + fmt::Debug + PartialEq + Eq + Hash + Send + Sync + 'static {
    /// Maximum number of positions, or `None` if unbounded.
    const CAPACITY: Option<usize>;

    /// Creates an empty mask able to hold `len` positions.
    ///
    /// # Errors
    ///
    /// Returns [`BitmaskError::TooNarrow`] if `len` exceeds [`Self::CAPACITY`].
    fn with_len(len: usize) -> Result<Self, BitmaskError>;

    /// Returns whether position `index` is set.
    fn get(&self, index: usize) -> bool;

    /// Sets or clears position `index`.
    fn set(&mut self, index: usize, value: bool);

    /// Set union.
    #[must_use]
    fn union(&self, other: &Self) -> Self;

    /// Set intersection.
    #[must_use]
    fn intersection(&self, other: &Self) -> Self;

    /// Positions set in `self` but not in `other`.
    #[must_use]
    fn difference(&self, other: &Self) -> Self;

    /// Complement within `0..len`.
    #[must_use]
    fn complement(&self, len: usize) -> Self;

    /// Number of set positions.
    fn count(&self) -> usize;

    /// Lowest set position.
    fn first_set(&self) -> Option<usize>;

    /// Returns `true` if every position of `self` is also set in `other`.
    fn is_subset_of(&self, other: &Self) -> bool;

    /// Returns `true` if no position is set in both masks.
    fn is_disjoint(&self, other: &Self) -> bool;

    /// Returns `true` if no position is set.
    fn is_empty(&self) -> bool;

    /// Returns `true` if at most one position is set.
    #[inline]
    fn at_most_one_bit(&self) -> bool {
        self.count() <= 1
    }

    /// Set positions below `len`, in increasing order.
    fn ones(&self, len: usize) -> Vec<usize> {
        (0..len).filter(|&i| self.get(i)).collect()
    }
}

macro_rules! impl_word_bitmask {
    ($ty:ty) => {
        impl Bitmask for $ty {
            const CAPACITY: Option<usize> = Some(<$ty>::BITS as usize);

            #[inline]
            fn with_len(len: usize) -> Result<Self, BitmaskError> {
                let capacity = <$ty>::BITS as usize;
                if len > capacity {
                    return Err(BitmaskError::TooNarrow {
                        requested: len,
                        capacity,
                    });
                }
                Ok(0)
            }

            #[inline]
            fn get(&self, index: usize) -> bool {
                (*self >> index) & 1 == 1
            }

            #[inline]
            fn set(&mut self, index: usize, value: bool) {
                if value {
                    *self |= 1 << index;
                } else {
                    *self &= !(1 << index);
                }
            }

            #[inline]
            fn union(&self, other: &Self) -> Self {
                *self | *other
            }

            #[inline]
            fn intersection(&self, other: &Self) -> Self {
                *self & *other
            }

            #[inline]
            fn difference(&self, other: &Self) -> Self {
                *self & !*other
            }

            #[inline]
            fn complement(&self, len: usize) -> Self {
                let full = if len >= <$ty>::BITS as usize {
                    <$ty>::MAX
                } else {
                    (1 << len) - 1
                };
                !*self & full
            }

            #[inline]
            fn count(&self) -> usize {
                self.count_ones() as usize
            }

            #[inline]
            fn first_set(&self) -> Option<usize> {
                (*self != 0).then(|| self.trailing_zeros() as usize)
            }

            #[inline]
            fn is_subset_of(&self, other: &Self) -> bool {
                *self & !*other == 0
            }

            #[inline]
            fn is_disjoint(&self, other: &Self) -> bool {
                *self & *other == 0
            }

            #[inline]
            fn is_empty(&self) -> bool {
                *self == 0
            }

            #[inline]
            fn at_most_one_bit(&self) -> bool {
                *self & self.wrapping_sub(1) == 0
            }
        }
    };
}

impl_word_bitmask!(u64);
impl_word_bitmask!(u128);

// =============================================================================
// DYNAMIC BITMASK
// =============================================================================

/// Heap-allocated bitmask of arbitrary length.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::bitmask::{Bitmask, DynamicBitmask};
///
/// let mut mask = DynamicBitmask::with_len(300).unwrap();
/// mask.set(3, true);
/// mask.set(257, true);
/// assert_eq!(mask.count(), 2);
/// assert_eq!(mask.first_set(), Some(3));
/// assert_eq!(mask.complement(300).count(), 298);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DynamicBitmask {
    words: Vec<u64>,
}

impl DynamicBitmask {
    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(&a, &b)| op(a, b))
            .collect();
        Self { words }
    }
}

impl Bitmask for DynamicBitmask {
    const CAPACITY: Option<usize> = None;

    fn with_len(len: usize) -> Result<Self, BitmaskError> {
        Ok(Self {
            words: vec![0; len.div_ceil(64)],
        })
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|w| (w >> (index % 64)) & 1 == 1)
    }

    #[inline]
    fn set(&mut self, index: usize, value: bool) {
        if let Some(word) = self.words.get_mut(index / 64) {
            if value {
                *word |= 1 << (index % 64);
            } else {
                *word &= !(1 << (index % 64));
            }
        }
    }

    fn union(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    fn intersection(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    fn difference(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & !b)
    }

    fn complement(&self, len: usize) -> Self {
        let mut words: Vec<u64> = self.words.iter().map(|w| !w).collect();
        for (i, word) in words.iter_mut().enumerate() {
            let start = i * 64;
            if start + 64 > len {
                let keep = len.saturating_sub(start);
                *word &= if keep == 0 { 0 } else { u64::MAX >> (64 - keep) };
            }
        }
        Self { words }
    }

    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn first_set(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    fn is_disjoint(&self, other: &Self) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & b == 0)
    }

    fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    fn at_most_one_bit(&self) -> bool {
        let mut seen = false;
        for w in &self.words {
            match w.count_ones() {
                0 => {}
                1 if !seen => seen = true,
                _ => return false,
            }
        }
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise<B: Bitmask>(len: usize) {
        let mut a = B::with_len(len).unwrap();
        let mut b = B::with_len(len).unwrap();
        assert!(a.is_empty());
        assert!(a.at_most_one_bit());
        a.set(0, true);
        a.set(len - 1, true);
        b.set(len - 1, true);
        assert!(b.is_subset_of(&a));
        assert!(!a.is_subset_of(&b));
        assert!(b.at_most_one_bit());
        assert!(!a.at_most_one_bit());
        assert_eq!(a.intersection(&b), b);
        assert_eq!(a.difference(&b).ones(len), vec![0]);
        assert_eq!(a.union(&b).count(), 2);
        assert_eq!(a.complement(len).count(), len - 2);
        assert!(a.complement(len).is_disjoint(&a));
        assert_eq!(a.first_set(), Some(0));
        a.set(0, false);
        assert_eq!(a.first_set(), Some(len - 1));
    }

    #[test]
    fn test_word_masks() {
        exercise::<u64>(7);
        exercise::<u64>(64);
        exercise::<u128>(100);
        exercise::<u128>(128);
    }

    #[test]
    fn test_dynamic_mask() {
        exercise::<DynamicBitmask>(5);
        exercise::<DynamicBitmask>(64);
        exercise::<DynamicBitmask>(130);
    }

    #[test]
    fn test_too_narrow_is_rejected() {
        assert_eq!(
            u64::with_len(65),
            Err(BitmaskError::TooNarrow {
                requested: 65,
                capacity: 64
            })
        );
        assert!(u128::with_len(129).is_err());
        assert!(DynamicBitmask::with_len(10_000).is_ok());
    }
}
