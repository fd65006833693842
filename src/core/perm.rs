//! Permutations of the vertex set `{0, ..., D}` of a `D`-simplex.
//!
//! Gluings between simplices and vertex maps of skeletal faces are both
//! expressed as [`Perm<D>`].

use crate::core::collections::MAX_PRACTICAL_DIMENSION_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Errors raised when building a permutation from raw images.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum PermError {
    /// The image list has the wrong length.
    #[error("expected {expected} images, found {found}")]
    WrongLength {
        /// Required number of images (`D + 1`).
        expected: usize,
        /// Number of images supplied.
        found: usize,
    },
    /// The images do not form a permutation of `{0..=D}`.
    #[error("images {images:?} are not a permutation of 0..={max}")]
    NotAPermutation {
        /// The offending images.
        images: Vec<usize>,
        /// Largest allowed image (`D`).
        max: usize,
    },
}

/// A permutation of `{0, ..., D}`.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::perm::Perm;
///
/// let p = Perm::<3>::from_images(&[1, 2, 0, 3]).unwrap();
/// assert_eq!(p[0], 1);
/// assert_eq!(p.inverse()[1], 0);
/// assert!(p.compose(&p.inverse()).is_identity());
/// assert_eq!(p.sign(), 1);
/// assert_eq!(p.to_string(), "1203");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Perm<const D: usize> {
    images: [usize; MAX_PRACTICAL_DIMENSION_SIZE],
}

/// Permutations of the four vertices of a tetrahedron.
pub type Perm3 = Perm<3>;

impl<const D: usize> Perm<D> {
    const SIZE_OK: () = assert!(
        D < MAX_PRACTICAL_DIMENSION_SIZE,
        "simplex dimension exceeds MAX_PRACTICAL_DIMENSION_SIZE"
    );

    /// The identity permutation.
    #[must_use]
    pub const fn identity() -> Self {
        let () = Self::SIZE_OK;
        Self {
            images: [0, 1, 2, 3, 4, 5, 6, 7],
        }
    }

    /// Builds a permutation from the images of `0, ..., D`.
    ///
    /// # Errors
    ///
    /// Returns [`PermError`] if the slice has the wrong length or is not a
    /// permutation.
    pub fn from_images(images: &[usize]) -> Result<Self, PermError> {
        if images.len() != D + 1 {
            return Err(PermError::WrongLength {
                expected: D + 1,
                found: images.len(),
            });
        }
        let mut seen = [false; MAX_PRACTICAL_DIMENSION_SIZE];
        let mut perm = Self::identity();
        for (i, &image) in images.iter().enumerate() {
            if image > D || seen[image] {
                return Err(PermError::NotAPermutation {
                    images: images.to_vec(),
                    max: D,
                });
            }
            seen[image] = true;
            perm.images[i] = image;
        }
        Ok(perm)
    }

    /// The transposition swapping `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` exceeds `D`.
    #[must_use]
    pub fn transposition(a: usize, b: usize) -> Self {
        assert!(a <= D && b <= D, "transposition outside 0..={D}");
        let mut perm = Self::identity();
        perm.images.swap(a, b);
        perm
    }

    /// The image of `i`.
    #[must_use]
    #[inline]
    pub fn image(&self, i: usize) -> usize {
        self.images[i]
    }

    /// The preimage of `i`.
    #[must_use]
    pub fn pre_image(&self, i: usize) -> usize {
        (0..=D).find(|&j| self.image(j) == i).unwrap_or(i)
    }

    /// The images of `0, ..., D` as a vector.
    #[must_use]
    pub fn images(&self) -> Vec<usize> {
        (0..=D).map(|i| self.image(i)).collect()
    }

    /// Composition `self ∘ other`, i.e. `other` is applied first.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        let mut result = Self::identity();
        for i in 0..=D {
            result.images[i] = self.images[other.images[i]];
        }
        result
    }

    /// The inverse permutation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut result = Self::identity();
        for i in 0..=D {
            result.images[self.images[i]] = i;
        }
        result
    }

    /// Sign of the permutation: `1` for even, `-1` for odd.
    #[must_use]
    pub fn sign(&self) -> i32 {
        let mut inversions = 0;
        for i in 0..=D {
            for j in (i + 1)..=D {
                if self.images[i] > self.images[j] {
                    inversions += 1;
                }
            }
        }
        if inversions % 2 == 0 { 1 } else { -1 }
    }

    /// Returns `true` for the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        (0..=D).all(|i| self.image(i) == i)
    }
}

impl<const D: usize> Default for Perm<D> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<const D: usize> Index<usize> for Perm<D> {
    type Output = usize;

    #[inline]
    fn index(&self, index: usize) -> &usize {
        &self.images[index]
    }
}

impl<const D: usize> TryFrom<Vec<usize>> for Perm<D> {
    type Error = PermError;

    fn try_from(images: Vec<usize>) -> Result<Self, Self::Error> {
        Self::from_images(&images)
    }
}

impl<const D: usize> From<Perm<D>> for Vec<usize> {
    fn from(perm: Perm<D>) -> Self {
        perm.images()
    }
}

impl<const D: usize> fmt::Display for Perm<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..=D {
            write!(f, "{}", self.images[i])?;
        }
        Ok(())
    }
}

impl<const D: usize> fmt::Debug for Perm<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Perm<{D}>({self})")
    }
}

// =============================================================================
// TESTS
// =============================================================================
