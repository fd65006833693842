//! Combinatorial admissibility constraints.
//!
//! Coordinates are grouped into `n_blocks` consecutive blocks of `block_size`
//! (one block per tetrahedron). A constraint is a set of coordinate positions
//! of which at most one may be nonzero:
//!
//! - a **local** set is given by offsets within a block and is repeated once
//!   per block (the quadrilateral constraints);
//! - a **global** set is given by offsets within a block and spans all blocks
//!   at once (at most one octagon type overall).

use crate::core::bitmask::{Bitmask, BitmaskError};
use crate::core::integer::IntegerBackend;
use crate::core::ray::Ray;

/// A list of "at most one nonzero" coordinate sets.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::ray::Ray;
/// use normal_surfaces::enumerate::validity::ValidityConstraints;
///
/// // Two tetrahedra in quad coordinates.
/// let mut constraints = ValidityConstraints::new(3, 2);
/// constraints.add_local(&[0, 1, 2]);
///
/// assert!(constraints.is_admissible(&Ray::from(vec![1_i64, 0, 0, 0, 2, 0])));
/// assert!(!constraints.is_admissible(&Ray::from(vec![1_i64, 1, 0, 0, 0, 0])));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidityConstraints {
    block_size: usize,
    n_blocks: usize,
    local: Vec<Vec<usize>>,
    global: Vec<Vec<usize>>,
}

impl ValidityConstraints {
    /// No constraints yet, over `n_blocks` blocks of `block_size` coordinates.
    #[must_use]
    pub const fn new(block_size: usize, n_blocks: usize) -> Self {
        Self {
            block_size,
            n_blocks,
            local: Vec::new(),
            global: Vec::new(),
        }
    }

    /// The empty constraint list; every vector is admissible.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Coordinates per block.
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks.
    #[must_use]
    pub const fn n_blocks(&self) -> usize {
        self.n_blocks
    }

    /// Adds a set of block offsets repeated in every block.
    pub fn add_local(&mut self, offsets: &[usize]) {
        self.local.push(offsets.to_vec());
    }

    /// Adds a set of block offsets taken across all blocks together.
    pub fn add_global(&mut self, offsets: &[usize]) {
        self.global.push(offsets.to_vec());
    }

    /// Returns `true` if no constraint has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.global.is_empty()
    }

    /// Every constraint expanded into absolute coordinate positions: the
    /// local sets block by block, then the global sets.
    #[must_use]
    pub fn sets(&self) -> Vec<Vec<usize>> {
        let mut sets = Vec::with_capacity(self.local.len() * self.n_blocks + self.global.len());
        for block in 0..self.n_blocks {
            let base = block * self.block_size;
            for set in &self.local {
                sets.push(set.iter().map(|&o| base + o).collect());
            }
        }
        for set in &self.global {
            sets.push(
                (0..self.n_blocks)
                    .flat_map(|block| set.iter().map(move |&o| block * self.block_size + o))
                    .collect(),
            );
        }
        sets
    }

    /// The constraints as bitmasks over `len` coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`BitmaskError`] if `B` cannot hold `len` bits.
    pub fn bitmasks<B: Bitmask>(&self, len: usize) -> Result<Vec<B>, BitmaskError> {
        self.sets()
            .into_iter()
            .map(|set| {
                let mut mask = B::with_len(len)?;
                for i in set.into_iter().filter(|&i| i < len) {
                    mask.set(i, true);
                }
                Ok(mask)
            })
            .collect()
    }

    /// Returns `true` if the ray is nonzero in at most one position of every
    /// set.
    #[must_use]
    pub fn is_admissible<I: IntegerBackend>(&self, ray: &Ray<I>) -> bool {
        self.sets().iter().all(|set| {
            set.iter()
                .filter(|&&i| ray.get(i).is_some_and(|c| !c.is_zero()))
                .count()
                <= 1
        })
    }

    /// Returns `true` if the support mask meets every set in at most one bit.
    #[must_use]
    pub fn is_admissible_mask<B: Bitmask>(&self, support: &B) -> bool {
        self.sets()
            .iter()
            .all(|set| set.iter().filter(|&&i| support.get(i)).count() <= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_and_global_sets_expand() {
        let mut c = ValidityConstraints::new(6, 2);
        c.add_local(&[0, 1, 2, 3, 4, 5]);
        c.add_global(&[3, 4, 5]);
        let sets = c.sets();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[1], vec![6, 7, 8, 9, 10, 11]);
        assert_eq!(sets[2], vec![3, 4, 5, 9, 10, 11]);

        // An octagon in each tetrahedron violates only the global set.
        let ray = Ray::from(vec![0_i64, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0]);
        assert!(!c.is_admissible(&ray));
        let mask: u64 = ray.support().unwrap();
        assert!(!c.is_admissible_mask(&mask));
    }

    #[test]
    fn test_bitmasks_match_sets() {
        let mut c = ValidityConstraints::new(3, 2);
        c.add_local(&[0, 2]);
        let masks: Vec<u64> = c.bitmasks(6).unwrap();
        assert_eq!(masks, vec![0b101, 0b101_000]);
        assert!(ValidityConstraints::none().is_empty());
        assert!(ValidityConstraints::none().is_admissible(&Ray::from(vec![1_i64, 1])));
    }
}
