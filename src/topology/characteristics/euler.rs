//! Euler characteristic computation for triangulations.
//!
//! This module counts face classes of every dimension and evaluates
//! χ = Σ(-1)^k · `f_k`, where `f_k` is the number of `k`-face classes after all
//! gluings are taken into account.
//!
//! Ideal vertices are counted like any other vertex, so χ of an ideal
//! triangulation describes the pseudo-manifold rather than the cusped
//! manifold.
//!
//! # Examples
//!
//! ```rust
//! use normal_surfaces::core::census;
//! use normal_surfaces::topology::characteristics::euler;
//!
//! let counts = euler::f_vector(&census::ball());
//! assert_eq!(counts.by_dim, vec![4, 6, 4, 1]);
//! assert_eq!(euler::euler_characteristic(&counts), 1);
//! ```

use crate::core::triangulation::Triangulation;

/// Counts of `k`-faces for all dimensions `0 ≤ k ≤ D`.
///
/// In the topology literature this is commonly called the **f-vector**.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::topology::characteristics::euler::FVector;
///
/// let counts = FVector {
///     by_dim: vec![1, 2, 4, 2],
/// };
///
/// assert_eq!(counts.count(1), 2);
/// assert_eq!(counts.count(4), 0);
/// assert_eq!(counts.dimension(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FVector {
    /// `by_dim[k]` = `f_k` = number of `k`-faces
    pub by_dim: Vec<usize>,
}

impl FVector {
    /// Number of `k`-faces; 0 if `k` is out of range.
    #[must_use]
    #[inline]
    pub fn count(&self, k: usize) -> usize {
        self.by_dim.get(k).copied().unwrap_or(0)
    }

    /// The top dimension recorded.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.by_dim.len().saturating_sub(1)
    }
}

/// Coarse topological classification of a triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyClassification {
    /// No simplices (χ = 0).
    Empty,

    /// A single unglued `D`-simplex (χ = 1).
    SingleSimplex(usize),

    /// Valid, no boundary facets, no ideal vertices.
    Closed(usize),

    /// Valid with real boundary.
    WithBoundary(usize),

    /// Valid with at least one ideal vertex.
    Ideal(usize),

    /// Some face is invalid.
    Invalid,
}

/// Counts the face classes of every dimension.
#[must_use]
pub fn f_vector<const D: usize>(tri: &Triangulation<D>) -> FVector {
    let skeleton = tri.skeleton();
    FVector {
        by_dim: (0..=D).map(|k| skeleton.count_faces(k)).collect(),
    }
}

/// Alternating sum χ = Σ(-1)^k · `f_k`.
#[must_use]
#[expect(clippy::cast_possible_wrap)]
pub fn euler_characteristic(counts: &FVector) -> isize {
    counts
        .by_dim
        .iter()
        .enumerate()
        .map(|(k, &f)| if k % 2 == 0 { f as isize } else { -(f as isize) })
        .sum()
}

/// Classifies a triangulation from its skeleton.
#[must_use]
pub fn classify<const D: usize>(tri: &Triangulation<D>) -> TopologyClassification {
    if tri.is_empty() {
        return TopologyClassification::Empty;
    }
    let skeleton = tri.skeleton();
    if !skeleton.is_valid() {
        TopologyClassification::Invalid
    } else if tri.size() == 1 && tri.simplex(0).is_some_and(|s| s.glued_facet_count() == 0) {
        TopologyClassification::SingleSimplex(D)
    } else if skeleton.is_ideal() {
        TopologyClassification::Ideal(D)
    } else if skeleton.has_boundary_facets() {
        TopologyClassification::WithBoundary(D)
    } else {
        TopologyClassification::Closed(D)
    }
}

/// Expected χ for a classification, where it is determined.
///
/// Closed odd-dimensional manifolds have χ = 0; nothing is claimed for the
/// other classes beyond the trivial ones.
#[must_use]
pub const fn expected_chi_for(classification: &TopologyClassification) -> Option<isize> {
    match classification {
        TopologyClassification::Empty => Some(0),
        TopologyClassification::SingleSimplex(_) => Some(1),
        TopologyClassification::Closed(d) if *d % 2 == 1 => Some(0),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::census;
    use crate::core::triangulation::Triangulation;

    #[test]
    fn test_empty_triangulation() {
        let tri = Triangulation::<3>::new();
        let counts = f_vector(&tri);
        assert_eq!(counts.by_dim, vec![0, 0, 0, 0]);
        assert_eq!(euler_characteristic(&counts), 0);
        assert_eq!(classify(&tri), TopologyClassification::Empty);
    }

    #[test]
    fn test_closed_three_manifolds_have_zero_chi() {
        for tri in [
            census::layered_loop(1, false).unwrap(),
            census::layered_lens_space(7, 2).unwrap(),
            census::layered_loop(3, true).unwrap(),
        ] {
            let class = classify(&tri);
            assert_eq!(class, TopologyClassification::Closed(3));
            assert_eq!(euler_characteristic(&f_vector(&tri)), 0);
            assert_eq!(expected_chi_for(&class), Some(0));
        }
    }

    #[test]
    fn test_ideal_vertices_are_counted() {
        // One vertex, two edges, four triangles, two tetrahedra.
        let tri = census::figure_eight().unwrap();
        let counts = f_vector(&tri);
        assert_eq!(counts.by_dim, vec![1, 2, 4, 2]);
        assert_eq!(euler_characteristic(&counts), 1);
        assert_eq!(classify(&tri), TopologyClassification::Ideal(3));
    }

    #[test]
    fn test_two_dimensional_triangulations() {
        let mut disc = Triangulation::<2>::with_simplices(2);
        disc.join(0, 0, 1, crate::core::perm::Perm::identity()).unwrap();
        let counts = f_vector(&disc);
        assert_eq!(counts.by_dim, vec![4, 5, 2]);
        assert_eq!(euler_characteristic(&counts), 1);
        assert_eq!(classify(&disc), TopologyClassification::WithBoundary(2));
    }
}
