//! Angle structures on a triangulation.
//!
//! An angle structure assigns to each pair of opposite edges of every
//! tetrahedron an angle, so that the angles in a tetrahedron sum to `π` and
//! the angles around each internal edge sum to `2π`. Structures are
//! enumerated projectively: one coordinate per angle pair plus a final
//! scaling coordinate standing for `π`, all non-negative.
//!
//! A vertex structure is *taut* if every angle is `0` or `π`, and *strict*
//! if every angle lies strictly between them.

use crate::core::bitmask::DynamicBitmask;
use crate::core::collections::FastHashSet;
use crate::core::matrix::MatrixInt;
use crate::core::progress::ProgressTracker;
use crate::core::ray::Ray;
use crate::core::triangulation::Triangulation3;
use crate::enumerate::double_description::DoubleDescription;
use crate::enumerate::validity::ValidityConstraints;
use crate::error::EnumerationError;
use crate::surfaces::tables::quad_separating;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single angle structure, stored projectively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AngleStructure {
    vector: Ray<BigInt>,
    triangulation: Arc<Triangulation3>,
}

impl AngleStructure {
    /// The raw vector: three angles per tetrahedron, then the scale.
    #[must_use]
    pub const fn vector(&self) -> &Ray<BigInt> {
        &self.vector
    }

    /// The underlying triangulation.
    #[must_use]
    pub const fn triangulation(&self) -> &Arc<Triangulation3> {
        &self.triangulation
    }

    fn scale(&self) -> &BigInt {
        &self.vector[self.vector.len() - 1]
    }

    /// The angle at edge pair `pair` (the pair containing local edges `pair`
    /// and `5 - pair`) of tetrahedron `tet`, as a reduced fraction
    /// `(numerator, denominator)` of `π`.
    #[must_use]
    pub fn angle(&self, tet: usize, pair: usize) -> (BigInt, BigInt) {
        let value = &self.vector[3 * tet + pair];
        if value.is_zero() {
            return (BigInt::zero(), BigInt::one());
        }
        let g = value.gcd(self.scale());
        (value / &g, self.scale() / &g)
    }

    /// Returns `true` if every angle lies strictly between `0` and `π`.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        let scale = self.scale();
        self.angles().all(|a| !a.is_zero() && a != scale)
    }

    /// Returns `true` if every angle is `0` or `π`.
    #[must_use]
    pub fn is_taut(&self) -> bool {
        let scale = self.scale();
        self.angles().all(|a| a.is_zero() || a == scale)
    }

    fn angles(&self) -> impl Iterator<Item = &BigInt> {
        self.vector.as_slice()[..self.vector.len() - 1].iter()
    }
}

/// Flags a persisted list records alongside its structures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AngleSummary {
    /// Only taut structures were enumerated.
    pub taut_only: bool,
    /// Every angle is positive in some vertex structure, so a strict
    /// structure exists.
    pub span_strict: bool,
    /// Some vertex structure is taut.
    pub span_taut: bool,
}

/// The vertex angle structures of a triangulation.
#[derive(Clone, Debug)]
pub struct AngleStructures {
    triangulation: Arc<Triangulation3>,
    structures: Vec<AngleStructure>,
    summary: AngleSummary,
    cancelled: bool,
}

impl AngleStructures {
    /// The angle equations: one row per tetrahedron, then one per internal
    /// edge, over `3 * size + 1` columns.
    #[must_use]
    pub fn equations(tri: &Triangulation3) -> MatrixInt<i64> {
        let n = tri.size();
        let cols = 3 * n + 1;
        let mut matrix = MatrixInt::with_cols(cols);
        for tet in 0..n {
            let mut row = vec![0_i64; cols];
            row[3 * tet..3 * tet + 3].fill(1);
            row[cols - 1] = -1;
            matrix.append_row(row);
        }
        let skeleton = tri.skeleton();
        for edge in skeleton.edges().iter().filter(|e| !e.is_boundary()) {
            let mut row = vec![0_i64; cols];
            for emb in edge.embeddings() {
                let p = emb.vertices();
                row[3 * emb.simplex() + quad_separating(p[0], p[1])] += 1;
            }
            row[cols - 1] = -2;
            matrix.append_row(row);
        }
        matrix
    }

    /// Enumerates the vertex angle structures of `tri`, or only the taut
    /// ones.
    ///
    /// # Errors
    ///
    /// [`EnumerationError::Internal`] if double description fails an
    /// invariant check.
    pub fn enumerate(
        tri: Arc<Triangulation3>,
        taut_only: bool,
        tracker: &dyn ProgressTracker,
    ) -> Result<Self, EnumerationError> {
        let n = tri.size();
        let mut list = Self {
            triangulation: Arc::clone(&tri),
            structures: Vec::new(),
            summary: AngleSummary {
                taut_only,
                ..AngleSummary::default()
            },
            cancelled: false,
        };
        if n == 0 {
            return Ok(list);
        }
        let equations: MatrixInt<BigInt> = Self::equations(&tri).convert()?;
        let mut constraints = ValidityConstraints::new(3, n);
        if taut_only {
            constraints.add_local(&[0, 1, 2]);
        }
        let mut rays = Vec::new();
        let outcome = DoubleDescription::enumerate::<BigInt, DynamicBitmask, _>(
            &equations,
            &constraints,
            tracker,
            0,
            |ray| rays.push(ray),
        )?;
        if outcome.is_cancelled() {
            list.cancelled = true;
            return Ok(list);
        }
        list.structures = rays
            .into_iter()
            .map(|vector| AngleStructure {
                vector,
                triangulation: Arc::clone(&tri),
            })
            .collect();

        let mut positive: FastHashSet<usize> = FastHashSet::default();
        for s in &list.structures {
            positive.extend((0..3 * n).filter(|&i| !s.vector[i].is_zero()));
        }
        list.summary.span_strict = !list.structures.is_empty() && positive.len() == 3 * n;
        list.summary.span_taut = list.structures.iter().any(AngleStructure::is_taut);
        tracing::debug!(
            structures = list.structures.len(),
            span_strict = list.summary.span_strict,
            span_taut = list.summary.span_taut,
            "angle structures enumerated"
        );
        Ok(list)
    }

    /// Number of vertex structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Returns `true` if there are no structures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Structures in order.
    pub fn iter(&self) -> std::slice::Iter<'_, AngleStructure> {
        self.structures.iter()
    }

    /// The structure at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AngleStructure> {
        self.structures.get(index)
    }

    /// The shared triangulation.
    #[must_use]
    pub const fn triangulation(&self) -> &Arc<Triangulation3> {
        &self.triangulation
    }

    /// The recorded flags.
    #[must_use]
    pub const fn summary(&self) -> AngleSummary {
        self.summary
    }

    /// Returns `true` if only taut structures were enumerated.
    #[must_use]
    pub const fn is_taut_only(&self) -> bool {
        self.summary.taut_only
    }

    /// Returns `true` if the structures span a strict angle structure.
    #[must_use]
    pub const fn spans_strict(&self) -> bool {
        self.summary.span_strict
    }

    /// Returns `true` if some vertex structure is taut.
    #[must_use]
    pub const fn spans_taut(&self) -> bool {
        self.summary.span_taut
    }

    /// Returns `true` if the enumeration was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::census;
    use crate::core::progress::{NoProgress, ProgressHandle};

    #[test]
    fn test_single_tetrahedron() {
        let list = AngleStructures::enumerate(Arc::new(census::ball()), false, &NoProgress).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(AngleStructure::is_taut));
        assert!(list.spans_strict());
        assert!(list.spans_taut());
        let s = list.get(0).unwrap();
        assert!(!s.is_strict());
    }

    #[test]
    fn test_figure_eight() {
        let tri = Arc::new(census::figure_eight().unwrap());
        let all = AngleStructures::enumerate(Arc::clone(&tri), false, &NoProgress).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.spans_strict());
        assert!(all.spans_taut());
        let taut = AngleStructures::enumerate(tri, true, &NoProgress).unwrap();
        assert_eq!(taut.len(), 3);
        assert!(taut.is_taut_only());
        assert!(taut.iter().all(AngleStructure::is_taut));
    }

    #[test]
    fn test_half_angles_reduce() {
        let tri = Arc::new(census::figure_eight().unwrap());
        let all = AngleStructures::enumerate(tri, false, &NoProgress).unwrap();
        let halves = all
            .iter()
            .find(|s| s.vector().iter().any(|x| *x == BigInt::from(2)))
            .unwrap();
        let fractions: Vec<(BigInt, BigInt)> = (0..2)
            .flat_map(|t| (0..3).map(move |p| (t, p)))
            .map(|(t, p)| halves.angle(t, p))
            .collect();
        assert!(fractions.contains(&(BigInt::from(1), BigInt::from(2))));
        assert!(fractions.contains(&(BigInt::from(1), BigInt::from(1))));
        assert!(!halves.is_taut());
    }

    #[test]
    fn test_closed_sphere_has_none() {
        let tri = Arc::new(census::layered_loop(1, false).unwrap());
        let list = AngleStructures::enumerate(tri, false, &NoProgress).unwrap();
        assert!(list.is_empty());
        assert!(!list.spans_strict());
        assert!(!list.spans_taut());
    }

    #[test]
    fn test_cancelled() {
        let handle = ProgressHandle::new();
        handle.cancel();
        let tri = Arc::new(census::figure_eight().unwrap());
        let list = AngleStructures::enumerate(tri, false, &handle).unwrap();
        assert!(list.is_cancelled());
        assert!(list.is_empty());
    }

    #[test]
    fn test_summary_serialises() {
        let summary = AngleSummary {
            taut_only: true,
            span_strict: false,
            span_taut: true,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"taut_only":true,"span_strict":false,"span_taut":true}"#);
    }
}
