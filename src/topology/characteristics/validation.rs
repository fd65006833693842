//! Structural validation of triangulations.
//!
//! [`validate`] checks that every stored gluing is reciprocated and that the
//! cached skeleton agrees with the gluings, then reports the Euler
//! characteristic together with the coarse classification.

use crate::core::triangulation::{Triangulation, TriangulationError};
use crate::topology::characteristics::euler::{
    FVector, TopologyClassification, classify, euler_characteristic, expected_chi_for, f_vector,
};

/// Result of validating a triangulation.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::census;
/// use normal_surfaces::topology::characteristics::validation;
///
/// let result = validation::validate(&census::layered_lens_space(5, 2)?)?;
/// assert_eq!(result.chi, 0);
/// assert!(result.is_valid());
/// # Ok::<(), normal_surfaces::core::triangulation::TriangulationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyCheckResult {
    /// Computed Euler characteristic.
    pub chi: isize,

    /// Expected χ based on classification (None if unknown).
    pub expected: Option<isize>,

    /// Topological classification.
    pub classification: TopologyClassification,

    /// Full face counts (f-vector).
    pub counts: FVector,

    /// Diagnostic notes.
    pub notes: Vec<String>,
}

impl TopologyCheckResult {
    /// Returns `true` if χ matches expectation, or nothing is expected.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.expected.is_none_or(|exp| self.chi == exp)
    }
}

/// Validates gluings and skeleton, and summarises the topology.
///
/// # Errors
///
/// - [`TriangulationError::NonReciprocalGluing`] if some gluing is not mirrored.
/// - [`TriangulationError::InconsistentSkeleton`] if a face embedding is not
///   recorded against its own face class.
pub fn validate<const D: usize>(
    tri: &Triangulation<D>,
) -> Result<TopologyCheckResult, TriangulationError> {
    for simplex in 0..tri.size() {
        for facet in 0..=D {
            if !tri.gluing_is_reciprocal(simplex, facet) {
                return Err(TriangulationError::NonReciprocalGluing { simplex, facet });
            }
        }
    }

    let skeleton = tri.skeleton();
    for k in 0..D {
        for (index, face) in skeleton.faces(k).iter().enumerate() {
            let consistent = face
                .embeddings()
                .iter()
                .all(|emb| skeleton.face_index(k, emb.simplex(), emb.face()) == Some(index));
            if !consistent {
                return Err(TriangulationError::InconsistentSkeleton {
                    dimension: k,
                    face: index,
                });
            }
        }
    }

    let counts = f_vector(tri);
    let chi = euler_characteristic(&counts);
    let classification = classify(tri);
    let expected = expected_chi_for(&classification);

    let mut notes = Vec::new();
    if !skeleton.is_connected() {
        notes.push(format!(
            "triangulation has {} components",
            skeleton.components().len()
        ));
    }
    if !skeleton.is_orientable() {
        notes.push("triangulation is non-orientable".to_owned());
    }
    if let Some(exp) = expected
        && exp != chi
    {
        notes.push(format!("expected χ = {exp}, found {chi}"));
    }

    Ok(TopologyCheckResult {
        chi,
        expected,
        classification,
        counts,
        notes,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::census;

    #[test]
    fn test_validate_census() {
        let result = validate(&census::gieseking().unwrap()).unwrap();
        assert_eq!(result.classification, TopologyClassification::Ideal(3));
        assert!(result.notes.iter().any(|n| n.contains("non-orientable")));

        let result = validate(&census::ball()).unwrap();
        assert_eq!(result.chi, 1);
        assert!(result.is_valid());
    }

    #[test]
    fn test_disconnected_is_noted() {
        let tri = Triangulation::<3>::with_simplices(2);
        let result = validate(&tri).unwrap();
        assert_eq!(result.chi, 2);
        assert_eq!(result.classification, TopologyClassification::WithBoundary(3));
        assert!(result.notes.iter().any(|n| n.contains("2 components")));
    }
}
