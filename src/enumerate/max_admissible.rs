//! Maximal admissible faces of a cone, given its admissible extreme rays.

use crate::core::bitmask::Bitmask;
use crate::core::collections::FastHashSet;
use crate::core::integer::IntegerBackend;
use crate::core::ray::Ray;
use crate::enumerate::validity::ValidityConstraints;
use crate::error::EnumerationError;

/// Enumerator for maximal admissible faces.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxAdmissible;

impl MaxAdmissible {
    /// Returns the support masks of the maximal admissible faces spanned by
    /// `rays`, in order of first discovery.
    ///
    /// The ray supports are closed under admissible unions; any mask strictly
    /// contained in another is then discarded.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError::Bitmask`] if `B` cannot hold the coordinates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use normal_surfaces::core::ray::Ray;
    /// use normal_surfaces::enumerate::max_admissible::MaxAdmissible;
    /// use normal_surfaces::enumerate::validity::ValidityConstraints;
    ///
    /// let rays: Vec<Ray<i64>> = vec![
    ///     Ray::from(vec![1, 0, 1]),
    ///     Ray::from(vec![0, 1, 1]),
    ///     Ray::from(vec![0, 0, 1]),
    /// ];
    /// let mut c = ValidityConstraints::new(3, 1);
    /// c.add_local(&[0, 1]);
    /// let faces = MaxAdmissible::enumerate::<i64, u64>(&rays, &c)?;
    /// assert_eq!(faces, vec![0b101_u64, 0b110]);
    /// # Ok::<(), normal_surfaces::error::EnumerationError>(())
    /// ```
    pub fn enumerate<I: IntegerBackend, B: Bitmask>(
        rays: &[Ray<I>],
        constraints: &ValidityConstraints,
    ) -> Result<Vec<B>, EnumerationError> {
        let Some(first) = rays.first() else {
            return Ok(Vec::new());
        };
        let len = first.len();
        let masks: Vec<B> = constraints.bitmasks(len)?;
        let admissible = |b: &B| masks.iter().all(|c| c.intersection(b).at_most_one_bit());

        let mut seen: FastHashSet<B> = FastHashSet::default();
        let mut faces: Vec<B> = Vec::new();
        let mut supports: Vec<B> = Vec::with_capacity(rays.len());
        for ray in rays {
            let s = ray.support::<B>()?;
            if seen.insert(s.clone()) {
                faces.push(s.clone());
                supports.push(s);
            }
        }

        let mut frontier = faces.clone();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for face in &frontier {
                for s in &supports {
                    if s.is_subset_of(face) {
                        continue;
                    }
                    let union = face.union(s);
                    if admissible(&union) && seen.insert(union.clone()) {
                        faces.push(union.clone());
                        next.push(union);
                    }
                }
            }
            frontier = next;
        }

        let maximal: Vec<B> = faces
            .iter()
            .filter(|f| !faces.iter().any(|g| g != *f && f.is_subset_of(g)))
            .cloned()
            .collect();
        tracing::debug!(rays = rays.len(), faces = maximal.len(), "maximal admissible faces");
        Ok(maximal)
    }
}
