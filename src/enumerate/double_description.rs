//! Double description vertex enumeration.
//!
//! Computes the extreme rays of `{x ≥ 0 : Mx = 0}` that satisfy a set of
//! [`ValidityConstraints`]. The method starts from the unit vectors of the
//! non-negative orthant and intersects the cone with one hyperplane of `M` at a
//! time:
//!
//! 1. rays on the hyperplane survive unchanged;
//! 2. each adjacent pair of rays on opposite sides is combined into a new ray on
//!    the hyperplane;
//! 3. rays strictly off the hyperplane are discarded.
//!
//! Every intermediate ray carries the set of orthant facets it lies on (its zero
//! coordinates). Two rays are adjacent iff no third ray lies on all the facets
//! they share, and a pair is skipped early when the shared facet count is too
//! small for the pair to span a 2-face (`|join| < n − k − 2` after `k`
//! hyperplanes). Pairs whose combination would break a validity constraint are
//! never formed: such rays and everything derived from them are inadmissible.

use crate::core::bitmask::Bitmask;
use crate::core::integer::IntegerBackend;
use crate::core::matrix::MatrixInt;
use crate::core::progress::{ProgressTracker, fraction};
use crate::core::ray::Ray;
use crate::enumerate::outcome::EnumerationOutcome;
use crate::enumerate::pos_order::pos_order;
use crate::enumerate::validity::ValidityConstraints;
use crate::error::EnumerationError;
use std::cmp::Ordering;

/// An intermediate ray with its zero set.
#[derive(Clone, Debug)]
struct DdRay<I, B> {
    ray: Ray<I>,
    facets: B,
}

/// The double description enumerator.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoubleDescription;

impl DoubleDescription {
    /// Enumerates the admissible extreme rays of `{x ≥ 0 : matrix · x = 0}`.
    ///
    /// The first `initial_rows` rows are processed in the order given; the rest
    /// are reordered by PosOrder. Each extreme ray is passed to `on_ray` as a
    /// primitive integer vector. A matrix with zero columns emits nothing.
    ///
    /// # Errors
    ///
    /// - [`EnumerationError::ArithmeticOverflow`] if the backend overflows.
    /// - [`EnumerationError::Bitmask`] if `B` is too narrow for the columns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use normal_surfaces::core::matrix::MatrixInt;
    /// use normal_surfaces::core::progress::NoProgress;
    /// use normal_surfaces::enumerate::double_description::DoubleDescription;
    /// use normal_surfaces::enumerate::validity::ValidityConstraints;
    ///
    /// // x0 + x1 = x2 in the positive orthant: two extreme rays.
    /// let m = MatrixInt::from_rows(3, vec![vec![1_i64, 1, -1]]);
    /// let mut rays = Vec::new();
    /// DoubleDescription::enumerate::<i64, u64, _>(
    ///     &m,
    ///     &ValidityConstraints::none(),
    ///     &NoProgress,
    ///     0,
    ///     |r| rays.push(r.into_vec()),
    /// )?;
    /// rays.sort();
    /// assert_eq!(rays, vec![vec![0, 1, 1], vec![1, 0, 1]]);
    /// # Ok::<(), normal_surfaces::error::EnumerationError>(())
    /// ```
    pub fn enumerate<I, B, F>(
        matrix: &MatrixInt<I>,
        constraints: &ValidityConstraints,
        tracker: &dyn ProgressTracker,
        initial_rows: usize,
        mut on_ray: F,
    ) -> Result<EnumerationOutcome, EnumerationError>
    where
        I: IntegerBackend,
        B: Bitmask,
        F: FnMut(Ray<I>),
    {
        let n = matrix.cols();
        if n == 0 {
            return Ok(EnumerationOutcome::Completed(0));
        }
        let constraint_masks: Vec<B> = constraints.bitmasks(n)?;
        let order = pos_order(matrix, initial_rows);

        let mut rays: Vec<DdRay<I, B>> = Vec::with_capacity(n);
        for i in 0..n {
            let ray = Ray::unit(n, i);
            let facets = ray.zero_set::<B>()?;
            rays.push(DdRay { ray, facets });
        }

        let total = order.len();
        for (k, &row_index) in order.iter().enumerate() {
            if tracker.is_cancelled() {
                return Ok(EnumerationOutcome::Cancelled);
            }
            let row = matrix.row(row_index);
            match Self::intersect_hyperplane(&rays, row, k, n, &constraint_masks, tracker)? {
                Some(next) => rays = next,
                None => return Ok(EnumerationOutcome::Cancelled),
            }
            tracing::trace!(hyperplane = k, rays = rays.len(), "double description step");
            tracker.set_progress(fraction(k + 1, total));
        }

        let count = rays.len();
        for spec in rays {
            on_ray(spec.ray);
        }
        tracing::debug!(rows = total, columns = n, rays = count, "double description finished");
        Ok(EnumerationOutcome::Completed(count))
    }

    /// Intersects the current cone with the hyperplane `row · x = 0`. Returns
    /// `None` if cancelled during the pair sweep.
    fn intersect_hyperplane<I: IntegerBackend, B: Bitmask>(
        rays: &[DdRay<I, B>],
        row: &[I],
        processed: usize,
        n: usize,
        constraint_masks: &[B],
        tracker: &dyn ProgressTracker,
    ) -> Result<Option<Vec<DdRay<I, B>>>, EnumerationError> {
        let dots: Vec<I> = rays
            .iter()
            .map(|r| r.ray.dot(row))
            .collect::<Result<_, _>>()?;

        let mut next: Vec<DdRay<I, B>> = Vec::new();
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for (i, dot) in dots.iter().enumerate() {
            match dot.sign() {
                Ordering::Equal => next.push(rays[i].clone()),
                Ordering::Greater => positive.push(i),
                Ordering::Less => negative.push(i),
            }
        }
        if positive.is_empty() || negative.is_empty() {
            return Ok(Some(next));
        }

        let min_join = n.saturating_sub(processed + 2);
        for &p in &positive {
            if tracker.is_cancelled() {
                return Ok(None);
            }
            for &q in &negative {
                let join = rays[p].facets.intersection(&rays[q].facets);
                if join.count() < min_join {
                    continue;
                }
                if constraint_masks
                    .iter()
                    .any(|c| !c.difference(&join).at_most_one_bit())
                {
                    continue;
                }
                let blocked = rays
                    .iter()
                    .enumerate()
                    .any(|(i, other)| i != p && i != q && join.is_subset_of(&other.facets));
                if blocked {
                    continue;
                }
                // |h·q|·p + |h·p|·q lies on the hyperplane.
                let mut ray = Ray::combine(
                    &dots[q].try_neg()?,
                    &rays[p].ray,
                    &dots[p],
                    &rays[q].ray,
                )?;
                ray.make_primitive()?;
                next.push(DdRay { ray, facets: join });
            }
        }
        Ok(Some(next))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bitmask::DynamicBitmask;
    use crate::core::progress::{NoProgress, ProgressHandle};
    use num_bigint::BigInt;

    fn run<B: Bitmask>(m: &MatrixInt<i64>, c: &ValidityConstraints) -> Vec<Vec<i64>> {
        let mut out = Vec::new();
        DoubleDescription::enumerate::<i64, B, _>(m, c, &NoProgress, 0, |r| out.push(r.into_vec()))
            .unwrap();
        out.sort();
        out
    }

    #[test]
    fn test_no_equations_gives_unit_vectors() {
        let m: MatrixInt<i64> = MatrixInt::with_cols(3);
        assert_eq!(
            run::<u64>(&m, &ValidityConstraints::none()),
            vec![vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]
        );
    }

    #[test]
    fn test_square_pyramid_cone() {
        // x0 + x2 = x1 + x3: the cone over a square has four extreme rays.
        let m = MatrixInt::from_rows(4, vec![vec![1_i64, -1, 1, -1]]);
        let expected = vec![
            vec![0, 0, 1, 1],
            vec![0, 1, 1, 0],
            vec![1, 0, 0, 1],
            vec![1, 1, 0, 0],
        ];
        assert_eq!(run::<u64>(&m, &ValidityConstraints::none()), expected);
        assert_eq!(run::<DynamicBitmask>(&m, &ValidityConstraints::none()), expected);

        // Forbid x0 and x3 together.
        let mut c = ValidityConstraints::new(4, 1);
        c.add_local(&[0, 3]);
        assert_eq!(run::<u64>(&m, &c).len(), 3);
    }

    #[test]
    fn test_backends_agree() {
        let m = MatrixInt::from_rows(4, vec![vec![2_i64, -3, 0, 1], vec![0, 1, -1, 0]]);
        let mut small = Vec::new();
        DoubleDescription::enumerate::<i64, u64, _>(
            &m,
            &ValidityConstraints::none(),
            &NoProgress,
            0,
            |r| small.push(r.to_bigint()),
        )
        .unwrap();
        let big_matrix: MatrixInt<BigInt> = m.convert().unwrap();
        let mut big = Vec::new();
        DoubleDescription::enumerate::<BigInt, u128, _>(
            &big_matrix,
            &ValidityConstraints::none(),
            &NoProgress,
            0,
            |r| big.push(r),
        )
        .unwrap();
        assert_eq!(small, big);
    }

    #[test]
    fn test_cancellation_is_not_an_error() {
        let m = MatrixInt::from_rows(2, vec![vec![1_i64, -1]]);
        let handle = ProgressHandle::new();
        handle.cancel();
        let outcome = DoubleDescription::enumerate::<i64, u64, _>(
            &m,
            &ValidityConstraints::none(),
            &handle,
            0,
            |_| panic!("no rays expected"),
        )
        .unwrap();
        assert!(outcome.is_cancelled());
    }

    #[test]
    fn test_narrow_mask_is_rejected() {
        let m: MatrixInt<i64> = MatrixInt::with_cols(70);
        let result = DoubleDescription::enumerate::<i64, u64, _>(
            &m,
            &ValidityConstraints::none(),
            &NoProgress,
            0,
            |_| {},
        );
        assert!(matches!(result, Err(EnumerationError::Bitmask(_))));
    }
}
