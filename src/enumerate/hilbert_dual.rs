//! Hilbert basis enumeration by the dual algorithm of Bruns and Ichim.
//!
//! Starting from the unit vectors (the Hilbert basis of the orthant), each
//! hyperplane `h · x = 0` is handled by closing the current basis under sums of
//! one vector on each side, keeping only sums that are not reducible by a
//! vector already known. When no new vectors appear, the vectors on the
//! hyperplane form the Hilbert basis of the intersection.
//!
//! A vector `y` reduces `x` when `y ≤ x` coordinatewise and `h · y` lies
//! between `0` and `h · x` (inclusive). Inadmissible vectors are dropped as
//! soon as they appear, since adding anything to them stays inadmissible.

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
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
struct HdVector<I, B> {
    ray: Ray<I>,
    support: B,
    dot: I,
}

impl<I: IntegerBackend, B: Bitmask> HdVector<I, B> {
    fn new(ray: Ray<I>, row: &[I]) -> Result<Self, EnumerationError> {
        let support = ray.support::<B>()?;
        let dot = ray.dot(row)?;
        Ok(Self { ray, support, dot })
    }

    /// Returns `true` if `self` reduces `x`.
    fn reduces(&self, x: &Self) -> bool {
        if self.ray == x.ray || !self.support.is_subset_of(&x.support) {
            return false;
        }
        let between = match x.dot.sign() {
            Ordering::Equal => self.dot.is_zero(),
            Ordering::Greater => !self.dot.is_negative() && self.dot <= x.dot,
            Ordering::Less => !self.dot.is_positive() && self.dot >= x.dot,
        };
        between && self.ray.iter().zip(x.ray.iter()).all(|(a, b)| a <= b)
    }
}

fn reducible<I: IntegerBackend, B: Bitmask>(x: &HdVector<I, B>, lists: &[&[HdVector<I, B>]]) -> bool {
    lists.iter().any(|list| list.iter().any(|y| y.reduces(x)))
}

/// The dual Hilbert basis enumerator.
#[derive(Clone, Copy, Debug, Default)]
pub struct HilbertDual;

impl HilbertDual {
    /// Enumerates the admissible Hilbert basis of `{x ≥ 0 : matrix · x = 0}`.
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
    /// use normal_surfaces::enumerate::hilbert_dual::HilbertDual;
    /// use normal_surfaces::enumerate::validity::ValidityConstraints;
    ///
    /// // x0 + x1 = 2·x2 has three basis elements but only two extreme rays.
    /// let m = MatrixInt::from_rows(3, vec![vec![1_i64, 1, -2]]);
    /// let mut basis = Vec::new();
    /// HilbertDual::enumerate::<i64, u64, _>(&m, &ValidityConstraints::none(), &NoProgress, |v| {
    ///     basis.push(v.into_vec());
    /// })?;
    /// basis.sort();
    /// assert_eq!(basis, vec![vec![0, 2, 1], vec![1, 1, 1], vec![2, 0, 1]]);
    /// # Ok::<(), normal_surfaces::error::EnumerationError>(())
    /// ```
    pub fn enumerate<I, B, F>(
        matrix: &MatrixInt<I>,
        constraints: &ValidityConstraints,
        tracker: &dyn ProgressTracker,
        mut on_vector: F,
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
        let masks: Vec<B> = constraints.bitmasks(n)?;
        let order = pos_order(matrix, 0);

        let mut basis: Vec<Ray<I>> = (0..n).map(|i| Ray::unit(n, i)).collect();
        let total = order.len();
        for (k, &row_index) in order.iter().enumerate() {
            if tracker.is_cancelled() {
                return Ok(EnumerationOutcome::Cancelled);
            }
            match Self::intersect_hyperplane::<I, B>(basis, matrix.row(row_index), &masks, tracker)? {
                Some(next) => basis = next,
                None => return Ok(EnumerationOutcome::Cancelled),
            }
            tracing::trace!(hyperplane = k, basis = basis.len(), "hilbert dual step");
            tracker.set_progress(fraction(k + 1, total));
        }

        let count = basis.len();
        for v in basis {
            on_vector(v);
        }
        tracing::debug!(rows = total, columns = n, basis = count, "hilbert dual finished");
        Ok(EnumerationOutcome::Completed(count))
    }

    fn intersect_hyperplane<I: IntegerBackend, B: Bitmask>(
        basis: Vec<Ray<I>>,
        row: &[I],
        masks: &[B],
        tracker: &dyn ProgressTracker,
    ) -> Result<Option<Vec<Ray<I>>>, EnumerationError> {
        let mut zero: Vec<HdVector<I, B>> = Vec::new();
        let mut pos: Vec<HdVector<I, B>> = Vec::new();
        let mut neg: Vec<HdVector<I, B>> = Vec::new();
        for ray in basis {
            let v = HdVector::new(ray, row)?;
            match v.dot.sign() {
                Ordering::Equal => zero.push(v),
                Ordering::Greater => pos.push(v),
                Ordering::Less => neg.push(v),
            }
        }

        // Vectors at index >= *_new were added in the previous round.
        let mut pos_new = 0;
        let mut neg_new = 0;
        while pos_new < pos.len() || neg_new < neg.len() {
            if tracker.is_cancelled() {
                return Ok(None);
            }
            let mut candidates: BTreeSet<Ray<I>> = BTreeSet::new();
            let pairs = pos
                .iter()
                .flat_map(|p| neg[neg_new..].iter().map(move |q| (p, q)))
                .chain(
                    pos[pos_new..]
                        .iter()
                        .flat_map(|p| neg[..neg_new].iter().map(move |q| (p, q))),
                );
            for (p, q) in pairs {
                let support = p.support.union(&q.support);
                if masks
                    .iter()
                    .any(|c| !c.intersection(&support).at_most_one_bit())
                {
                    continue;
                }
                candidates.insert(p.ray.try_add(&q.ray)?);
            }

            let (mut cz, mut cp, mut cn) = (Vec::new(), Vec::new(), Vec::new());
            for ray in candidates {
                let x = HdVector::new(ray, row)?;
                if reducible(&x, &[zero.as_slice(), pos.as_slice(), neg.as_slice()]) {
                    continue;
                }
                match x.dot.sign() {
                    Ordering::Equal => cz.push(x),
                    Ordering::Greater => cp.push(x),
                    Ordering::Less => cn.push(x),
                }
            }
            let cz: Vec<_> = cz
                .iter()
                .filter(|x| !reducible(x, &[cz.as_slice()]))
                .cloned()
                .collect();
            let cp: Vec<_> = cp
                .iter()
                .filter(|x| !reducible(x, &[cz.as_slice(), cp.as_slice()]))
                .cloned()
                .collect();
            let cn: Vec<_> = cn
                .iter()
                .filter(|x| !reducible(x, &[cz.as_slice(), cn.as_slice()]))
                .cloned()
                .collect();

            pos_new = pos.len();
            neg_new = neg.len();
            zero.extend(cz);
            pos.extend(cp);
            neg.extend(cn);
        }
        Ok(Some(zero.into_iter().map(|v| v.ray).collect()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
