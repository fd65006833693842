//! Exact integer LP tableaux for tree traversal.
//!
//! The feasible region is `{x ≥ 0 : Ax = 0}` with some columns forced to zero
//! and some forced to be at least one. Forcing `x_c ≥ 1` is done by the
//! substitution `x_c = x'_c + 1`, recorded as a per-column shift. The tableau
//! is kept in basic form with every row primitive (rows and right-hand sides
//! divided by their common gcd), so entries stay as small as possible without
//! rational arithmetic.

use crate::core::integer::{IntegerBackend, IntegerOverflow};
use crate::core::matrix::MatrixInt;
use crate::core::ray::Ray;
use std::cmp::Ordering;

/// Row-reduced starting tableau shared by every node of the search tree.
///
/// Built once from the matching equations plus optional side constraints.
/// Each side constraint `Σ c_i x_i = y` adds one extra column `y`.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::matrix::MatrixInt;
/// use normal_surfaces::enumerate::tree::lp::{LpData, LpInitialTableau};
///
/// // x0 = x1 + x2
/// let m = MatrixInt::from_rows(3, vec![vec![1_i64, -1, -1]]);
/// let tableau = LpInitialTableau::new(&m, &[])?;
/// assert_eq!(tableau.rank(), 1);
///
/// let mut lp = LpData::new(&tableau);
/// lp.constrain_positive(2)?;
/// assert!(lp.is_feasible());
/// assert_eq!(lp.extract_solution()?.as_slice(), &[1, 0, 1]);
/// # Ok::<(), normal_surfaces::core::integer::IntegerOverflow>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LpInitialTableau<I> {
    rows: MatrixInt<I>,
    basis: Vec<usize>,
    coordinates: usize,
}

impl<I: IntegerBackend> LpInitialTableau<I> {
    /// Reduces `equations` (plus one row and column per side constraint) to
    /// fraction-free row echelon form with primitive rows.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if elimination overflows the backend.
    pub fn new(equations: &MatrixInt<I>, side: &[Vec<I>]) -> Result<Self, IntegerOverflow> {
        let coordinates = equations.cols();
        let cols = coordinates + side.len();
        let mut rows = MatrixInt::with_cols(cols);
        for r in 0..equations.rows() {
            if equations.is_zero_row(r) {
                continue;
            }
            let mut row = equations.row(r).to_vec();
            row.resize(cols, I::zero());
            rows.append_row(row);
        }
        for (j, coefficients) in side.iter().enumerate() {
            let mut row = coefficients.clone();
            row.resize(cols, I::zero());
            row[coordinates + j] = I::one().try_neg()?;
            rows.append_row(row);
        }

        let mut basis = Vec::new();
        let mut rank = 0;
        for c in 0..cols {
            let Some(p) = (rank..rows.rows()).find(|&r| !rows.entry(r, c).is_zero()) else {
                continue;
            };
            rows.swap_rows(rank, p);
            if rows.entry(rank, c).is_negative() {
                for x in rows.row_mut(rank) {
                    *x = x.try_neg()?;
                }
            }
            let pivot = rows.entry(rank, c).clone();
            for r in 0..rows.rows() {
                if r == rank || rows.entry(r, c).is_zero() {
                    continue;
                }
                let e = rows.entry(r, c).clone();
                rows.comb_row(r, &pivot, &e, rank)?;
                rows.make_row_primitive(r)?;
            }
            basis.push(c);
            rank += 1;
        }
        while rows.rows() > rank {
            rows.remove_row(rows.rows() - 1);
        }
        for r in 0..rank {
            rows.make_row_primitive(r)?;
        }
        Ok(Self {
            rows,
            basis,
            coordinates,
        })
    }

    /// Number of independent equations.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rows.rows()
    }

    /// Number of coordinate columns (excluding side-constraint columns).
    #[must_use]
    pub const fn coordinates(&self) -> usize {
        self.coordinates
    }

    /// Total number of columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.rows.cols()
    }
}

/// One node's LP: the tableau after some columns have been constrained.
#[derive(Clone, Debug)]
pub struct LpData<I> {
    rows: MatrixInt<I>,
    rhs: Vec<I>,
    basis: Vec<usize>,
    active: Vec<bool>,
    shift: Vec<I>,
    coordinates: usize,
    feasible: bool,
}

impl<I: IntegerBackend> LpData<I> {
    /// The unconstrained LP, whose basic solution is zero.
    #[must_use]
    pub fn new(tableau: &LpInitialTableau<I>) -> Self {
        let cols = tableau.columns();
        Self {
            rows: tableau.rows.clone(),
            rhs: vec![I::zero(); tableau.rank()],
            basis: tableau.basis.clone(),
            active: vec![true; cols],
            shift: vec![I::zero(); cols],
            coordinates: tableau.coordinates,
            feasible: true,
        }
    }

    /// Returns `false` once a constraint has made the LP infeasible.
    #[must_use]
    pub const fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Returns `true` if column `c` has not been forced to zero.
    #[must_use]
    pub fn is_active(&self, c: usize) -> bool {
        self.active.get(c).copied().unwrap_or(false)
    }

    fn row_of(&self, c: usize) -> Option<usize> {
        self.basis.iter().position(|&b| b == c)
    }

    fn is_nonbasic_active(&self, c: usize) -> bool {
        self.active[c] && !self.basis.contains(&c)
    }

    /// Forces `x_c = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if a pivot overflows the backend.
    pub fn constrain_zero(&mut self, c: usize) -> Result<(), IntegerOverflow> {
        if !self.feasible || !self.is_active(c) {
            return Ok(());
        }
        let mut repair = false;
        if let Some(r) = self.row_of(c) {
            if self.rhs[r].is_zero() {
                let candidate = (0..self.columns())
                    .rev()
                    .find(|&k| self.is_nonbasic_active(k) && !self.rows.entry(r, k).is_zero());
                if let Some(k) = candidate {
                    self.pivot(r, k)?;
                } else {
                    self.rows.remove_row(r);
                    self.rhs.remove(r);
                    self.basis.remove(r);
                }
            } else {
                let candidate = (0..self.columns())
                    .rev()
                    .find(|&k| self.is_nonbasic_active(k) && self.rows.entry(r, k).is_positive());
                let Some(k) = candidate else {
                    self.feasible = false;
                    return Ok(());
                };
                self.pivot(r, k)?;
                repair = true;
            }
        }
        self.active[c] = false;
        for r in 0..self.rows.rows() {
            self.rows.set(r, c, I::zero());
        }
        if repair {
            self.make_feasible()?;
        }
        Ok(())
    }

    /// Forces `x_c ≥ 1`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if a pivot overflows the backend.
    pub fn constrain_positive(&mut self, c: usize) -> Result<(), IntegerOverflow> {
        if !self.feasible {
            return Ok(());
        }
        if !self.is_active(c) {
            self.feasible = false;
            return Ok(());
        }
        for r in 0..self.rows.rows() {
            self.rhs[r] = self.rhs[r].try_sub(self.rows.entry(r, c))?;
        }
        self.shift[c] = self.shift[c].try_add(&I::one())?;
        self.make_feasible()
    }

    /// Dual simplex pivots until every basic variable is non-negative, or the
    /// LP is found infeasible.
    ///
    /// The most negative basic variable leaves first. If the basis ever
    /// repeats (detected with Brent's algorithm) the remaining pivots use the
    /// largest-index rule, which cannot cycle.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if a pivot overflows the backend.
    pub fn make_feasible(&mut self) -> Result<(), IntegerOverflow> {
        let mut saved = self.basis.clone();
        let mut power = 1_usize;
        let mut steps = 0_usize;
        let mut anti_cycling = false;
        loop {
            let leaving = if anti_cycling {
                self.leaving_row_by_index()
            } else {
                self.leaving_row_most_negative()?
            };
            let Some(r) = leaving else {
                return Ok(());
            };
            let entering = (0..self.columns())
                .rev()
                .find(|&k| self.is_nonbasic_active(k) && self.rows.entry(r, k).is_negative());
            let Some(k) = entering else {
                self.feasible = false;
                return Ok(());
            };
            self.pivot(r, k)?;

            if !anti_cycling {
                if self.basis == saved {
                    anti_cycling = true;
                    continue;
                }
                steps += 1;
                if steps == power {
                    saved.clone_from(&self.basis);
                    power *= 2;
                    steps = 0;
                }
            }
        }
    }

    fn leaving_row_by_index(&self) -> Option<usize> {
        (0..self.rhs.len())
            .filter(|&r| self.rhs[r].is_negative())
            .max_by_key(|&r| self.basis[r])
    }

    fn leaving_row_most_negative(&self) -> Result<Option<usize>, IntegerOverflow> {
        let mut best: Option<usize> = None;
        for r in (0..self.rhs.len()).filter(|&r| self.rhs[r].is_negative()) {
            best = Some(match best {
                None => r,
                Some(b) => {
                    // rhs_r / a_r < rhs_b / a_b with positive basic coefficients.
                    let lhs = self.rhs[r].try_mul(self.rows.entry(b, self.basis[b]))?;
                    let rhs = self.rhs[b].try_mul(self.rows.entry(r, self.basis[r]))?;
                    match lhs.cmp(&rhs) {
                        Ordering::Less => r,
                        Ordering::Equal if self.basis[r] > self.basis[b] => r,
                        _ => b,
                    }
                }
            });
        }
        Ok(best)
    }

    /// Makes column `c` basic in row `r`, keeping all rows primitive.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if a row combination overflows.
    pub fn pivot(&mut self, r: usize, c: usize) -> Result<(), IntegerOverflow> {
        if self.rows.entry(r, c).is_negative() {
            for x in self.rows.row_mut(r) {
                *x = x.try_neg()?;
            }
            self.rhs[r] = self.rhs[r].try_neg()?;
        }
        let a = self.rows.entry(r, c).clone();
        for i in 0..self.rows.rows() {
            if i == r || self.rows.entry(i, c).is_zero() {
                continue;
            }
            let e = self.rows.entry(i, c).clone();
            self.comb_row_and_norm(i, &a, &e, r)?;
        }
        self.normalise_row(r)?;
        self.basis[r] = c;
        Ok(())
    }

    /// Replaces row `dest` (with its rhs) by `a·dest − b·src`, then divides the
    /// row and rhs by their common gcd.
    fn comb_row_and_norm(&mut self, dest: usize, a: &I, b: &I, src: usize) -> Result<(), IntegerOverflow> {
        self.rows.comb_row(dest, a, b, src)?;
        self.rhs[dest] = a
            .try_mul(&self.rhs[dest])?
            .try_sub(&b.try_mul(&self.rhs[src])?)?;
        self.normalise_row(dest)
    }

    fn normalise_row(&mut self, r: usize) -> Result<(), IntegerOverflow> {
        let mut g = self.rhs[r].try_abs()?;
        for x in self.rows.row(r) {
            if g == I::one() {
                break;
            }
            g = g.try_gcd(x)?;
        }
        if g.is_zero() || g == I::one() {
            return Ok(());
        }
        for x in self.rows.row_mut(r) {
            *x = x.try_div_exact(&g)?;
        }
        self.rhs[r] = self.rhs[r].try_div_exact(&g)?;
        Ok(())
    }

    /// The current basic solution over the coordinate columns, scaled to a
    /// primitive integer vector (shifts included).
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if scaling overflows the backend.
    pub fn extract_solution(&self) -> Result<Ray<I>, IntegerOverflow> {
        let n = self.coordinates;
        let mut denominator = I::one();
        for (r, &c) in self.basis.iter().enumerate() {
            if c < n {
                let a = self.rows.entry(r, c);
                let g = denominator.try_gcd(a)?;
                denominator = denominator.try_div_exact(&g)?.try_mul(a)?;
            }
        }
        let mut coords: Vec<I> = self.shift[..n]
            .iter()
            .map(|s| s.try_mul(&denominator))
            .collect::<Result<_, _>>()?;
        for (r, &c) in self.basis.iter().enumerate() {
            if c < n {
                let scale = denominator.try_div_exact(self.rows.entry(r, c))?;
                coords[c] = coords[c].try_add(&self.rhs[r].try_mul(&scale)?)?;
            }
        }
        let mut ray = Ray::from(coords);
        ray.make_primitive()?;
        Ok(ray)
    }

    fn columns(&self) -> usize {
        self.rows.cols()
    }
}

// =============================================================================
// TESTS
// =============================================================================
