//! Dense row-major integer matrices.

use crate::core::integer::{IntegerBackend, IntegerOverflow};
use std::fmt;

/// A dense integer matrix stored row-major.
///
/// Matching equations are built as `MatrixInt<i64>` and converted to the
/// enumeration backend with [`MatrixInt::convert`].
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::matrix::MatrixInt;
///
/// let mut m: MatrixInt<i64> = MatrixInt::zeros(2, 3);
/// m.set(0, 1, 4);
/// m.set(1, 2, -2);
/// m.swap_rows(0, 1);
/// assert_eq!(m.row(0), &[0, 0, -2]);
/// assert_eq!(m.entry(1, 1), &4);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatrixInt<I> {
    rows: usize,
    cols: usize,
    data: Vec<I>,
}

impl<I: IntegerBackend> MatrixInt<I> {
    /// A `rows × cols` matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![I::zero(); rows * cols],
        }
    }

    /// An empty matrix with no rows and `cols` columns.
    #[must_use]
    pub const fn with_cols(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Entry `(r, c)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    #[must_use]
    #[inline]
    pub fn entry(&self, r: usize, c: usize) -> &I {
        &self.data[r * self.cols + c]
    }

    /// Overwrites entry `(r, c)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: I) {
        self.data[r * self.cols + c] = value;
    }

    /// Row `r` as a slice.
    #[must_use]
    #[inline]
    pub fn row(&self, r: usize) -> &[I] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Mutable access to row `r`.
    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [I] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Iterates over the rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[I]> {
        (0..self.rows).map(|r| self.row(r))
    }

    /// Swaps two rows.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    /// Appends a row; its length must equal [`Self::cols`].
    pub fn append_row(&mut self, row: Vec<I>) {
        debug_assert_eq!(row.len(), self.cols);
        self.data.extend(row);
        self.rows += 1;
    }

    /// Removes row `r`, shifting later rows up.
    pub fn remove_row(&mut self, r: usize) {
        self.data.drain(r * self.cols..(r + 1) * self.cols);
        self.rows -= 1;
    }

    /// Replaces row `dest` by `a * row(dest) - b * row(src)`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if any entry overflows.
    pub fn comb_row(&mut self, dest: usize, a: &I, b: &I, src: usize) -> Result<(), IntegerOverflow> {
        for c in 0..self.cols {
            let value = a
                .try_mul(self.entry(dest, c))?
                .try_sub(&b.try_mul(self.entry(src, c))?)?;
            self.set(dest, c, value);
        }
        Ok(())
    }

    /// Divides row `r` by the gcd of its entries. Returns the gcd.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the gcd is not representable.
    pub fn make_row_primitive(&mut self, r: usize) -> Result<I, IntegerOverflow> {
        let mut g = I::zero();
        for x in self.row(r) {
            g = g.try_gcd(x)?;
        }
        if !g.is_zero() && g != I::one() {
            for x in self.row_mut(r) {
                *x = x.try_div_exact(&g)?;
            }
        }
        Ok(g)
    }

    /// Rank, by fraction-free elimination on a copy.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if elimination overflows the backend.
    pub fn rank(&self) -> Result<usize, IntegerOverflow> {
        let mut m = self.clone();
        let mut rank = 0;
        for c in 0..m.cols {
            if rank == m.rows {
                break;
            }
            let Some(pivot) = (rank..m.rows).find(|&r| !m.entry(r, c).is_zero()) else {
                continue;
            };
            m.swap_rows(rank, pivot);
            for r in rank + 1..m.rows {
                if m.entry(r, c).is_zero() {
                    continue;
                }
                let a = m.entry(rank, c).clone();
                let b = m.entry(r, c).clone();
                m.comb_row(r, &a, &b, rank)?;
                m.make_row_primitive(r)?;
            }
            rank += 1;
        }
        Ok(rank)
    }

    /// Returns `true` if row `r` is entirely zero.
    #[must_use]
    pub fn is_zero_row(&self, r: usize) -> bool {
        self.row(r).iter().all(IntegerBackend::is_zero)
    }

    /// Converts every entry into another backend.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if an entry does not fit in `J`.
    pub fn convert<J: IntegerBackend>(&self) -> Result<MatrixInt<J>, IntegerOverflow> {
        let data = self
            .data
            .iter()
            .map(|x| J::try_from_bigint(&x.to_bigint()))
            .collect::<Result<_, _>>()?;
        Ok(MatrixInt {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Builds a matrix from rows of equal length.
    #[must_use]
    pub fn from_rows(cols: usize, rows: Vec<Vec<I>>) -> Self {
        let mut m = Self::with_cols(cols);
        for row in rows {
            m.append_row(row);
        }
        m
    }
}

impl<I: fmt::Display> fmt::Display for MatrixInt<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let row = &self.data[r * self.cols..(r + 1) * self.cols];
            let parts: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "[{}]", parts.join(" "))?;
        }
        Ok(())
    }
}
