//! Dense integer vectors used for rays, solutions and normal coordinates.

use crate::core::bitmask::{Bitmask, BitmaskError};
use crate::core::integer::{IntegerBackend, IntegerOverflow};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// A dense vector of exact integers.
///
/// Rays produced by the enumerators are always primitive: their entries share
/// no common factor greater than one (see [`Ray::make_primitive`]).
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::ray::Ray;
///
/// let mut ray: Ray<i64> = Ray::from(vec![4, 0, -6]);
/// ray.make_primitive().unwrap();
/// assert_eq!(ray.as_slice(), &[2, 0, -3]);
/// assert_eq!(ray.dot(&[1, 5, 1]).unwrap(), -1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ray<I> {
    coords: Vec<I>,
}

impl<I: IntegerBackend> Ray<I> {
    /// The zero vector of length `len`.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            coords: vec![I::zero(); len],
        }
    }

    /// The unit vector `e_index` of length `len`.
    #[must_use]
    pub fn unit(len: usize, index: usize) -> Self {
        let mut ray = Self::zeros(len);
        ray.coords[index] = I::one();
        ray
    }

    /// Number of coordinates.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Returns `true` if the vector has no coordinates.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinate `index`, or `None` past the end.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> Option<&I> {
        self.coords.get(index)
    }

    /// Overwrites coordinate `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn set(&mut self, index: usize, value: I) {
        self.coords[index] = value;
    }

    /// The coordinates as a slice.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[I] {
        &self.coords
    }

    /// Iterates over the coordinates.
    pub fn iter(&self) -> std::slice::Iter<'_, I> {
        self.coords.iter()
    }

    /// Consumes the ray and returns its coordinates.
    #[must_use]
    pub fn into_vec(self) -> Vec<I> {
        self.coords
    }

    /// Returns `true` if every coordinate is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coords.iter().all(IntegerBackend::is_zero)
    }

    /// Returns `true` if no coordinate is negative.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        !self.coords.iter().any(IntegerBackend::is_negative)
    }

    /// Coordinate-wise sum.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if any sum overflows the backend.
    pub fn try_add(&self, other: &Self) -> Result<Self, IntegerOverflow> {
        let coords = self
            .coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| a.try_add(b))
            .collect::<Result<_, _>>()?;
        Ok(Self { coords })
    }

    /// Coordinate-wise difference.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if any difference overflows the backend.
    pub fn try_sub(&self, other: &Self) -> Result<Self, IntegerOverflow> {
        let coords = self
            .coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| a.try_sub(b))
            .collect::<Result<_, _>>()?;
        Ok(Self { coords })
    }

    /// Multiplies every coordinate by `factor`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if any product overflows the backend.
    pub fn scale(&mut self, factor: &I) -> Result<(), IntegerOverflow> {
        for c in &mut self.coords {
            *c = c.try_mul(factor)?;
        }
        Ok(())
    }

    /// Computes `a * r + b * s`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if any intermediate value overflows.
    pub fn combine(a: &I, r: &Self, b: &I, s: &Self) -> Result<Self, IntegerOverflow> {
        let coords = r
            .coords
            .iter()
            .zip(&s.coords)
            .map(|(x, y)| a.try_mul(x)?.try_add(&b.try_mul(y)?))
            .collect::<Result<_, _>>()?;
        Ok(Self { coords })
    }

    /// Dot product with a row of the same length.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if any intermediate value overflows.
    pub fn dot(&self, row: &[I]) -> Result<I, IntegerOverflow> {
        let mut acc = I::zero();
        for (x, y) in self.coords.iter().zip(row) {
            if x.is_zero() || y.is_zero() {
                continue;
            }
            acc = acc.try_add(&x.try_mul(y)?)?;
        }
        Ok(acc)
    }

    /// Non-negative gcd of all coordinates; zero for the zero vector.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the gcd is not representable.
    pub fn content(&self) -> Result<I, IntegerOverflow> {
        let mut g = I::zero();
        for c in &self.coords {
            if c.is_zero() {
                continue;
            }
            g = g.try_gcd(c)?;
            if g == I::one() {
                break;
            }
        }
        Ok(g)
    }

    /// Divides through by the gcd of the coordinates, preserving signs.
    ///
    /// The zero vector is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the gcd is not representable.
    pub fn make_primitive(&mut self) -> Result<(), IntegerOverflow> {
        let g = self.content()?;
        if g.is_zero() || g == I::one() {
            return Ok(());
        }
        for c in &mut self.coords {
            *c = c.try_div_exact(&g)?;
        }
        Ok(())
    }

    /// Positions of the nonzero coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`BitmaskError`] if `B` is too narrow for this ray.
    pub fn support<B: Bitmask>(&self) -> Result<B, BitmaskError> {
        let mut mask = B::with_len(self.len())?;
        for (i, c) in self.coords.iter().enumerate() {
            if !c.is_zero() {
                mask.set(i, true);
            }
        }
        Ok(mask)
    }

    /// Positions of the zero coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`BitmaskError`] if `B` is too narrow for this ray.
    pub fn zero_set<B: Bitmask>(&self) -> Result<B, BitmaskError> {
        Ok(self.support::<B>()?.complement(self.len()))
    }

    /// Converts every coordinate into another backend.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if a coordinate does not fit in `J`.
    pub fn convert<J: IntegerBackend>(&self) -> Result<Ray<J>, IntegerOverflow> {
        let coords = self
            .coords
            .iter()
            .map(|c| J::try_from_bigint(&c.to_bigint()))
            .collect::<Result<_, _>>()?;
        Ok(Ray { coords })
    }

    /// Lossless conversion to arbitrary precision.
    #[must_use]
    pub fn to_bigint(&self) -> Ray<BigInt> {
        Ray {
            coords: self.coords.iter().map(IntegerBackend::to_bigint).collect(),
        }
    }
}

impl<I> From<Vec<I>> for Ray<I> {
    fn from(coords: Vec<I>) -> Self {
        Self { coords }
    }
}

impl<I> FromIterator<I> for Ray<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            coords: iter.into_iter().collect(),
        }
    }
}

impl<I> Index<usize> for Ray<I> {
    type Output = I;

    #[inline]
    fn index(&self, index: usize) -> &I {
        &self.coords[index]
    }
}

impl<I: fmt::Display> fmt::Display for Ray<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_and_zero() {
        let e: Ray<i64> = Ray::unit(4, 2);
        assert_eq!(e.as_slice(), &[0, 0, 1, 0]);
        assert!(Ray::<i64>::zeros(3).is_zero());
        assert!(!e.is_zero());
        assert_eq!(e.to_string(), "(0, 0, 1, 0)");
    }

    #[test]
    fn test_make_primitive_preserves_sign_and_zero() {
        let mut r: Ray<i128> = Ray::from(vec![-6, 9, 0, 15]);
        r.make_primitive().unwrap();
        assert_eq!(r.as_slice(), &[-2, 3, 0, 5]);

        let mut z: Ray<i64> = Ray::zeros(5);
        z.make_primitive().unwrap();
        assert!(z.is_zero());
    }

    #[test]
    fn test_combine_and_dot() {
        let r: Ray<i64> = Ray::from(vec![1, 0, 2]);
        let s: Ray<i64> = Ray::from(vec![0, 3, 1]);
        let c = Ray::combine(&2, &r, &-1, &s).unwrap();
        assert_eq!(c.as_slice(), &[2, -3, 3]);
        assert_eq!(c.dot(&[1, 1, 1]).unwrap(), 2);
        let e: Ray<i64> = Ray::unit(3, 0);
        assert!(Ray::combine(&i64::MAX, &e, &1, &s).is_ok());
        assert!(Ray::combine(&i64::MAX, &e, &1, &e).is_err());
    }

    #[test]
    fn test_support_and_zero_set() {
        let r: Ray<i64> = Ray::from(vec![0, 3, 0, -1]);
        let support: u64 = r.support().unwrap();
        assert_eq!(support, 0b1010);
        let zeros: u64 = r.zero_set().unwrap();
        assert_eq!(zeros, 0b0101);
    }

    #[test]
    fn test_backend_conversion() {
        let r: Ray<BigInt> = Ray::from(vec![BigInt::from(1) << 70, BigInt::from(1)]);
        assert!(r.convert::<i64>().is_err());
        let wide = r.convert::<i128>().unwrap();
        assert_eq!(wide[0], 1_i128 << 70);
        assert_eq!(wide.to_bigint(), r);
    }
}
