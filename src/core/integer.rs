//! Integer backends for exact enumeration arithmetic.
//!
//! Every enumerator in this crate is generic over an [`IntegerBackend`]. The
//! fixed-width backends (`i64`, `i128`) report overflow through
//! [`IntegerOverflow`] instead of wrapping; [`BigInt`] never fails.
//!
//! # Examples
//!
//! ```rust
//! use normal_surfaces::core::integer::IntegerBackend;
//!
//! let a = <i64 as IntegerBackend>::from_i64(i64::MAX);
//! assert!(a.try_add(&1).is_err());
//!
//! let g = <i64 as IntegerBackend>::from_i64(12).try_gcd(&-18).unwrap();
//! assert_eq!(g, 6);
//! ```

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// A fixed-width integer backend could not represent an intermediate result.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{backend} arithmetic overflow during {operation}")]
#[non_exhaustive]
pub struct IntegerOverflow {
    /// Name of the backend that overflowed (see [`IntegerBackend::NAME`]).
    pub backend: &'static str,
    /// The operation that failed.
    pub operation: &'static str,
}

impl IntegerOverflow {
    /// Creates an overflow report for `backend` during `operation`.
    #[must_use]
    pub const fn new(backend: &'static str, operation: &'static str) -> Self {
        Self { backend, operation }
    }
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Exact integer arithmetic used by rays, matrices and LP tableaux.
///
/// Methods are prefixed with `try_` so they never collide with the inherent
/// `checked_*` methods of the primitive types.
pub trait IntegerBackend:
    Clone + fmt::Debug + fmt::Display + PartialEq + Eq + PartialOrd + Ord + Hash + Send + Sync + 'static
{
    /// Human-readable backend name, used in overflow reports.
    const NAME: &'static str;
    /// Whether this backend can never overflow.
    const UNBOUNDED: bool;

    /// The additive identity.
    fn zero() -> Self;
    /// The multiplicative identity.
    fn one() -> Self;
    /// Converts a small integer into this backend.
    fn from_i64(value: i64) -> Self;

    /// Returns `true` if this value is zero.
    fn is_zero(&self) -> bool;
    /// Compares this value against zero.
    fn sign(&self) -> Ordering;

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the sum is not representable.
    fn try_add(&self, other: &Self) -> Result<Self, IntegerOverflow>;
    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the difference is not representable.
    fn try_sub(&self, other: &Self) -> Result<Self, IntegerOverflow>;
    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the product is not representable.
    fn try_mul(&self, other: &Self) -> Result<Self, IntegerOverflow>;
    /// Checked negation.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] for the minimum value of a fixed-width type.
    fn try_neg(&self) -> Result<Self, IntegerOverflow>;
    /// Checked absolute value.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] for the minimum value of a fixed-width type.
    fn try_abs(&self) -> Result<Self, IntegerOverflow>;
    /// Exact division. The caller guarantees that `divisor` divides `self`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if `divisor` is zero or the quotient is not
    /// representable.
    fn try_div_exact(&self, divisor: &Self) -> Result<Self, IntegerOverflow>;
    /// Non-negative greatest common divisor; `gcd(0, 0) == 0`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the result is not representable
    /// (e.g. `gcd(i64::MIN, 0)`).
    fn try_gcd(&self, other: &Self) -> Result<Self, IntegerOverflow>;

    /// Lossless conversion to an arbitrary-precision integer.
    fn to_bigint(&self) -> BigInt;
    /// Conversion from an arbitrary-precision integer.
    ///
    /// # Errors
    ///
    /// Returns [`IntegerOverflow`] if the value does not fit.
    fn try_from_bigint(value: &BigInt) -> Result<Self, IntegerOverflow>;

    /// Returns `true` if this value is strictly positive.
    #[inline]
    fn is_positive(&self) -> bool {
        self.sign() == Ordering::Greater
    }

    /// Returns `true` if this value is strictly negative.
    #[inline]
    fn is_negative(&self) -> bool {
        self.sign() == Ordering::Less
    }
}

macro_rules! impl_fixed_width_backend {
    ($ty:ty, $unsigned:ty, $name:literal) => {
        impl IntegerBackend for $ty {
            const NAME: &'static str = $name;
            const UNBOUNDED: bool = false;

            #[inline]
            fn zero() -> Self {
                0
            }

            #[inline]
            fn one() -> Self {
                1
            }

            #[inline]
            fn from_i64(value: i64) -> Self {
                <$ty>::from(value)
            }

            #[inline]
            fn is_zero(&self) -> bool {
                *self == 0
            }

            #[inline]
            fn sign(&self) -> Ordering {
                self.cmp(&0)
            }

            #[inline]
            fn try_add(&self, other: &Self) -> Result<Self, IntegerOverflow> {
                self.checked_add(*other)
                    .ok_or(IntegerOverflow::new(Self::NAME, "addition"))
            }

            #[inline]
            fn try_sub(&self, other: &Self) -> Result<Self, IntegerOverflow> {
                self.checked_sub(*other)
                    .ok_or(IntegerOverflow::new(Self::NAME, "subtraction"))
            }

            #[inline]
            fn try_mul(&self, other: &Self) -> Result<Self, IntegerOverflow> {
                self.checked_mul(*other)
                    .ok_or(IntegerOverflow::new(Self::NAME, "multiplication"))
            }

            #[inline]
            fn try_neg(&self) -> Result<Self, IntegerOverflow> {
                self.checked_neg()
                    .ok_or(IntegerOverflow::new(Self::NAME, "negation"))
            }

            #[inline]
            fn try_abs(&self) -> Result<Self, IntegerOverflow> {
                self.checked_abs()
                    .ok_or(IntegerOverflow::new(Self::NAME, "absolute value"))
            }

            #[inline]
            fn try_div_exact(&self, divisor: &Self) -> Result<Self, IntegerOverflow> {
                self.checked_div(*divisor)
                    .ok_or(IntegerOverflow::new(Self::NAME, "division"))
            }

            fn try_gcd(&self, other: &Self) -> Result<Self, IntegerOverflow> {
                let g: $unsigned = self.unsigned_abs().gcd(&other.unsigned_abs());
                <$ty>::try_from(g).map_err(|_| IntegerOverflow::new(Self::NAME, "gcd"))
            }

            #[inline]
            fn to_bigint(&self) -> BigInt {
                BigInt::from(*self)
            }

            fn try_from_bigint(value: &BigInt) -> Result<Self, IntegerOverflow> {
                <$ty>::try_from(value).map_err(|_| IntegerOverflow::new(Self::NAME, "conversion"))
            }
        }
    };
}

impl_fixed_width_backend!(i64, u64, "i64");
impl_fixed_width_backend!(i128, u128, "i128");

impl IntegerBackend for BigInt {
    const NAME: &'static str = "BigInt";
    const UNBOUNDED: bool = true;

    #[inline]
    fn zero() -> Self {
        Zero::zero()
    }

    #[inline]
    fn one() -> Self {
        One::one()
    }

    #[inline]
    fn from_i64(value: i64) -> Self {
        Self::from(value)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    #[inline]
    fn sign(&self) -> Ordering {
        if Signed::is_positive(self) {
            Ordering::Greater
        } else if Signed::is_negative(self) {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    #[inline]
    fn try_add(&self, other: &Self) -> Result<Self, IntegerOverflow> {
        Ok(self + other)
    }

    #[inline]
    fn try_sub(&self, other: &Self) -> Result<Self, IntegerOverflow> {
        Ok(self - other)
    }

    #[inline]
    fn try_mul(&self, other: &Self) -> Result<Self, IntegerOverflow> {
        Ok(self * other)
    }

    #[inline]
    fn try_neg(&self) -> Result<Self, IntegerOverflow> {
        Ok(-self)
    }

    #[inline]
    fn try_abs(&self) -> Result<Self, IntegerOverflow> {
        Ok(Signed::abs(self))
    }

    fn try_div_exact(&self, divisor: &Self) -> Result<Self, IntegerOverflow> {
        if Zero::is_zero(divisor) {
            return Err(IntegerOverflow::new(Self::NAME, "division"));
        }
        Ok(self / divisor)
    }

    #[inline]
    fn try_gcd(&self, other: &Self) -> Result<Self, IntegerOverflow> {
        Ok(Integer::gcd(self, other))
    }

    #[inline]
    fn to_bigint(&self) -> BigInt {
        self.clone()
    }

    #[inline]
    fn try_from_bigint(value: &BigInt) -> Result<Self, IntegerOverflow> {
        Ok(value.clone())
    }
}

// =============================================================================
// BACKEND SELECTION
// =============================================================================

/// Which integer backend an enumeration runs on.
///
/// The choice is fixed for the whole enumeration; a fixed-width backend that
/// overflows aborts with an error rather than retrying on a wider one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IntegerChoice {
    /// Native 64-bit arithmetic.
    Native64,
    /// Native 128-bit arithmetic.
    Wide128,
    /// Arbitrary precision via [`BigInt`].
    #[default]
    Arbitrary,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================================
    // FIXED-WIDTH BACKENDS
    // =============================================================================

    #[test]
    fn test_i64_overflow_is_reported() {
        let err = i64::MAX.try_add(&1).unwrap_err();
        assert_eq!(err, IntegerOverflow::new("i64", "addition"));
        assert!(i64::MIN.try_neg().is_err());
        assert!(i64::MIN.try_abs().is_err());
        assert!(i64::MIN.try_div_exact(&-1).is_err());
        assert!(i64::MIN.try_gcd(&0).is_err());
        assert!((i64::MAX / 2 + 1).try_mul(&2).is_err());
    }

    #[test]
    fn test_i128_basic_arithmetic() {
        let a: i128 = 1 << 100;
        assert_eq!(a.try_sub(&a).unwrap(), 0);
        assert_eq!(a.try_div_exact(&(1 << 99)).unwrap(), 2);
        assert_eq!(<i128 as IntegerBackend>::from_i64(-7).sign(), Ordering::Less);
    }

    #[test]
    fn test_gcd_is_non_negative() {
        assert_eq!((-12_i64).try_gcd(&18).unwrap(), 6);
        assert_eq!(0_i64.try_gcd(&0).unwrap(), 0);
        assert_eq!(0_i64.try_gcd(&-5).unwrap(), 5);
        let big = BigInt::from(-24);
        assert_eq!(big.try_gcd(&BigInt::from(36)).unwrap(), BigInt::from(12));
    }

    // =============================================================================
    // CONVERSIONS
    // =============================================================================

    #[test]
    fn test_bigint_conversions() {
        let huge = BigInt::from(i64::MAX) * 4;
        assert!(i64::try_from_bigint(&huge).is_err());
        assert_eq!(
            i128::try_from_bigint(&huge).unwrap(),
            i128::from(i64::MAX) * 4
        );
        assert_eq!(BigInt::try_from_bigint(&huge).unwrap(), huge);
        assert_eq!((-3_i64).to_bigint(), BigInt::from(-3));
    }

    #[test]
    fn test_backend_constants() {
        assert_eq!(<i64 as IntegerBackend>::NAME, "i64");
        assert!(!<i128 as IntegerBackend>::UNBOUNDED);
        assert!(<BigInt as IntegerBackend>::UNBOUNDED);
        assert_eq!(IntegerChoice::default(), IntegerChoice::Arbitrary);
    }
}
