//! Crate-level error taxonomy for enumeration and surface operations.
//!
//! Lower-level errors ([`IntegerOverflow`], [`TriangulationError`],
//! [`BitmaskError`]) convert into [`EnumerationError`] with `?`.
//! Cancellation is never reported as an error.

use crate::core::bitmask::BitmaskError;
use crate::core::integer::IntegerOverflow;
use crate::core::triangulation::TriangulationError;
use thiserror::Error;

/// Errors raised by the enumerators, the driver and surface operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnumerationError {
    /// The caller passed an argument the operation cannot accept.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong.
        message: String,
    },
    /// A documented precondition of the operation does not hold.
    #[error("{operation} requires {reason}")]
    FailedPrecondition {
        /// The operation attempted.
        operation: &'static str,
        /// The unmet precondition.
        reason: String,
    },
    /// A fixed-width integer backend overflowed.
    #[error(transparent)]
    ArithmeticOverflow(#[from] IntegerOverflow),
    /// An internal consistency check failed.
    #[error("internal error: {message}")]
    Internal {
        /// Diagnostic message.
        message: String,
    },
    /// The triangulation could not be built or edited.
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
    /// A bitmask was too narrow for the coordinate count.
    #[error(transparent)]
    Bitmask(#[from] BitmaskError),
}

impl EnumerationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn precondition(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::FailedPrecondition {
            operation,
            reason: reason.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_errors_convert() {
        let err: EnumerationError = IntegerOverflow::new("i64", "mul").into();
        assert!(matches!(err, EnumerationError::ArithmeticOverflow(_)));

        let err: EnumerationError = BitmaskError::TooNarrow {
            requested: 70,
            capacity: 64,
        }
        .into();
        assert!(err.to_string().contains("70"));

        let err = EnumerationError::precondition("crushing", "no octagons");
        assert_eq!(err.to_string(), "crushing requires no octagons");
    }
}
