//! How an enumeration run ended.

/// Result of a run that may be cancelled through its progress tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnumerationOutcome {
    /// Ran to completion, emitting this many solutions.
    Completed(usize),
    /// Stopped early at the tracker's request.
    Cancelled,
}

impl EnumerationOutcome {
    /// Returns `true` for [`EnumerationOutcome::Cancelled`].
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Number of solutions emitted, if the run completed.
    #[must_use]
    pub const fn count(self) -> Option<usize> {
        match self {
            Self::Completed(n) => Some(n),
            Self::Cancelled => None,
        }
    }
}
