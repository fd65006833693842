//! Progress reporting and cooperative cancellation for long enumerations.
//!
//! Enumerators accept any [`ProgressTracker`]. They report the fraction of work
//! completed and poll [`ProgressTracker::is_cancelled`] at safe points; a
//! cancelled run stops promptly and returns what it has, without an error.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A sink for progress updates that can also request cancellation.
pub trait ProgressTracker: Send + Sync {
    /// Records the fraction of work done, in `[0, 1]`.
    fn set_progress(&self, fraction: f64);

    /// Returns `true` once the caller has asked the computation to stop.
    fn is_cancelled(&self) -> bool;
}

/// A tracker that ignores progress and never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressTracker for NoProgress {
    #[inline]
    fn set_progress(&self, _fraction: f64) {}

    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// The default thread-safe tracker, shareable between the enumerating thread
/// and an observer.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::progress::{ProgressHandle, ProgressTracker};
///
/// let handle = ProgressHandle::new();
/// handle.set_progress(0.25);
/// assert!((handle.progress() - 0.25).abs() < 1e-12);
/// assert_eq!(handle.to_string(), "25%");
///
/// handle.cancel();
/// assert!(handle.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct ProgressHandle {
    fraction_bits: AtomicU64,
    cancelled: AtomicBool,
}

impl ProgressHandle {
    /// A fresh handle at 0% and not cancelled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fraction_bits: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Asks the running computation to stop at its next polling point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// The last reported fraction.
    #[must_use]
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.fraction_bits.load(Ordering::Acquire))
    }
}

impl ProgressTracker for ProgressHandle {
    fn set_progress(&self, fraction: f64) {
        let clamped = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.fraction_bits.store(clamped.to_bits(), Ordering::Release);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Display for ProgressHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.progress() * 100.0)
    }
}

/// Fraction `done / total`, with an empty workload counting as complete.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_progress_is_clamped() {
        let handle = ProgressHandle::new();
        handle.set_progress(1.7);
        assert!((handle.progress() - 1.0).abs() < f64::EPSILON);
        handle.set_progress(f64::NAN);
        assert!(handle.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancel_is_visible_across_threads() {
        let handle = Arc::new(ProgressHandle::new());
        let observer = Arc::clone(&handle);
        thread::spawn(move || observer.cancel()).join().unwrap();
        assert!(handle.is_cancelled());
        assert!(!NoProgress.is_cancelled());
    }

    #[test]
    fn test_fraction_of_empty_work() {
        assert!((fraction(0, 0) - 1.0).abs() < f64::EPSILON);
        assert!((fraction(1, 4) - 0.25).abs() < f64::EPSILON);
    }
}
