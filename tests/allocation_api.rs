//! Allocation tracking for triangulation building and surface enumeration.
//!
//! With `--features count-allocations` every measured closure reports its
//! heap usage through `allocation-counter`; without the feature the helpers
//! fall back to running the closure and printing a notice.

#[cfg(feature = "count-allocations")]
use allocation_counter::measure;
use normal_surfaces::prelude::*;
use rand::Rng;
use std::sync::Arc;

/// Common test helpers for measuring allocations.
pub mod test_helpers {
    use super::*;

    /// Announces whether allocation counting is active.
    pub fn init_test_env() {
        println!("Initializing test environment...");
        #[cfg(feature = "count-allocations")]
        println!("✓ Allocation counting enabled");
        #[cfg(not(feature = "count-allocations"))]
        println!("⚠ Allocation counting disabled - enable with --features count-allocations");
    }

    /// Runs `f` under the allocation counter.
    ///
    /// # Panics
    ///
    /// Panics if the closure `f` does not complete successfully.
    #[cfg(feature = "count-allocations")]
    pub fn measure_with_result<F, R>(f: F) -> (R, allocation_counter::AllocationInfo)
    where
        F: FnOnce() -> R,
    {
        let mut result: Option<R> = None;
        let info = measure(|| {
            result = Some(f());
        });
        println!("Memory info: {info:?}");
        (result.expect("Closure should have set result"), info)
    }

    /// Fallback for when allocation counting is disabled.
    #[cfg(not(feature = "count-allocations"))]
    pub fn measure_with_result<F, R>(f: F) -> (R, ())
    where
        F: FnOnce() -> R,
    {
        println!("Allocation counting not available");
        (f(), ())
    }

    /// A layered loop of random length in `1..=max`.
    ///
    /// # Panics
    ///
    /// Panics if `max` is zero.
    #[must_use]
    pub fn random_layered_loop(max: usize) -> Triangulation3 {
        let mut rng = rand::rng();
        let n = rng.random_range(1..=max);
        census::layered_loop(n, rng.random_bool(0.5)).expect("layered loops exist for n >= 1")
    }

    /// Print memory allocation summary.
    #[cfg(feature = "count-allocations")]
    pub fn print_alloc_summary(info: &allocation_counter::AllocationInfo, operation: &str) {
        println!("\n=== Memory Allocation Summary for {operation} ===");
        println!("Total allocations: {}", info.count_total);
        println!("Current allocations: {}", info.count_current);
        println!("Max allocations: {}", info.count_max);
        println!("Total bytes allocated: {}", info.bytes_total);
        println!("Current bytes allocated: {}", info.bytes_current);
        println!("Max bytes allocated: {}", info.bytes_max);
        println!("=====================================\n");
    }

    /// Print memory allocation summary (fallback for when allocation counting is disabled).
    #[cfg(not(feature = "count-allocations"))]
    pub fn print_alloc_summary(_info: &(), operation: &str) {
        println!("\n=== Memory Allocation Summary for {operation} ===");
        println!("Allocation counting not enabled");
        println!("=====================================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn test_triangulation_building_allocations() {
        init_test_env();

        let (tri, info) = measure_with_result(|| random_layered_loop(6));

        assert!(tri.size() >= 1);
        print_alloc_summary(&info, "layered loop construction");
    }

    #[test]
    fn test_skeleton_allocations() {
        init_test_env();
        let tri = census::layered_lens_space(8, 3).unwrap();

        let (edges, info) = measure_with_result(|| tri.skeleton().edges().len());

        assert!(edges > 0);
        print_alloc_summary(&info, "skeleton computation");
    }

    #[test]
    fn test_enumeration_allocations() {
        init_test_env();
        let tri = Arc::new(census::layered_loop(3, true).unwrap());

        let (list, info) = measure_with_result(|| {
            NormalSurfaces::enumerate_with(
                Arc::clone(&tri),
                NormalCoords::Standard,
                NormalList::default(),
                NormalAlg::empty(),
            )
            .unwrap()
        });

        assert_eq!(list.len(), 5);
        print_alloc_summary(&info, "standard vertex enumeration");
    }

    #[test]
    fn test_fixed_width_backend_allocations() {
        init_test_env();
        let tri = Arc::new(census::layered_loop(3, true).unwrap());
        let options = EnumerationOptionsBuilder::default()
            .coords(NormalCoords::Quad)
            .integer(IntegerChoice::Native64)
            .build()
            .unwrap();

        let (list, info) = measure_with_result(|| NormalSurfaces::enumerate(Arc::clone(&tri), &options, &NoProgress).unwrap());

        assert_eq!(list.len(), 4);
        print_alloc_summary(&info, "quad enumeration with i64");
    }
}
