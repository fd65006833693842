//! Depth-first tree traversal over type vectors.
//!
//! Each tetrahedron contributes one *quad position* whose value says which quad
//! (`1..=3`) or octagon (`4..=6`) type is present, with `0` for none. In
//! standard-type coordinates every triangle coordinate adds a further `0/1`
//! position. A node of the search tree fixes a prefix of the type vector and
//! carries an [`LpData`] whose feasibility decides whether the subtree can hold
//! any solution. Leaves whose type vector is non-zero and not dominated by an
//! earlier leaf are exactly the admissible vertex solutions.

use crate::core::integer::IntegerBackend;
use crate::core::matrix::MatrixInt;
use crate::core::progress::{ProgressTracker, fraction};
use crate::core::ray::Ray;
use crate::enumerate::outcome::EnumerationOutcome;
use crate::enumerate::tree::lp::{LpData, LpInitialTableau};
use crate::enumerate::tree::type_trie::TypeTrie;
use crate::error::EnumerationError;
use serde::{Deserialize, Serialize};

/// Where the quad, octagon and triangle coordinates sit inside each
/// tetrahedron's block of a coordinate vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeLayout {
    /// Number of tetrahedra.
    pub tetrahedra: usize,
    /// Coordinates per tetrahedron.
    pub block: usize,
    /// Offset of the three quad coordinates within a block.
    pub quad_offset: usize,
    /// Offset of the three octagon coordinates, if octagons are allowed.
    pub oct_offset: Option<usize>,
    /// Offset of the four triangle coordinates, if triangles are present.
    pub triangle_offset: Option<usize>,
}

impl TreeLayout {
    /// Length of the coordinate vectors this layout describes.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.tetrahedra * self.block
    }

    /// Length of the type vectors.
    #[must_use]
    pub const fn positions(&self) -> usize {
        if self.triangle_offset.is_some() {
            5 * self.tetrahedra
        } else {
            self.tetrahedra
        }
    }

    fn quad_column(&self, tet: usize, q: usize) -> usize {
        tet * self.block + self.quad_offset + q
    }

    /// Largest value a position may take given whether an octagon is in use.
    fn max_value(&self, position: usize, oct_used: bool) -> u8 {
        if position >= self.tetrahedra {
            1
        } else if self.oct_offset.is_some() && !oct_used {
            6
        } else {
            3
        }
    }

    /// Applies the constraints implied by setting `position` to `value`.
    fn constrain<I: IntegerBackend>(
        &self,
        lp: &mut LpData<I>,
        position: usize,
        value: u8,
    ) -> Result<(), EnumerationError> {
        if position >= self.tetrahedra {
            let p = position - self.tetrahedra;
            let Some(offset) = self.triangle_offset else {
                return Err(EnumerationError::internal("triangle position without triangle coordinates"));
            };
            let col = (p / 4) * self.block + offset + p % 4;
            if value == 0 {
                lp.constrain_zero(col)?;
            } else {
                lp.constrain_positive(col)?;
            }
            return Ok(());
        }

        let tet = position;
        let chosen = usize::from(value);
        for q in 0..3 {
            if chosen != q + 1 {
                lp.constrain_zero(self.quad_column(tet, q))?;
            }
        }
        if let Some(offset) = self.oct_offset {
            for o in 0..3 {
                if chosen != o + 4 {
                    lp.constrain_zero(tet * self.block + offset + o)?;
                }
            }
        }
        match chosen {
            1..=3 => lp.constrain_positive(self.quad_column(tet, chosen - 1))?,
            4..=6 => match self.oct_offset {
                Some(offset) => lp.constrain_positive(tet * self.block + offset + chosen - 4)?,
                None => return Err(EnumerationError::internal("octagon type without octagon coordinates")),
            },
            _ => {}
        }
        Ok(())
    }
}

/// Whether a side constraint's value must vanish or be at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SideKind {
    /// `Σ c_i x_i = 0`.
    Zero,
    /// `Σ c_i x_i ≥ 1`.
    Positive,
}

/// A linear side constraint on the coordinate vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideConstraint<I> {
    /// One coefficient per coordinate.
    pub coefficients: Vec<I>,
    /// How the linear form is constrained.
    pub kind: SideKind,
}

/// Extra conditions imposed on every tree traversal solution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TreeConstraint {
    /// No side constraint.
    #[default]
    None,
    /// Euler characteristic at least one.
    EulerPositive,
    /// Euler characteristic zero.
    EulerZero,
    /// Each row's linear form vanishes (e.g. zero slope on every cusp).
    NonSpun {
        /// One coefficient row per cusp condition.
        rows: Vec<Vec<i64>>,
    },
}

impl TreeConstraint {
    /// Converts this constraint into side constraints over `dimension`
    /// coordinates. The Euler variants need the Euler characteristic as a
    /// linear form, available only in standard-type coordinates.
    ///
    /// # Errors
    ///
    /// [`EnumerationError::InvalidArgument`] if an Euler constraint is asked
    /// for without a linear form, or a row has the wrong length.
    pub fn side_constraints<I: IntegerBackend>(
        &self,
        dimension: usize,
        euler: Option<&[i64]>,
    ) -> Result<Vec<SideConstraint<I>>, EnumerationError> {
        let convert = |row: &[i64], kind| -> Result<SideConstraint<I>, EnumerationError> {
            if row.len() != dimension {
                return Err(EnumerationError::invalid(format!(
                    "side constraint has {} coefficients, expected {dimension}",
                    row.len()
                )));
            }
            Ok(SideConstraint {
                coefficients: row.iter().map(|&c| I::from_i64(c)).collect(),
                kind,
            })
        };
        let euler_row = || {
            euler.ok_or_else(|| {
                EnumerationError::invalid("Euler characteristic constraints need standard-type coordinates")
            })
        };
        match self {
            Self::None => Ok(Vec::new()),
            Self::EulerPositive => Ok(vec![convert(euler_row()?, SideKind::Positive)?]),
            Self::EulerZero => Ok(vec![convert(euler_row()?, SideKind::Zero)?]),
            Self::NonSpun { rows } => rows.iter().map(|r| convert(r, SideKind::Zero)).collect(),
        }
    }
}

/// Builds the root LP: the initial tableau with side constraints applied.
fn root_lp<I: IntegerBackend>(
    equations: &MatrixInt<I>,
    layout: &TreeLayout,
    side: &[SideConstraint<I>],
) -> Result<LpData<I>, EnumerationError> {
    if equations.cols() != layout.dimension() {
        return Err(EnumerationError::invalid(format!(
            "layout describes {} coordinates but the equations have {}",
            layout.dimension(),
            equations.cols()
        )));
    }
    if let Some(bad) = side.iter().find(|s| s.coefficients.len() != layout.dimension()) {
        return Err(EnumerationError::invalid(format!(
            "side constraint has {} coefficients, expected {}",
            bad.coefficients.len(),
            layout.dimension()
        )));
    }
    let rows: Vec<Vec<I>> = side.iter().map(|s| s.coefficients.clone()).collect();
    let tableau = LpInitialTableau::new(equations, &rows)?;
    let mut lp = LpData::new(&tableau);
    for (j, s) in side.iter().enumerate() {
        let col = layout.dimension() + j;
        match s.kind {
            SideKind::Zero => lp.constrain_zero(col)?,
            SideKind::Positive => lp.constrain_positive(col)?,
        }
    }
    Ok(lp)
}

/// Vertex enumeration by tree traversal.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::matrix::MatrixInt;
/// use normal_surfaces::core::progress::NoProgress;
/// use normal_surfaces::enumerate::tree::traversal::{TreeEnumeration, TreeLayout};
///
/// // One tetrahedron in quad coordinates: one solution per quad type.
/// let layout = TreeLayout {
///     tetrahedra: 1,
///     block: 3,
///     quad_offset: 0,
///     oct_offset: None,
///     triangle_offset: None,
/// };
/// let equations: MatrixInt<i64> = MatrixInt::with_cols(3);
/// let search = TreeEnumeration::new(&equations, layout, &[])?;
/// let mut found = Vec::new();
/// let outcome = search.run(&NoProgress, |ray| found.push(ray.into_vec()))?;
/// assert_eq!(outcome.count(), Some(3));
/// assert_eq!(found[0], vec![1, 0, 0]);
/// # Ok::<(), normal_surfaces::error::EnumerationError>(())
/// ```
#[derive(Clone, Debug)]
pub struct TreeEnumeration<I> {
    layout: TreeLayout,
    root: Option<LpData<I>>,
}

impl<I: IntegerBackend> TreeEnumeration<I> {
    /// Prepares a traversal over `equations` with the given type layout and
    /// side constraints.
    ///
    /// # Errors
    ///
    /// - [`EnumerationError::InvalidArgument`] if the layout or a side
    ///   constraint does not match the equation columns.
    /// - [`EnumerationError::ArithmeticOverflow`] if row reduction overflows.
    pub fn new(
        equations: &MatrixInt<I>,
        layout: TreeLayout,
        side: &[SideConstraint<I>],
    ) -> Result<Self, EnumerationError> {
        let lp = root_lp(equations, &layout, side)?;
        Ok(Self {
            layout,
            root: lp.is_feasible().then_some(lp),
        })
    }

    /// Runs the traversal, passing each vertex solution to `on_ray` as a
    /// primitive vector.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError::ArithmeticOverflow`] if a pivot overflows.
    pub fn run<F: FnMut(Ray<I>)>(
        &self,
        tracker: &dyn ProgressTracker,
        on_ray: F,
    ) -> Result<EnumerationOutcome, EnumerationError> {
        let Some(root) = &self.root else {
            return Ok(EnumerationOutcome::Completed(0));
        };
        if self.layout.tetrahedra == 0 {
            return Ok(EnumerationOutcome::Completed(0));
        }
        let mut search = Search {
            layout: &self.layout,
            tracker,
            types: vec![0; self.layout.positions()],
            trie: TypeTrie::new(),
            on_ray,
            found: 0,
        };
        let finished = search.descend(root, 0, false)?;
        tracing::debug!(
            tetrahedra = self.layout.tetrahedra,
            positions = self.layout.positions(),
            solutions = search.found,
            trie_nodes = search.trie.node_count(),
            "tree traversal finished"
        );
        if finished {
            Ok(EnumerationOutcome::Completed(search.found))
        } else {
            Ok(EnumerationOutcome::Cancelled)
        }
    }
}

struct Search<'a, F> {
    layout: &'a TreeLayout,
    tracker: &'a dyn ProgressTracker,
    types: Vec<u8>,
    trie: TypeTrie<7>,
    on_ray: F,
    found: usize,
}

impl<F> Search<'_, F> {
    /// Returns `Ok(false)` if cancelled.
    fn descend<I: IntegerBackend>(
        &mut self,
        lp: &LpData<I>,
        position: usize,
        oct_used: bool,
    ) -> Result<bool, EnumerationError>
    where
        F: FnMut(Ray<I>),
    {
        if position == self.types.len() {
            self.leaf(lp)?;
            return Ok(true);
        }
        let max = self.layout.max_value(position, oct_used);
        for value in 0..=max {
            if self.tracker.is_cancelled() {
                return Ok(false);
            }
            let mut child = lp.clone();
            self.layout.constrain(&mut child, position, value)?;
            if child.is_feasible() {
                self.types[position] = value;
                let octagon = position < self.layout.tetrahedra && value >= 4;
                let more = self.descend(&child, position + 1, oct_used || octagon)?;
                self.types[position] = 0;
                if !more {
                    return Ok(false);
                }
            }
            if position == 0 {
                self.tracker
                    .set_progress(fraction(usize::from(value) + 1, usize::from(max) + 1));
            }
        }
        Ok(true)
    }

    fn leaf<I: IntegerBackend>(&mut self, lp: &LpData<I>) -> Result<(), EnumerationError>
    where
        F: FnMut(Ray<I>),
    {
        if self.types.iter().all(|&t| t == 0) || self.trie.dominates(&self.types) {
            return Ok(());
        }
        let ray = lp.extract_solution()?;
        self.trie.insert(&self.types);
        self.found += 1;
        (self.on_ray)(ray);
        Ok(())
    }
}

/// Search for a single non-trivial admissible solution.
///
/// Only quad and octagon positions are branched on; a solution is non-trivial
/// when some quad or octagon coordinate is non-zero. Triangle coordinates are
/// left free, so vertex links alone never qualify.
#[derive(Clone, Debug)]
pub struct TreeSingleSolution<I> {
    layout: TreeLayout,
    root: Option<LpData<I>>,
}

impl<I: IntegerBackend> TreeSingleSolution<I> {
    /// Prepares a search over `equations` with the given side constraints.
    ///
    /// # Errors
    ///
    /// As for [`TreeEnumeration::new`].
    pub fn new(
        equations: &MatrixInt<I>,
        layout: TreeLayout,
        side: &[SideConstraint<I>],
    ) -> Result<Self, EnumerationError> {
        let lp = root_lp(equations, &layout, side)?;
        Ok(Self {
            layout,
            root: lp.is_feasible().then_some(lp),
        })
    }

    /// Returns the first solution found, or `None` if there is none or the
    /// tracker cancelled the search.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError::ArithmeticOverflow`] if a pivot overflows.
    pub fn find(&self, tracker: &dyn ProgressTracker) -> Result<Option<Ray<I>>, EnumerationError> {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        let mut types = vec![0_u8; self.layout.tetrahedra];
        let found = self.descend(root, 0, false, &mut types, tracker)?;
        tracing::debug!(
            tetrahedra = self.layout.tetrahedra,
            found = found.is_some(),
            "single solution search finished"
        );
        Ok(found)
    }

    fn descend(
        &self,
        lp: &LpData<I>,
        position: usize,
        oct_used: bool,
        types: &mut [u8],
        tracker: &dyn ProgressTracker,
    ) -> Result<Option<Ray<I>>, EnumerationError> {
        if position == types.len() {
            if types.iter().all(|&t| t == 0) {
                return Ok(None);
            }
            return Ok(Some(lp.extract_solution()?));
        }
        let max = self.layout.max_value(position, oct_used);
        for value in 0..=max {
            if tracker.is_cancelled() {
                return Ok(None);
            }
            let mut child = lp.clone();
            self.layout.constrain(&mut child, position, value)?;
            if !child.is_feasible() {
                continue;
            }
            types[position] = value;
            let found = self.descend(&child, position + 1, oct_used || value >= 4, types, tracker)?;
            types[position] = 0;
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::{NoProgress, ProgressHandle};

    const STANDARD: TreeLayout = TreeLayout {
        tetrahedra: 1,
        block: 7,
        quad_offset: 4,
        oct_offset: None,
        triangle_offset: Some(0),
    };

    fn collect(layout: TreeLayout, side: &[SideConstraint<i64>]) -> Vec<Vec<i64>> {
        let equations = MatrixInt::with_cols(layout.dimension());
        let search = TreeEnumeration::new(&equations, layout, side).unwrap();
        let mut out = Vec::new();
        search.run(&NoProgress, |r| out.push(r.into_vec())).unwrap();
        out
    }

    // =========================================================================
    // ENUMERATION
    // =========================================================================

    #[test]
    fn test_single_tetrahedron_standard() {
        let rays = collect(STANDARD, &[]);
        assert_eq!(rays.len(), 7);
        for ray in &rays {
            assert_eq!(ray.iter().sum::<i64>(), 1);
        }
    }

    #[test]
    fn test_single_tetrahedron_with_octagons() {
        let layout = TreeLayout {
            tetrahedra: 1,
            block: 6,
            quad_offset: 0,
            oct_offset: Some(3),
            triangle_offset: None,
        };
        assert_eq!(collect(layout, &[]).len(), 6);
    }

    #[test]
    fn test_side_constraint_restricts_solutions() {
        let mut coefficients = vec![0_i64; 7];
        coefficients[5] = 1;
        let side = [SideConstraint {
            coefficients,
            kind: SideKind::Zero,
        }];
        let rays = collect(STANDARD, &side);
        assert_eq!(rays.len(), 6);
        assert!(rays.iter().all(|r| r[5] == 0));
    }

    #[test]
    fn test_cancelled_traversal() {
        let equations = MatrixInt::<i64>::with_cols(7);
        let search = TreeEnumeration::new(&equations, STANDARD, &[]).unwrap();
        let handle = ProgressHandle::new();
        handle.cancel();
        let outcome = search.run(&handle, |_| {}).unwrap();
        assert!(outcome.is_cancelled());
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let equations = MatrixInt::<i64>::with_cols(6);
        assert!(matches!(
            TreeEnumeration::new(&equations, STANDARD, &[]),
            Err(EnumerationError::InvalidArgument { .. })
        ));
    }

    // =========================================================================
    // SINGLE SOLUTION
    // =========================================================================

    #[test]
    fn test_single_solution_with_positive_side() {
        let equations = MatrixInt::<i64>::with_cols(7);
        let mut coefficients = vec![0_i64; 7];
        coefficients[5] = 1;
        let side = [SideConstraint {
            coefficients,
            kind: SideKind::Positive,
        }];
        let search = TreeSingleSolution::new(&equations, STANDARD, &side).unwrap();
        let ray = search.find(&NoProgress).unwrap().unwrap();
        assert_eq!(ray.as_slice(), &[0, 0, 0, 0, 0, 1, 0]);

        let side = [SideConstraint {
            coefficients: vec![-1_i64; 7],
            kind: SideKind::Positive,
        }];
        let search = TreeSingleSolution::new(&equations, STANDARD, &side).unwrap();
        assert!(search.find(&NoProgress).unwrap().is_none());
    }

    #[test]
    fn test_tree_constraint_conversion() {
        let rows = TreeConstraint::None.side_constraints::<i64>(3, None).unwrap();
        assert!(rows.is_empty());
        assert!(matches!(
            TreeConstraint::EulerZero.side_constraints::<i64>(3, None),
            Err(EnumerationError::InvalidArgument { .. })
        ));
        let rows = TreeConstraint::EulerPositive
            .side_constraints::<i64>(3, Some(&[1, 1, -1]))
            .unwrap();
        assert_eq!(rows[0].kind, SideKind::Positive);
        let spun = TreeConstraint::NonSpun {
            rows: vec![vec![1, 0], vec![0, 1]],
        };
        assert!(spun.side_constraints::<i64>(3, None).is_err());
        assert_eq!(spun.side_constraints::<i64>(2, None).unwrap().len(), 2);
    }
}
