//! Lists of normal surfaces and the enumeration driver.
//!
//! [`NormalSurfaces::enumerate`] turns a triangulation and an
//! [`EnumerationOptions`] into a list of surfaces. The driver builds the
//! matching equations and admissibility constraints for the requested
//! coordinate system, picks an algorithm, runs it with the requested integer
//! backend and wraps every ray as a [`NormalSurface`].
//!
//! # Examples
//!
//! ```rust
//! use normal_surfaces::prelude::*;
//! use std::sync::Arc;
//!
//! let ball = Arc::new(census::ball());
//! let list = NormalSurfaces::enumerate_with(ball, NormalCoords::Standard, NormalList::default(), NormalAlg::empty())?;
//! assert_eq!(list.len(), 7);
//! assert!(list.algorithm().contains(NormalAlg::TREE));
//! # Ok::<(), normal_surfaces::error::EnumerationError>(())
//! ```

use bitflags::bitflags;
use crate::core::bitmask::DynamicBitmask;
use crate::core::integer::{IntegerBackend, IntegerChoice};
use crate::core::matrix::MatrixInt;
use crate::core::progress::{NoProgress, ProgressTracker};
use crate::core::ray::Ray;
use crate::core::triangulation::Triangulation3;
use crate::enumerate::double_description::DoubleDescription;
use crate::enumerate::hilbert_dual::HilbertDual;
use crate::enumerate::max_admissible::MaxAdmissible;
use crate::enumerate::outcome::EnumerationOutcome;
use crate::enumerate::tree::traversal::{TreeConstraint, TreeEnumeration, TreeSingleSolution};
use crate::enumerate::validity::ValidityConstraints;
use crate::error::EnumerationError;
use crate::surfaces::conversion::quad_to_standard_vertices;
use crate::surfaces::coords::NormalCoords;
use crate::surfaces::normal_surface::NormalSurface;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Index;
use std::sync::Arc;

// =============================================================================
// FLAGS
// =============================================================================

bitflags! {
    /// Which surfaces a list holds.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct NormalList: u16 {
        /// Vertex surfaces (extreme rays of the admissible cone).
        const VERTEX = 0x0001;
        /// Fundamental surfaces (the Hilbert basis).
        const FUNDAMENTAL = 0x0002;
        /// Only embedded surfaces: quad constraints are enforced.
        const EMBEDDED_ONLY = 0x0010;
        /// Immersed and singular surfaces too: quad constraints are dropped.
        const IMMERSED_SINGULAR = 0x0020;
    }
}

bitflags! {
    /// Algorithm hints and, on a finished list, the algorithm used.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct NormalAlg: u16 {
        /// Tree traversal.
        const TREE = 0x0001;
        /// Double description.
        const DD = 0x0002;
        /// Standard-type coordinates through the reduced system and a
        /// vertex conversion.
        const VIA_REDUCED = 0x0010;
        /// Standard-type coordinates enumerated directly.
        const STANDARD_DIRECT = 0x0020;
        /// Dual Hilbert basis enumeration for fundamental surfaces.
        const HILBERT_DUAL = 0x0100;
    }
}

impl NormalList {
    /// Resolves contradictory flags: vertex wins over fundamental and
    /// embedded-only over immersed; missing choices get their defaults.
    #[must_use]
    pub const fn normalised(self) -> Self {
        let shape = if self.contains(Self::VERTEX) || !self.contains(Self::FUNDAMENTAL) {
            Self::VERTEX
        } else {
            Self::FUNDAMENTAL
        };
        let embedding = if self.contains(Self::IMMERSED_SINGULAR) && !self.contains(Self::EMBEDDED_ONLY) {
            Self::IMMERSED_SINGULAR
        } else {
            Self::EMBEDDED_ONLY
        };
        shape.union(embedding)
    }
}

impl Default for NormalList {
    fn default() -> Self {
        Self::VERTEX | Self::EMBEDDED_ONLY
    }
}

impl Default for NormalAlg {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// How to run an enumeration.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::integer::IntegerChoice;
/// use normal_surfaces::surfaces::coords::NormalCoords;
/// use normal_surfaces::surfaces::list::{EnumerationOptionsBuilder, NormalAlg};
///
/// let options = EnumerationOptionsBuilder::default()
///     .coords(NormalCoords::Quad)
///     .algorithm(NormalAlg::DD)
///     .integer(IntegerChoice::Native64)
///     .build()
///     .unwrap();
/// assert_eq!(options.initial_rows, None);
/// ```
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[builder(default)]
pub struct EnumerationOptions {
    /// Coordinate system to enumerate in.
    pub coords: NormalCoords,
    /// Vertex or fundamental, embedded or immersed.
    pub which: NormalList,
    /// Algorithm hints; empty lets the driver choose.
    pub algorithm: NormalAlg,
    /// Integer backend for the enumerator itself.
    pub integer: IntegerChoice,
    /// Leading matrix rows kept in place by double description. `None` uses
    /// the coordinate system's default.
    #[builder(setter(strip_option))]
    pub initial_rows: Option<usize>,
}

// =============================================================================
// NORMAL SURFACES
// =============================================================================

/// An ordered list of surfaces sharing one triangulation and one coordinate
/// system.
#[derive(Clone, Debug)]
pub struct NormalSurfaces {
    triangulation: Arc<Triangulation3>,
    coords: NormalCoords,
    which: NormalList,
    algorithm: NormalAlg,
    surfaces: Vec<NormalSurface>,
    cancelled: bool,
}

/// What the driver decided to run.
#[derive(Clone, Copy, Debug)]
struct Plan {
    /// System handed to the enumerator.
    enumerate_in: NormalCoords,
    tree: bool,
    via_reduced: bool,
    embedded: bool,
    initial_rows: Option<usize>,
}

impl NormalSurfaces {
    /// Enumerates surfaces in `tri` according to `options`.
    ///
    /// A cancelled run returns an empty list with
    /// [`is_cancelled`](Self::is_cancelled) set.
    ///
    /// # Errors
    ///
    /// - [`EnumerationError::ArithmeticOverflow`] if a fixed-width backend was
    ///   requested and overflowed; retry with a wider one.
    /// - [`EnumerationError::Internal`] if an invariant check fails.
    pub fn enumerate(
        tri: Arc<Triangulation3>,
        options: &EnumerationOptions,
        tracker: &dyn ProgressTracker,
    ) -> Result<Self, EnumerationError> {
        let which = options.which.normalised();
        let mut list = Self {
            triangulation: Arc::clone(&tri),
            coords: options.coords,
            which,
            algorithm: NormalAlg::empty(),
            surfaces: Vec::new(),
            cancelled: false,
        };
        if tri.is_empty() {
            tracing::debug!(coords = %options.coords, "empty triangulation; nothing to enumerate");
            return Ok(list);
        }

        let rays = if which.contains(NormalList::FUNDAMENTAL) {
            list.algorithm = NormalAlg::HILBERT_DUAL;
            match options.integer {
                IntegerChoice::Native64 => fundamental::<i64>(&tri, options.coords, which, tracker)?,
                IntegerChoice::Wide128 => fundamental::<i128>(&tri, options.coords, which, tracker)?,
                IntegerChoice::Arbitrary => fundamental::<BigInt>(&tri, options.coords, which, tracker)?,
            }
        } else {
            let plan = plan(&tri, options, which);
            list.algorithm = plan.algorithm(options.coords);
            tracing::debug!(coords = %options.coords, algorithm = ?list.algorithm, "enumerating vertex surfaces");
            match options.integer {
                IntegerChoice::Native64 => vertices::<i64>(&tri, options.coords, plan, tracker)?,
                IntegerChoice::Wide128 => vertices::<i128>(&tri, options.coords, plan, tracker)?,
                IntegerChoice::Arbitrary => vertices::<BigInt>(&tri, options.coords, plan, tracker)?,
            }
        };

        match rays {
            Some(rays) => {
                list.surfaces = rays
                    .into_iter()
                    .map(|ray| NormalSurface::from_parts(Arc::clone(&tri), options.coords, ray))
                    .collect();
                tracing::debug!(surfaces = list.surfaces.len(), "enumeration finished");
            }
            None => {
                tracing::debug!("enumeration cancelled");
                list.cancelled = true;
            }
        }
        Ok(list)
    }

    /// Enumerates with default options apart from the given ones, without
    /// progress reporting.
    ///
    /// # Errors
    ///
    /// As for [`Self::enumerate`].
    pub fn enumerate_with(
        tri: Arc<Triangulation3>,
        coords: NormalCoords,
        which: NormalList,
        algorithm: NormalAlg,
    ) -> Result<Self, EnumerationError> {
        let options = EnumerationOptions {
            coords,
            which,
            algorithm,
            ..EnumerationOptions::default()
        };
        Self::enumerate(tri, &options, &NoProgress)
    }

    /// Searches by tree traversal for one non-empty admissible surface
    /// meeting `constraint`, such as an almost normal sphere candidate with
    /// positive Euler characteristic.
    ///
    /// Returns `None` if there is no such surface or the search was
    /// cancelled.
    ///
    /// # Errors
    ///
    /// - [`EnumerationError::InvalidArgument`] if `coords` does not support
    ///   tree traversal, or the constraint needs an Euler form `coords` lacks.
    /// - [`EnumerationError::FailedPrecondition`] if `tri` is invalid.
    pub fn find_single(
        tri: Arc<Triangulation3>,
        coords: NormalCoords,
        constraint: &TreeConstraint,
        tracker: &dyn ProgressTracker,
    ) -> Result<Option<NormalSurface>, EnumerationError> {
        let system = coords.system();
        let layout = system.tree_layout(&tri).ok_or_else(|| {
            EnumerationError::invalid(format!("tree traversal is not available in {coords}"))
        })?;
        if !tri.skeleton().is_valid() {
            return Err(EnumerationError::precondition("find_single", "a valid triangulation"));
        }
        let equations: MatrixInt<BigInt> = system.equations(&tri)?.convert()?;
        let euler = system.euler_row(&tri);
        let side = constraint.side_constraints::<BigInt>(system.dimension(&tri), euler.as_deref())?;
        let search = TreeSingleSolution::new(&equations, layout, &side)?;
        Ok(search
            .find(tracker)?
            .map(|ray| NormalSurface::from_parts(Arc::clone(&tri), coords, ray)))
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Number of surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns `true` if the list holds no surfaces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// The surface at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&NormalSurface> {
        self.surfaces.get(index)
    }

    /// Surfaces in order.
    pub fn iter(&self) -> std::slice::Iter<'_, NormalSurface> {
        self.surfaces.iter()
    }

    /// The coordinate system of every surface.
    #[must_use]
    pub const fn coords(&self) -> NormalCoords {
        self.coords
    }

    /// The list flavour, normalised.
    #[must_use]
    pub const fn which(&self) -> NormalList {
        self.which
    }

    /// The algorithm actually used.
    #[must_use]
    pub const fn algorithm(&self) -> NormalAlg {
        self.algorithm
    }

    /// The shared triangulation.
    #[must_use]
    pub const fn triangulation(&self) -> &Arc<Triangulation3> {
        &self.triangulation
    }

    /// Returns `true` if the enumeration was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns `true` if octagons are allowed.
    #[must_use]
    pub fn allows_almost_normal(&self) -> bool {
        self.coords.allows_almost_normal()
    }

    /// Returns `true` if discs are transversely oriented.
    #[must_use]
    pub fn allows_oriented(&self) -> bool {
        self.coords.allows_oriented()
    }

    /// Returns `true` if only embedded surfaces were listed.
    #[must_use]
    pub const fn is_embedded_only(&self) -> bool {
        self.which.contains(NormalList::EMBEDDED_ONLY)
    }

    /// Coordinate vectors in order.
    pub fn vectors(&self) -> impl Iterator<Item = &Ray<BigInt>> {
        self.surfaces.iter().map(NormalSurface::vector)
    }

    /// The matching equations of this list's system.
    ///
    /// # Errors
    ///
    /// As for [`CoordinateSystem::equations`](crate::surfaces::coords::CoordinateSystem::equations).
    pub fn matching_equations(&self) -> Result<MatrixInt<i64>, EnumerationError> {
        self.coords.system().equations(&self.triangulation)
    }

    /// Supports of the maximal admissible faces spanned by this list.
    ///
    /// # Errors
    ///
    /// [`EnumerationError::FailedPrecondition`] unless this is an embedded
    /// vertex list.
    pub fn max_admissible_faces(&self) -> Result<Vec<DynamicBitmask>, EnumerationError> {
        if !(self.which.contains(NormalList::VERTEX) && self.is_embedded_only()) {
            return Err(EnumerationError::precondition(
                "max_admissible_faces",
                "a list of embedded vertex surfaces",
            ));
        }
        let rays: Vec<Ray<BigInt>> = self.vectors().cloned().collect();
        let constraints = self.coords.system().constraints(&self.triangulation);
        MaxAdmissible::enumerate::<BigInt, DynamicBitmask>(&rays, &constraints)
    }

    /// Sorts the surfaces with `compare`. The sort is stable.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&NormalSurface, &NormalSurface) -> Ordering,
    {
        self.surfaces.sort_by(compare);
    }
}

impl Index<usize> for NormalSurfaces {
    type Output = NormalSurface;

    fn index(&self, index: usize) -> &NormalSurface {
        &self.surfaces[index]
    }
}

impl<'a> IntoIterator for &'a NormalSurfaces {
    type Item = &'a NormalSurface;
    type IntoIter = std::slice::Iter<'a, NormalSurface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.iter()
    }
}

// =============================================================================
// DRIVER
// =============================================================================

impl Plan {
    fn algorithm(self, coords: NormalCoords) -> NormalAlg {
        let mut alg = if self.tree { NormalAlg::TREE } else { NormalAlg::DD };
        if !coords.is_quad_only() {
            alg |= if self.via_reduced {
                NormalAlg::VIA_REDUCED
            } else {
                NormalAlg::STANDARD_DIRECT
            };
        }
        alg
    }
}

fn plan(tri: &Triangulation3, options: &EnumerationOptions, which: NormalList) -> Plan {
    let skeleton = tri.skeleton();
    let hints = options.algorithm;
    let coords = options.coords;
    let embedded = which.contains(NormalList::EMBEDDED_ONLY);

    let reducible = matches!(coords, NormalCoords::Standard | NormalCoords::AlmostNormal) && embedded;
    let can_reduce = reducible && skeleton.is_valid() && !skeleton.is_ideal();
    let via_reduced = can_reduce && !hints.contains(NormalAlg::STANDARD_DIRECT);
    if hints.contains(NormalAlg::VIA_REDUCED) && !can_reduce {
        tracing::warn!(%coords, "vertex enumeration via the reduced system is unavailable; enumerating directly");
    }
    let enumerate_in = if via_reduced { coords.reduced_counterpart() } else { coords };

    let tree_possible = embedded && skeleton.is_valid() && enumerate_in.system().tree_layout(tri).is_some();
    if hints.contains(NormalAlg::TREE) && !tree_possible {
        tracing::warn!(%coords, "tree traversal is unavailable here; using double description");
    }
    let tree = tree_possible && (hints.contains(NormalAlg::TREE) || !hints.contains(NormalAlg::DD));
    Plan {
        enumerate_in,
        tree,
        via_reduced,
        embedded,
        initial_rows: options.initial_rows,
    }
}

/// Calls `$body` with `$b` bound to the narrowest bitmask type holding
/// `$len` bits.
macro_rules! with_bitmask {
    ($len:expr, $b:ident => $body:expr) => {{
        let len: usize = $len;
        if len <= 64 {
            type $b = u64;
            $body
        } else if len <= 128 {
            type $b = u128;
            $body
        } else {
            type $b = DynamicBitmask;
            $body
        }
    }};
}

/// Collects the rays of a run; `None` if it was cancelled.
fn collect<I, F>(run: F) -> Result<Option<Vec<Ray<I>>>, EnumerationError>
where
    F: FnOnce(&mut dyn FnMut(Ray<I>)) -> Result<EnumerationOutcome, EnumerationError>,
{
    let mut rays = Vec::new();
    let outcome = run(&mut |ray| rays.push(ray))?;
    Ok((!outcome.is_cancelled()).then_some(rays))
}

fn vertices<I: IntegerBackend>(
    tri: &Triangulation3,
    coords: NormalCoords,
    plan: Plan,
    tracker: &dyn ProgressTracker,
) -> Result<Option<Vec<Ray<BigInt>>>, EnumerationError> {
    let system = plan.enumerate_in.system();
    let equations: MatrixInt<I> = system.equations(tri)?.convert()?;
    let constraints = if plan.embedded {
        system.constraints(tri)
    } else {
        ValidityConstraints::none()
    };
    tracing::debug!(
        rows = equations.rows(),
        cols = equations.cols(),
        tree = plan.tree,
        via_reduced = plan.via_reduced,
        "vertex enumeration input"
    );

    let rays: Option<Vec<Ray<I>>> = match (plan.tree, system.tree_layout(tri)) {
        (true, Some(layout)) => {
            let search = TreeEnumeration::new(&equations, layout, &[])?;
            collect(|sink| search.run(tracker, sink))?
        }
        _ => {
            let initial = plan.initial_rows.unwrap_or_else(|| system.initial_rows(tri));
            with_bitmask!(equations.cols(), B => collect(|sink| {
                DoubleDescription::enumerate::<I, B, _>(&equations, &constraints, tracker, initial, sink)
            })?)
        }
    };
    let Some(rays) = rays else {
        return Ok(None);
    };

    let rays = if plan.via_reduced {
        let dimension = coords.system().dimension(tri);
        let converted = with_bitmask!(dimension, B => {
            quad_to_standard_vertices::<I, B>(tri, plan.enumerate_in, &rays, tracker)?
        });
        let Some(converted) = converted else {
            return Ok(None);
        };
        converted
    } else {
        rays
    };
    Ok(Some(rays.iter().map(Ray::to_bigint).collect()))
}

fn fundamental<I: IntegerBackend>(
    tri: &Triangulation3,
    coords: NormalCoords,
    which: NormalList,
    tracker: &dyn ProgressTracker,
) -> Result<Option<Vec<Ray<BigInt>>>, EnumerationError> {
    let system = coords.system();
    let equations: MatrixInt<I> = system.equations(tri)?.convert()?;
    let constraints = if which.contains(NormalList::EMBEDDED_ONLY) {
        system.constraints(tri)
    } else {
        ValidityConstraints::none()
    };
    tracing::debug!(rows = equations.rows(), cols = equations.cols(), "fundamental enumeration input");
    let rays: Option<Vec<Ray<I>>> = with_bitmask!(equations.cols(), B => collect(|sink| {
        HilbertDual::enumerate::<I, B, _>(&equations, &constraints, tracker, sink)
    })?);
    Ok(rays.map(|rays| rays.iter().map(Ray::to_bigint).collect()))
}

// =============================================================================
// TESTS
// =============================================================================
