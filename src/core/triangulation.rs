//! Combinatorial triangulations built from facet gluings.
//!
//! A [`Triangulation<D>`] is an ordered list of `D`-simplices together with
//! reciprocal gluings between pairs of facets. There is no geometry: every
//! structural question (vertices, edges, links, boundary) is answered by the
//! [`Skeleton`] computed on demand and cached until the next mutation.
//!
//! # Examples
//!
//! ```rust
//! use normal_surfaces::core::perm::Perm3;
//! use normal_surfaces::core::triangulation::Triangulation3;
//!
//! // One tetrahedron with two faces folded together.
//! let mut tri = Triangulation3::with_simplices(1);
//! tri.join(0, 0, 0, Perm3::from_images(&[1, 2, 3, 0])?)?;
//!
//! assert_eq!(tri.size(), 1);
//! assert_eq!(tri.adjacent(0, 1).map(|(s, _)| s), Some(0));
//! assert!(tri.skeleton().has_boundary_facets());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::core::collections::{MAX_PRACTICAL_DIMENSION_SIZE, StorageMap};
use crate::core::perm::{Perm, PermError};
use crate::core::simplex::{Gluing, Simplex, SimplexBuilder, SimplexKey};
use crate::core::skeleton::Skeleton;
use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while building, editing or validating a triangulation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TriangulationError {
    /// A simplex index was out of range.
    #[error("simplex index {index} out of range for a triangulation of size {size}")]
    SimplexIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of simplices.
        size: usize,
    },
    /// A facet number was out of range.
    #[error("facet {facet} out of range for a {dimension}-simplex")]
    FacetOutOfRange {
        /// The offending facet number.
        facet: usize,
        /// Dimension of the simplices.
        dimension: usize,
    },
    /// The facet is already glued to something.
    #[error("facet {facet} of simplex {simplex} is already glued")]
    FacetAlreadyGlued {
        /// Simplex index.
        simplex: usize,
        /// Facet number.
        facet: usize,
    },
    /// A facet was asked to be glued to itself.
    #[error("facet {facet} of simplex {simplex} cannot be glued to itself")]
    SelfGluedFacet {
        /// Simplex index.
        simplex: usize,
        /// Facet number.
        facet: usize,
    },
    /// The gluing on one side of a facet pair does not match the other side.
    #[error("gluing on facet {facet} of simplex {simplex} is not reciprocated")]
    NonReciprocalGluing {
        /// Simplex index.
        simplex: usize,
        /// Facet number.
        facet: usize,
    },
    /// The serialised data has the wrong shape.
    #[error("simplex {simplex} lists {found} facets, expected {expected}")]
    WrongFacetCount {
        /// Simplex index.
        simplex: usize,
        /// Number of facets supplied.
        found: usize,
        /// Number of facets required (`D + 1`).
        expected: usize,
    },
    /// The simplex builder rejected its input.
    #[error("failed to construct simplex: {message}")]
    SimplexConstruction {
        /// Builder diagnostics.
        message: String,
    },
    /// A face embedding disagrees with the face index recorded for its simplex.
    #[error("skeleton is inconsistent at {dimension}-face {face}")]
    InconsistentSkeleton {
        /// Dimension of the face.
        dimension: usize,
        /// Index of the face class.
        face: usize,
    },
    /// A named construction was asked for parameters it cannot realise.
    #[error("cannot build {construction}: {reason}")]
    InvalidParameters {
        /// The construction requested.
        construction: &'static str,
        /// Why the parameters were rejected.
        reason: String,
    },
    /// A gluing permutation was malformed.
    #[error(transparent)]
    Perm(#[from] PermError),
}

// =============================================================================
// TRIANGULATION
// =============================================================================

/// A `D`-dimensional triangulation.
///
/// Simplices are addressed by index `0..size()`. Removing a simplex shifts the
/// indices of every later simplex down by one.
#[derive(Serialize, Deserialize)]
#[serde(
    try_from = "TriangulationData<D>",
    into = "TriangulationData<D>",
    bound = ""
)]
pub struct Triangulation<const D: usize> {
    /// Simplex storage with stable keys.
    simplices: StorageMap<SimplexKey, Simplex<D>>,
    /// Simplex keys in index order.
    order: Vec<SimplexKey>,
    /// Bumped on every structural change.
    generation: AtomicU64,
    /// Lazily built skeleton for the current generation.
    skeleton_cache: ArcSwapOption<Skeleton<D>>,
}

/// Three-dimensional triangulations, the setting for normal surface theory.
pub type Triangulation3 = Triangulation<3>;

/// A single gluing as supplied to [`Triangulation::from_gluings`]:
/// `(simplex, facet, adjacent simplex, vertex map)`.
pub type GluingSpec<const D: usize> = (usize, usize, usize, Perm<D>);

impl<const D: usize> Triangulation<D> {
    const SIZE_OK: () = assert!(
        D < MAX_PRACTICAL_DIMENSION_SIZE,
        "simplex dimension exceeds MAX_PRACTICAL_DIMENSION_SIZE"
    );

    /// An empty triangulation.
    #[must_use]
    pub fn new() -> Self {
        let () = Self::SIZE_OK;
        Self {
            simplices: StorageMap::with_key(),
            order: Vec::new(),
            generation: AtomicU64::new(0),
            skeleton_cache: ArcSwapOption::empty(),
        }
    }

    /// A triangulation of `n` isolated simplices.
    #[must_use]
    pub fn with_simplices(n: usize) -> Self {
        let mut tri = Self::new();
        for _ in 0..n {
            tri.push_simplex(None);
        }
        tri
    }

    /// Builds a triangulation of `n` simplices from a list of gluings.
    ///
    /// # Errors
    ///
    /// Returns the first [`TriangulationError`] raised by [`Self::join`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use normal_surfaces::core::perm::Perm3;
    /// use normal_surfaces::core::triangulation::Triangulation3;
    ///
    /// let p = Perm3::from_images(&[1, 2, 0, 3])?;
    /// let q = Perm3::from_images(&[0, 2, 3, 1])?;
    /// let gieseking = Triangulation3::from_gluings(1, &[(0, 0, 0, p), (0, 2, 0, q)])?;
    /// assert!(gieseking.skeleton().is_ideal());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_gluings(n: usize, gluings: &[GluingSpec<D>]) -> Result<Self, TriangulationError> {
        let mut tri = Self::with_simplices(n);
        for &(a, facet, b, perm) in gluings {
            tri.join(a, facet, b, perm)?;
        }
        Ok(tri)
    }

    fn push_simplex(&mut self, description: Option<String>) -> usize {
        self.insert_simplex(Simplex::detached(description))
    }

    fn insert_simplex(&mut self, mut simplex: Simplex<D>) -> usize {
        let index = self.order.len();
        simplex.set_index(index);
        let key = self.simplices.insert(simplex);
        self.order.push(key);
        self.invalidate();
        index
    }

    /// Appends an isolated simplex configured through a [`SimplexBuilder`] and
    /// returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::SimplexConstruction`] if the builder fails.
    pub fn add_built_simplex(&mut self, builder: &SimplexBuilder<D>) -> Result<usize, TriangulationError> {
        let simplex = builder
            .build()
            .map_err(|e| TriangulationError::SimplexConstruction {
                message: e.to_string(),
            })?;
        Ok(self.insert_simplex(simplex))
    }

    /// Appends a new isolated simplex and returns its index.
    pub fn add_simplex(&mut self) -> usize {
        self.push_simplex(None)
    }

    /// Appends a new isolated simplex with a description and returns its index.
    pub fn add_simplex_with_description(&mut self, description: impl Into<String>) -> usize {
        self.push_simplex(Some(description.into()))
    }

    /// Removes simplex `index`, unjoining all its facets first.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::SimplexIndexOutOfRange`] for a bad index.
    pub fn remove_simplex_at(&mut self, index: usize) -> Result<(), TriangulationError> {
        self.check_index(index)?;
        for facet in 0..=D {
            self.unjoin(index, facet)?;
        }
        let key = self.order.remove(index);
        self.simplices.remove(key);
        for (i, &k) in self.order.iter().enumerate().skip(index) {
            if let Some(s) = self.simplices.get_mut(k) {
                s.set_index(i);
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Glues facet `facet` of simplex `a` to simplex `b`, mapping vertex `i` of
    /// `a` to vertex `perm[i]` of `b`. The reverse gluing is recorded too.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError`] if an index is out of range, either facet
    /// is already glued, or a facet would be glued to itself.
    pub fn join(
        &mut self,
        a: usize,
        facet: usize,
        b: usize,
        perm: Perm<D>,
    ) -> Result<(), TriangulationError> {
        self.check_index(a)?;
        self.check_index(b)?;
        Self::check_facet(facet)?;
        let other_facet = perm.image(facet);
        if a == b && other_facet == facet {
            return Err(TriangulationError::SelfGluedFacet { simplex: a, facet });
        }
        let key_a = self.order[a];
        let key_b = self.order[b];
        if !self.simplices[key_a].is_boundary_facet(facet) {
            return Err(TriangulationError::FacetAlreadyGlued { simplex: a, facet });
        }
        if !self.simplices[key_b].is_boundary_facet(other_facet) {
            return Err(TriangulationError::FacetAlreadyGlued {
                simplex: b,
                facet: other_facet,
            });
        }
        self.simplices[key_a].set_gluing(
            facet,
            Some(Gluing {
                simplex: key_b,
                perm,
            }),
        );
        self.simplices[key_b].set_gluing(
            other_facet,
            Some(Gluing {
                simplex: key_a,
                perm: perm.inverse(),
            }),
        );
        self.invalidate();
        Ok(())
    }

    /// Unglues facet `facet` of simplex `a` and returns what it was glued to.
    ///
    /// Unjoining a boundary facet is a no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError`] if an index is out of range.
    pub fn unjoin(
        &mut self,
        a: usize,
        facet: usize,
    ) -> Result<Option<(usize, Perm<D>)>, TriangulationError> {
        self.check_index(a)?;
        Self::check_facet(facet)?;
        let key_a = self.order[a];
        let Some(gluing) = self.simplices[key_a].gluing(facet).copied() else {
            return Ok(None);
        };
        let other_facet = gluing.perm.image(facet);
        self.simplices[key_a].set_gluing(facet, None);
        if let Some(other) = self.simplices.get_mut(gluing.simplex) {
            other.set_gluing(other_facet, None);
        }
        self.invalidate();
        let b = self.simplices[gluing.simplex].index();
        Ok(Some((b, gluing.perm)))
    }

    /// Number of simplices.
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if there are no simplices.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Simplex `index`, if it exists.
    #[must_use]
    pub fn simplex(&self, index: usize) -> Option<&Simplex<D>> {
        self.order.get(index).and_then(|&k| self.simplices.get(k))
    }

    /// Iterates over the simplices in index order.
    pub fn simplices(&self) -> impl Iterator<Item = &Simplex<D>> {
        self.order.iter().filter_map(|&k| self.simplices.get(k))
    }

    /// The simplex and vertex map glued to facet `facet` of simplex `index`.
    #[must_use]
    pub fn adjacent(&self, index: usize, facet: usize) -> Option<(usize, Perm<D>)> {
        let gluing = self.simplex(index)?.gluing(facet)?;
        let other = self.simplices.get(gluing.simplex)?;
        Some((other.index(), gluing.perm))
    }

    /// Every gluing exactly once, as `(a, facet, b, perm)` with
    /// `(a, facet) < (b, perm[facet])`.
    #[must_use]
    pub fn gluings(&self) -> Vec<GluingSpec<D>> {
        let mut result = Vec::new();
        for a in 0..self.size() {
            for facet in 0..=D {
                if let Some((b, perm)) = self.adjacent(a, facet)
                    && (a, facet) < (b, perm.image(facet))
                {
                    result.push((a, facet, b, perm));
                }
            }
        }
        result
    }

    /// Monotone counter bumped on every structural change.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The skeleton of this triangulation, built on first use and cached until
    /// the next mutation.
    #[must_use]
    pub fn skeleton(&self) -> Arc<Skeleton<D>> {
        let generation = self.generation();
        if let Some(cached) = self.skeleton_cache.load_full()
            && cached.generation() == generation
        {
            return cached;
        }
        // Build at most once even if the RCU closure retries.
        let mut built: Option<Arc<Skeleton<D>>> = None;
        self.skeleton_cache.rcu(|old| match old {
            Some(existing) if existing.generation() == generation => Some(Arc::clone(existing)),
            _ => Some(Arc::clone(
                built.get_or_insert_with(|| Arc::new(Skeleton::build(self, generation))),
            )),
        });
        match self.skeleton_cache.load_full() {
            Some(current) if current.generation() == generation => current,
            _ => built.unwrap_or_else(|| Arc::new(Skeleton::build(self, generation))),
        }
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.skeleton_cache.store(None);
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), TriangulationError> {
        if index < self.size() {
            Ok(())
        } else {
            Err(TriangulationError::SimplexIndexOutOfRange {
                index,
                size: self.size(),
            })
        }
    }

    const fn check_facet(facet: usize) -> Result<(), TriangulationError> {
        if facet <= D {
            Ok(())
        } else {
            Err(TriangulationError::FacetOutOfRange {
                facet,
                dimension: D,
            })
        }
    }

    /// Raw gluing check used by validation: the stored gluing on `(index, facet)`
    /// must be mirrored on the other side.
    pub(crate) fn gluing_is_reciprocal(&self, index: usize, facet: usize) -> bool {
        let Some(simplex) = self.simplex(index) else {
            return false;
        };
        let Some(gluing) = simplex.gluing(facet) else {
            return true;
        };
        let Some(other) = self.simplices.get(gluing.simplex) else {
            return false;
        };
        other
            .gluing(gluing.perm.image(facet))
            .is_some_and(|back| back.simplex == self.order[index] && back.perm == gluing.perm.inverse())
    }
}

impl<const D: usize> Default for Triangulation<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> Clone for Triangulation<D> {
    fn clone(&self) -> Self {
        Self {
            simplices: self.simplices.clone(),
            order: self.order.clone(),
            generation: AtomicU64::new(self.generation()),
            skeleton_cache: ArcSwapOption::new(self.skeleton_cache.load_full()),
        }
    }
}

impl<const D: usize> fmt::Debug for Triangulation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Triangulation")
            .field("dimension", &D)
            .field("size", &self.size())
            .field("gluings", &self.gluings())
            .finish()
    }
}

impl<const D: usize> PartialEq for Triangulation<D> {
    /// Two triangulations are equal when they have identical gluings under the
    /// identity relabelling (this is not an isomorphism test).
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.gluings() == other.gluings()
    }
}

impl<const D: usize> Eq for Triangulation<D> {}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Serialised form of one simplex.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
struct SimplexData<const D: usize> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    adjacent: Vec<Option<(usize, Perm<D>)>>,
}

/// Serialised form of a triangulation: gluings by simplex index.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
struct TriangulationData<const D: usize> {
    simplices: Vec<SimplexData<D>>,
}

impl<const D: usize> From<Triangulation<D>> for TriangulationData<D> {
    fn from(tri: Triangulation<D>) -> Self {
        let simplices = (0..tri.size())
            .map(|i| SimplexData {
                description: tri
                    .simplex(i)
                    .and_then(Simplex::description)
                    .map(str::to_owned),
                adjacent: (0..=D).map(|f| tri.adjacent(i, f)).collect(),
            })
            .collect();
        Self { simplices }
    }
}

impl<const D: usize> TryFrom<TriangulationData<D>> for Triangulation<D> {
    type Error = TriangulationError;

    fn try_from(data: TriangulationData<D>) -> Result<Self, Self::Error> {
        let n = data.simplices.len();
        let mut tri = Self::new();
        for s in &data.simplices {
            tri.push_simplex(s.description.clone());
        }
        for (a, s) in data.simplices.iter().enumerate() {
            if s.adjacent.len() != D + 1 {
                return Err(TriangulationError::WrongFacetCount {
                    simplex: a,
                    found: s.adjacent.len(),
                    expected: D + 1,
                });
            }
            for (facet, entry) in s.adjacent.iter().enumerate() {
                let Some((b, perm)) = *entry else { continue };
                if b >= n {
                    return Err(TriangulationError::SimplexIndexOutOfRange { index: b, size: n });
                }
                let other_facet = perm.image(facet);
                if a == b && other_facet == facet {
                    return Err(TriangulationError::SelfGluedFacet { simplex: a, facet });
                }
                let mirrored = data.simplices[b]
                    .adjacent
                    .get(other_facet)
                    .copied()
                    .flatten();
                if mirrored != Some((a, perm.inverse())) {
                    return Err(TriangulationError::NonReciprocalGluing { simplex: a, facet });
                }
                if (a, facet) < (b, other_facet) {
                    tri.join(a, facet, b, perm)?;
                }
            }
        }
        Ok(tri)
    }
}

// =============================================================================
// TESTS
// =============================================================================
