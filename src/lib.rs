//! # normal-surfaces
//!
//! Enumeration of normal and almost normal surfaces in 3-manifold
//! triangulations.
//!
//! A triangulation is a collection of tetrahedra with some faces glued in
//! pairs by affine maps. A normal surface meets every tetrahedron in a
//! disjoint union of triangles and quadrilaterals (and, for almost normal
//! surfaces, at most one octagon). Each surface is described by counting its
//! discs of each type, so the set of surfaces forms a rational polyhedral
//! cone cut out by linear matching equations. This crate enumerates the
//! extreme rays (vertex surfaces) and the Hilbert basis (fundamental
//! surfaces) of that cone, filtered by the admissibility constraints that
//! make a vector an embedded surface.
//!
//! # Features
//!
//! - Triangulations of 3-manifolds built from explicit gluings, with a lazily
//!   computed and cached skeleton (vertices, edges, triangles, components,
//!   boundary components and vertex links)
//! - Standard, quadrilateral, almost normal and transversely oriented
//!   coordinate systems
//! - Double description, tree traversal and dual Hilbert basis enumeration
//! - Fixed-width (`i64`, `i128`) and arbitrary precision integer backends
//! - Conversion between standard and quadrilateral vertex solution sets
//! - Surface properties: Euler characteristic, orientability, sidedness,
//!   connectedness, vertex and thin edge links, compatibility and
//!   disjointness
//! - Crushing a surface and cutting along it
//! - Vertex angle structures with taut and strict span detection
//! - Progress reporting and cooperative cancellation
//! - Serialization with [serde](https://serde.rs)
//!
//! # Basic usage
//!
//! ```rust
//! use normal_surfaces::prelude::*;
//! use std::sync::Arc;
//!
//! // A one-tetrahedron triangulation of the 3-sphere.
//! let sphere = Arc::new(census::layered_loop(1, false)?);
//!
//! let options = EnumerationOptionsBuilder::default()
//!     .coords(NormalCoords::Standard)
//!     .build()
//!     .unwrap();
//! let list = NormalSurfaces::enumerate(sphere, &options, &NoProgress)?;
//!
//! assert_eq!(list.len(), 3);
//! assert!(list.iter().any(NormalSurface::is_vertex_linking));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Choosing an algorithm
//!
//! [`NormalSurfaces::enumerate`](surfaces::list::NormalSurfaces::enumerate)
//! treats [`NormalAlg`](surfaces::list::NormalAlg) flags as hints. Embedded
//! vertex enumeration on a valid triangulation uses tree traversal unless
//! double description is requested, and standard coordinates on a valid
//! non-ideal triangulation are enumerated through quadrilateral coordinates
//! followed by a conversion. The algorithm actually used is recorded on the
//! list.
//!
//! # Cancellation
//!
//! Every enumeration takes a [`ProgressTracker`](core::progress::ProgressTracker).
//! A cancelled run returns an empty list marked as cancelled rather than an
//! error.
//!
//! ```rust
//! use normal_surfaces::prelude::*;
//! use std::sync::Arc;
//!
//! let handle = ProgressHandle::new();
//! handle.cancel();
//!
//! let tri = Arc::new(census::figure_eight()?);
//! let list = NormalSurfaces::enumerate(tri, &EnumerationOptions::default(), &handle)?;
//! assert!(list.is_cancelled());
//! assert!(list.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug!` for
//! algorithm selection and result sizes, `warn!` when a requested algorithm
//! hint cannot be honoured. Install any subscriber to see them.

// Allow multiple crate versions due to transitive dependencies
#![allow(clippy::multiple_crate_versions)]
// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Combinatorial foundations: integers, vectors, permutations and
/// triangulations.
pub mod core {
    /// Fixed and dynamic width bitmasks over coordinate positions
    pub mod bitmask;
    /// Small named triangulations used in tests and examples
    pub mod census;
    /// Hash map and buffer aliases used throughout the crate
    pub mod collections;
    pub mod integer;
    pub mod matrix;
    pub mod perm;
    /// Progress reporting and cancellation
    pub mod progress;
    pub mod ray;
    pub mod simplex;
    /// Face classes computed from the gluings
    pub mod skeleton;
    pub mod triangulation;
}

/// Cone enumeration algorithms, independent of any coordinate system.
pub mod enumerate {
    /// Extreme ray enumeration by double description
    pub mod double_description;
    /// Hilbert basis enumeration by the dual algorithm
    pub mod hilbert_dual;
    /// Maximal admissible faces of a cone
    pub mod max_admissible;
    pub mod outcome;
    /// Position vector ordering of hyperplanes
    pub mod pos_order;
    pub mod validity;
    /// Tree traversal enumeration
    pub mod tree {
        /// Exact simplex method over the matching equations
        pub mod lp;
        pub mod traversal;
        /// Trie of visited type vectors
        pub mod type_trie;
    }
}

/// Normal surface coordinates, surfaces and lists.
pub mod surfaces {
    pub mod conversion;
    pub mod coords;
    /// Crushing a surface
    pub mod crush;
    /// Cutting along a surface
    pub mod cut;
    pub mod disc_set;
    pub mod list;
    pub mod normal_surface;
    /// Disc and edge numbering tables
    pub mod tables;
}

/// Topological invariants of triangulations.
pub mod topology {
    /// Euler characteristic and structural checks
    pub mod characteristics {
        pub mod euler;
        pub mod validation;
    }
}

pub mod angle;
pub mod error;

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    pub use crate::angle::{AngleStructure, AngleStructures, AngleSummary};
    pub use crate::core::{
        census,
        integer::{IntegerBackend, IntegerChoice},
        perm::{Perm, Perm3},
        progress::{NoProgress, ProgressHandle, ProgressTracker},
        ray::Ray,
        triangulation::{Triangulation, Triangulation3, TriangulationError},
    };
    pub use crate::enumerate::tree::traversal::TreeConstraint;
    pub use crate::error::EnumerationError;
    pub use crate::surfaces::{
        coords::{CoordinateSystem, NormalCoords},
        list::{EnumerationOptions, EnumerationOptionsBuilder, NormalAlg, NormalList, NormalSurfaces},
        normal_surface::NormalSurface,
    };

    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
