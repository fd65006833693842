//! Top-dimensional simplices and their facet gluings.
//!
//! A [`Simplex<D>`] records, for each of its `D + 1` facets, the simplex glued
//! to it and the vertex permutation realising the gluing. Simplices are owned
//! by a [`Triangulation`](crate::core::triangulation::Triangulation) and are
//! created through it; the builder here only fills in the user-facing fields.
//!
//! # Examples
//!
//! ```rust
//! use normal_surfaces::core::simplex::SimplexBuilder;
//!
//! let simplex = SimplexBuilder::<3>::default()
//!     .description("apex")
//!     .build()
//!     .unwrap();
//! assert_eq!(simplex.description(), Some("apex"));
//! assert!(simplex.adjacent_key(0).is_none());
//! ```

use crate::core::collections::FacetBuffer;
use crate::core::perm::Perm;
use slotmap::new_key_type;

new_key_type! {
    /// Stable key of a simplex inside a triangulation's storage map.
    ///
    /// Keys survive the removal of other simplices; public APIs speak in
    /// simplex indices and translate through this key internally.
    pub struct SimplexKey;
}

/// One side of a facet gluing: the simplex on the other side and the vertex map.
///
/// For a gluing stored on facet `f` of simplex `s`, vertex `i` of `s` is
/// identified with vertex `perm[i]` of the adjacent simplex, and facet `f` of `s`
/// is glued to facet `perm[f]` of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Gluing<const D: usize> {
    /// Storage key of the adjacent simplex.
    pub simplex: SimplexKey,
    /// Vertex map from this simplex to the adjacent one.
    pub perm: Perm<D>,
}

/// A `D`-simplex of a triangulation.
#[derive(Builder, Clone, Debug)]
pub struct Simplex<const D: usize> {
    /// Position of this simplex in its triangulation, maintained by the owner.
    #[builder(setter(skip), default = "0")]
    index: usize,
    /// Optional user-facing label.
    #[builder(setter(into, strip_option), default)]
    description: Option<String>,
    /// Gluing on each facet, `None` for boundary facets.
    #[builder(setter(skip), default = "FacetBuffer::from_elem(None, D + 1)")]
    adjacent: FacetBuffer<Option<Gluing<D>>>,
}

impl<const D: usize> Simplex<D> {
    /// Position of this simplex in its triangulation.
    #[must_use]
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The user-facing label, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The gluing on facet `facet`, if that facet is not boundary.
    #[must_use]
    #[inline]
    pub fn gluing(&self, facet: usize) -> Option<&Gluing<D>> {
        self.adjacent.get(facet).and_then(Option::as_ref)
    }

    /// Storage key of the simplex glued to `facet`.
    #[must_use]
    #[inline]
    pub fn adjacent_key(&self, facet: usize) -> Option<SimplexKey> {
        self.gluing(facet).map(|g| g.simplex)
    }

    /// Returns `true` if `facet` lies on the boundary.
    #[must_use]
    #[inline]
    pub fn is_boundary_facet(&self, facet: usize) -> bool {
        self.gluing(facet).is_none()
    }

    /// Number of facets glued to some simplex.
    #[must_use]
    pub fn glued_facet_count(&self) -> usize {
        self.adjacent.iter().filter(|g| g.is_some()).count()
    }

    pub(crate) fn detached(description: Option<String>) -> Self {
        Self {
            index: 0,
            description,
            adjacent: FacetBuffer::from_elem(None, D + 1),
        }
    }

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_gluing(&mut self, facet: usize, gluing: Option<Gluing<D>>) {
        self.adjacent[facet] = gluing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let s = SimplexBuilder::<2>::default().build().unwrap();
        assert_eq!(s.index(), 0);
        assert!(s.description().is_none());
        assert_eq!(s.glued_facet_count(), 0);
        assert!((0..3).all(|f| s.is_boundary_facet(f)));
        assert!(s.gluing(3).is_none());
    }

    #[test]
    fn test_description_setter_accepts_str() {
        let s = SimplexBuilder::<3>::default()
            .description("tet")
            .build()
            .unwrap();
        assert_eq!(s.description(), Some("tet"));
    }
}
