//! Individual normal discs and how they meet across faces.
//!
//! A [`DiscSet`] expands disc counts into discs `(tetrahedron, kind, index)`.
//! Within a face, the arcs at each corner are numbered outwards from the
//! corner: the triangles at that corner first, then the quads or octagons
//! that cut it. Two discs are adjacent across a face gluing exactly when
//! their arcs sit at the same position at corresponding corners.

use crate::core::ray::Ray;
use crate::core::triangulation::Triangulation3;
use crate::error::EnumerationError;
use crate::surfaces::tables::{DiscKind, arc_corners, corner_discs};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::VecDeque;

/// One disc: the `index`-th disc of `kind` in tetrahedron `tet`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscSpec {
    /// Tetrahedron index.
    pub tet: usize,
    /// Disc type.
    pub kind: DiscKind,
    /// Position in the stack of discs of this type.
    pub index: usize,
}

/// The discs of an embedded surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscSet {
    counts: Vec<[usize; 10]>,
    /// Flat index of the first disc of each `(tet, kind)`.
    offsets: Vec<[usize; 10]>,
    total: usize,
}

impl DiscSet {
    /// Builds the disc set from ten disc counts per tetrahedron (see
    /// [`DiscKind::offset`]).
    ///
    /// # Errors
    ///
    /// - [`EnumerationError::InvalidArgument`] if the vector has the wrong
    ///   shape, a negative entry, or too many discs to index.
    /// - [`EnumerationError::FailedPrecondition`] if some tetrahedron holds
    ///   two different quad or octagon types.
    pub fn new(discs: &Ray<BigInt>) -> Result<Self, EnumerationError> {
        if discs.len() % 10 != 0 {
            return Err(EnumerationError::invalid(format!(
                "disc vector of length {} is not ten per tetrahedron",
                discs.len()
            )));
        }
        let tets = discs.len() / 10;
        let mut counts = Vec::with_capacity(tets);
        let mut offsets = Vec::with_capacity(tets);
        let mut total = 0_usize;
        for t in 0..tets {
            let mut block = [0_usize; 10];
            let mut starts = [0_usize; 10];
            for (k, slot) in block.iter_mut().enumerate() {
                *slot = discs[10 * t + k]
                    .to_usize()
                    .ok_or_else(|| EnumerationError::invalid("disc counts must be small non-negative integers"))?;
            }
            if block[4..].iter().filter(|&&c| c > 0).count() > 1 {
                return Err(EnumerationError::precondition(
                    "building a disc set",
                    format!("an embedded surface, but tetrahedron {t} has two quad or octagon types"),
                ));
            }
            for (k, start) in starts.iter_mut().enumerate() {
                *start = total;
                total = total
                    .checked_add(block[k])
                    .ok_or_else(|| EnumerationError::invalid("too many discs"))?;
            }
            counts.push(block);
            offsets.push(starts);
        }
        Ok(Self { counts, offsets, total })
    }

    /// Number of tetrahedra.
    #[must_use]
    pub fn tetrahedra(&self) -> usize {
        self.counts.len()
    }

    /// Number of discs of `kind` in `tet`.
    #[must_use]
    pub fn count(&self, tet: usize, kind: DiscKind) -> usize {
        self.counts[tet][kind.offset()]
    }

    /// Total number of discs.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns `true` if there are no discs.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Every disc, tetrahedron by tetrahedron.
    pub fn iter(&self) -> impl Iterator<Item = DiscSpec> + '_ {
        self.counts.iter().enumerate().flat_map(|(tet, block)| {
            DiscKind::ALL
                .into_iter()
                .flat_map(move |kind| (0..block[kind.offset()]).map(move |index| DiscSpec { tet, kind, index }))
        })
    }

    /// Position of `disc` in `0..total()`.
    #[must_use]
    pub fn flat_index(&self, disc: DiscSpec) -> usize {
        self.offsets[disc.tet][disc.kind.offset()] + disc.index
    }

    /// Number of arcs at corner `v` of face `f` of `tet`.
    #[must_use]
    pub fn arc_count(&self, tet: usize, f: usize, v: usize) -> usize {
        corner_discs(v, f).iter().map(|&k| self.count(tet, k)).sum()
    }

    /// Position of the arc of `disc` at corner `v`, counted outwards from the
    /// corner. The disc must have an arc at `v` in the face being examined.
    #[must_use]
    pub fn arc_position(&self, disc: DiscSpec, v: usize) -> usize {
        match disc.kind {
            DiscKind::Triangle(_) => disc.index,
            kind => {
                let below = self.count(disc.tet, DiscKind::Triangle(v));
                let stacked = self.count(disc.tet, kind);
                if kind.numbered_from(v) {
                    below + disc.index
                } else {
                    below + stacked - 1 - disc.index
                }
            }
        }
    }

    /// The disc whose arc sits at `position` at corner `v` of face `f`.
    #[must_use]
    pub fn disc_at_arc(&self, tet: usize, f: usize, v: usize, position: usize) -> Option<DiscSpec> {
        let tris = self.count(tet, DiscKind::Triangle(v));
        if position < tris {
            return Some(DiscSpec {
                tet,
                kind: DiscKind::Triangle(v),
                index: position,
            });
        }
        let j = position - tris;
        corner_discs(v, f)[1..]
            .iter()
            .copied()
            .find(|&k| self.count(tet, k) > 0)
            .and_then(|kind| {
                let stacked = self.count(tet, kind);
                (j < stacked).then(|| DiscSpec {
                    tet,
                    kind,
                    index: if kind.numbered_from(v) { j } else { stacked - 1 - j },
                })
            })
    }

    /// The disc meeting `disc` across face `f` at corner `v`, with the image
    /// of `v` in its tetrahedron. `None` if `f` is a boundary face.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError::Internal`] if the arcs do not match up,
    /// which means the counts violate the matching equations.
    pub fn adjacent_disc(
        &self,
        tri: &Triangulation3,
        disc: DiscSpec,
        f: usize,
        v: usize,
    ) -> Result<Option<(DiscSpec, usize, i32)>, EnumerationError> {
        let Some((t2, g)) = tri.adjacent(disc.tet, f) else {
            return Ok(None);
        };
        let position = self.arc_position(disc, v);
        let other = self
            .disc_at_arc(t2, g[f], g[v], position)
            .ok_or_else(|| EnumerationError::internal(format!("unmatched arc across face {f} of tetrahedron {}", disc.tet)))?;
        Ok(Some((other, g[v], g.sign())))
    }

    /// Connected components and sidedness of the surface.
    ///
    /// # Errors
    ///
    /// As for [`Self::adjacent_disc`].
    pub fn analyse(&self, tri: &Triangulation3) -> Result<DiscSetAnalysis, EnumerationError> {
        const UNSEEN: usize = usize::MAX;
        let mut component = vec![UNSEEN; self.total];
        let mut side = vec![0_i32; self.total];
        let mut orient = vec![0_i32; self.total];
        let mut analysis = DiscSetAnalysis {
            components: 0,
            orientable: true,
            two_sided: true,
            real_boundary: false,
            component: Vec::new(),
        };
        let normal = |kind: DiscKind, v: usize| if kind.normal_towards(v) { 1 } else { -1 };

        for start in self.iter() {
            let s = self.flat_index(start);
            if component[s] != UNSEEN {
                continue;
            }
            let id = analysis.components;
            analysis.components += 1;
            component[s] = id;
            side[s] = 1;
            orient[s] = 1;
            let mut queue = VecDeque::from([start]);
            while let Some(disc) = queue.pop_front() {
                let d = self.flat_index(disc);
                for f in 0..4 {
                    for v in arc_corners(disc.kind, f) {
                        let Some((other, w, sign)) = self.adjacent_disc(tri, disc, f, v)? else {
                            analysis.real_boundary = true;
                            continue;
                        };
                        let o = self.flat_index(other);
                        let flip = normal(disc.kind, v) * normal(other.kind, w);
                        let want_side = side[d] * flip;
                        let want_orient = -orient[d] * flip * sign;
                        if component[o] == UNSEEN {
                            component[o] = id;
                            side[o] = want_side;
                            orient[o] = want_orient;
                            queue.push_back(other);
                        } else {
                            analysis.two_sided &= side[o] == want_side;
                            analysis.orientable &= orient[o] == want_orient;
                        }
                    }
                }
            }
        }
        analysis.component = component;
        tracing::trace!(
            discs = self.total,
            components = analysis.components,
            "disc set analysed"
        );
        Ok(analysis)
    }
}

/// Global properties of a disc set, from [`DiscSet::analyse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscSetAnalysis {
    /// Number of connected components.
    pub components: usize,
    /// Every component is orientable.
    pub orientable: bool,
    /// Every component is two-sided.
    pub two_sided: bool,
    /// Some disc meets a boundary face of the triangulation.
    pub real_boundary: bool,
    component: Vec<usize>,
}

impl DiscSetAnalysis {
    /// The component containing `disc`.
    #[must_use]
    pub fn component_of(&self, set: &DiscSet, disc: DiscSpec) -> usize {
        self.component[set.flat_index(disc)]
    }

    /// Disc counts (ten per tetrahedron) of each component.
    #[must_use]
    pub fn component_counts(&self, set: &DiscSet) -> Vec<Vec<usize>> {
        let mut out = vec![vec![0_usize; 10 * set.tetrahedra()]; self.components];
        for disc in set.iter() {
            out[self.component_of(set, disc)][10 * disc.tet + disc.kind.offset()] += 1;
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
