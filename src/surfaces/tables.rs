//! Normal disc combinatorics inside a single tetrahedron.
//!
//! Edges are numbered `01, 02, 03, 12, 13, 23` as `0..6`, so edges `e` and
//! `5 - e` are opposite. Quad type `q ∈ 0..3` keeps the endpoints of edge `q`
//! (and of its opposite edge) on the same side; it therefore separates
//! `{0, q+1}` from the other two vertices. Octagon type `o` crosses edges `o`
//! and `5 - o` twice and every other edge once.
//!
//! Discs of one quad or octagon type are stacked; they are numbered outwards
//! from the side holding vertex 0. Triangles of type `v` are numbered outwards
//! from vertex `v`.

use crate::core::collections::SmallBuffer;
use smallvec::smallvec;

/// Endpoints of each edge.
pub const EDGE_VERTEX: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Vertices of each quad type, as `[a, b, c, d]` where the quad separates
/// `{a, b}` from `{c, d}` and `a = 0`.
pub const QUAD_DEFN: [[usize; 4]; 3] = [[0, 1, 2, 3], [0, 2, 1, 3], [0, 3, 1, 2]];

/// Edge number of the edge joining vertices `i` and `j` (`i ≠ j`).
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::surfaces::tables::edge_number;
///
/// assert_eq!(edge_number(2, 1), 3);
/// assert_eq!(edge_number(0, 3), 2);
/// ```
#[must_use]
pub const fn edge_number(i: usize, j: usize) -> usize {
    let (a, b) = if i < j { (i, j) } else { (j, i) };
    match (a, b) {
        (0, 1) => 0,
        (0, 2) => 1,
        (0, 3) => 2,
        (1, 2) => 3,
        (1, 3) => 4,
        _ => 5,
    }
}

/// The quad type keeping `i` and `j` on the same side.
#[must_use]
pub const fn quad_separating(i: usize, j: usize) -> usize {
    let e = edge_number(i, j);
    if e < 5 - e { e } else { 5 - e }
}

/// The two quad types separating `i` from `j`; equivalently the two quads
/// that cross edge `ij`.
#[must_use]
pub const fn quad_meeting(i: usize, j: usize) -> [usize; 2] {
    match quad_separating(i, j) {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    }
}

/// The vertex on the same side as `v` under quad type `q`.
#[must_use]
pub const fn quad_partner(q: usize, v: usize) -> usize {
    let d = QUAD_DEFN[q];
    let mut k = 0;
    while d[k] != v {
        k += 1;
    }
    d[k ^ 1]
}

/// Returns `true` if `v` lies on the same side as vertex 0 under quad (or
/// octagon) type `q`.
#[must_use]
pub const fn on_zero_side(q: usize, v: usize) -> bool {
    v == 0 || QUAD_DEFN[q][1] == v
}

/// Number of times octagon type `o` crosses edge `e`.
#[must_use]
pub const fn oct_edge_crossings(o: usize, e: usize) -> usize {
    if e == o || e == 5 - o { 2 } else { 1 }
}

/// The disc kinds with an arc at corner `v` of face `f`: the triangle at
/// `v`, the quad keeping `v` with `f`, and the two octagons that cut that
/// corner.
#[must_use]
pub const fn corner_discs(v: usize, f: usize) -> [DiscKind; 4] {
    let m = quad_meeting(v, f);
    [
        DiscKind::Triangle(v),
        DiscKind::Quad(quad_separating(v, f)),
        DiscKind::Octagon(m[0]),
        DiscKind::Octagon(m[1]),
    ]
}

/// Corners of face `f` (the face opposite vertex `f`) at which a disc of
/// the given kind has an arc. Triangles and quads have one arc per face they
/// meet; octagons have two in every face.
#[must_use]
pub fn arc_corners(kind: DiscKind, f: usize) -> SmallBuffer<usize, 2> {
    match kind {
        DiscKind::Triangle(v) => {
            if v == f {
                SmallBuffer::new()
            } else {
                smallvec![v]
            }
        }
        DiscKind::Quad(q) => smallvec![quad_partner(q, f)],
        DiscKind::Octagon(o) => {
            let partner = quad_partner(o, f);
            (0..4).filter(|&v| v != f && v != partner).collect()
        }
    }
}

/// The type of a normal or almost normal disc within one tetrahedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscKind {
    /// Triangle cutting off the given vertex.
    Triangle(usize),
    /// Quadrilateral of the given type.
    Quad(usize),
    /// Octagon of the given type.
    Octagon(usize),
}

impl DiscKind {
    /// All ten disc kinds, in coordinate order.
    pub const ALL: [Self; 10] = [
        Self::Triangle(0),
        Self::Triangle(1),
        Self::Triangle(2),
        Self::Triangle(3),
        Self::Quad(0),
        Self::Quad(1),
        Self::Quad(2),
        Self::Octagon(0),
        Self::Octagon(1),
        Self::Octagon(2),
    ];

    /// Offset of this kind in a ten-coordinate tetrahedron block.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::Triangle(v) => v,
            Self::Quad(q) => 4 + q,
            Self::Octagon(o) => 7 + o,
        }
    }

    /// Returns `true` if stacked discs of this kind are numbered outwards
    /// from vertex `v`'s side.
    #[must_use]
    pub const fn numbered_from(self, v: usize) -> bool {
        match self {
            Self::Triangle(t) => t == v,
            Self::Quad(q) | Self::Octagon(q) => on_zero_side(q, v),
        }
    }

    /// Returns `true` if the canonical normal of this disc points towards
    /// vertex `v`. Canonical normals point towards vertex `t` for triangle
    /// type `t`, and towards vertex 0's side for quads and octagons.
    #[must_use]
    pub const fn normal_towards(self, v: usize) -> bool {
        self.numbered_from(v)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_tables_agree() {
        for (e, [a, b]) in EDGE_VERTEX.iter().enumerate() {
            assert_eq!(edge_number(*a, *b), e);
            assert_eq!(edge_number(*b, *a), e);
        }
    }

    #[test]
    fn test_quad_separation() {
        assert_eq!(quad_separating(0, 1), 0);
        assert_eq!(quad_separating(2, 3), 0);
        assert_eq!(quad_separating(1, 2), 2);
        assert_eq!(quad_meeting(0, 1), [1, 2]);
        for q in 0..3 {
            for v in 0..4 {
                let p = quad_partner(q, v);
                assert_ne!(p, v);
                assert_eq!(quad_partner(q, p), v);
                assert_eq!(quad_separating(v, p), q);
            }
        }
    }

    #[test]
    fn test_arc_corners() {
        assert!(arc_corners(DiscKind::Triangle(2), 2).is_empty());
        assert_eq!(arc_corners(DiscKind::Triangle(2), 0).as_slice(), &[2]);
        // Quad 0 separates {0,1} from {2,3}: in face 0 it cuts corner 1.
        assert_eq!(arc_corners(DiscKind::Quad(0), 0).as_slice(), &[1]);
        assert_eq!(arc_corners(DiscKind::Octagon(0), 0).as_slice(), &[2, 3]);
        let total: usize = (0..4).map(|f| arc_corners(DiscKind::Octagon(1), f).len()).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_corner_discs_have_arcs_there() {
        for f in 0..4 {
            for v in (0..4).filter(|&v| v != f) {
                for kind in corner_discs(v, f) {
                    assert!(arc_corners(kind, f).contains(&v), "{kind:?} at corner {v} of face {f}");
                }
            }
        }
    }

    #[test]
    fn test_octagon_crossings_sum() {
        for o in 0..3 {
            let total: usize = (0..6).map(|e| oct_edge_crossings(o, e)).sum();
            assert_eq!(total, 8);
        }
    }
}
