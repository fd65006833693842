//! Normal coordinate systems.
//!
//! [`NormalCoords`] names a system; [`NormalCoords::system`] returns the
//! matching [`CoordinateSystem`], which builds the matching equations,
//! admissibility constraints and tree traversal layout for a triangulation.
//!
//! Every system stores one block of coordinates per tetrahedron:
//!
//! | system | block |
//! |---|---|
//! | `Standard` | `t0..t3, q0..q2` |
//! | `Quad` | `q0..q2` |
//! | `AlmostNormal` | `t0..t3, q0..q2, o0..o2` |
//! | `QuadOct` | `q0..q2, o0..o2` |
//! | `QuadOriented` | `q0+, q0-, q1+, q1-, q2+, q2-` |
//! | `StandardOriented` | `t0+, t0-, ..., t3-, q0+, ..., q2-` |
//!
//! In the oriented systems `+` is the canonical transverse orientation (see
//! [`DiscKind::normal_towards`]) and `-` the opposite one.

use crate::core::collections::SmallBuffer;
use crate::core::matrix::MatrixInt;
use crate::core::triangulation::Triangulation3;
use crate::enumerate::tree::traversal::TreeLayout;
use crate::enumerate::validity::ValidityConstraints;
use crate::error::EnumerationError;
use crate::surfaces::tables::{DiscKind, corner_discs, quad_meeting, quad_separating};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use std::fmt;

/// The coordinate system a normal surface vector is expressed in.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::surfaces::coords::NormalCoords;
///
/// assert_eq!(NormalCoords::Quad.system().per_tetrahedron(), 3);
/// assert_eq!(NormalCoords::Quad.standard_counterpart(), NormalCoords::Standard);
/// assert!(NormalCoords::QuadOct.allows_almost_normal());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NormalCoords {
    /// Triangle and quad coordinates.
    #[default]
    Standard,
    /// Quad coordinates only.
    Quad,
    /// Triangle, quad and octagon coordinates.
    AlmostNormal,
    /// Quad and octagon coordinates.
    QuadOct,
    /// Transversely oriented quad coordinates.
    QuadOriented,
    /// Transversely oriented triangle and quad coordinates.
    StandardOriented,
}

impl NormalCoords {
    /// Every coordinate system.
    pub const ALL: [Self; 6] = [
        Self::Standard,
        Self::Quad,
        Self::AlmostNormal,
        Self::QuadOct,
        Self::QuadOriented,
        Self::StandardOriented,
    ];

    /// The implementation of this system.
    #[must_use]
    pub fn system(self) -> &'static dyn CoordinateSystem {
        match self {
            Self::Standard => &StandardCoords,
            Self::Quad => &QuadCoords,
            Self::AlmostNormal => &AlmostNormalCoords,
            Self::QuadOct => &QuadOctCoords,
            Self::QuadOriented => &QuadOrientedCoords,
            Self::StandardOriented => &StandardOrientedCoords,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.system().name()
    }

    /// Returns `true` if triangle coordinates are not stored.
    #[must_use]
    pub fn is_quad_only(self) -> bool {
        self.system().is_quad_only()
    }

    /// Returns `true` if octagons are allowed.
    #[must_use]
    pub fn allows_almost_normal(self) -> bool {
        self.system().allows_almost_normal()
    }

    /// Returns `true` if discs carry a transverse orientation.
    #[must_use]
    pub fn allows_oriented(self) -> bool {
        self.system().allows_oriented()
    }

    /// The system with triangle coordinates restored.
    #[must_use]
    pub fn standard_counterpart(self) -> Self {
        self.system().standard_counterpart()
    }

    /// The system with triangle coordinates dropped.
    #[must_use]
    pub fn reduced_counterpart(self) -> Self {
        self.system().reduced_counterpart()
    }
}

impl fmt::Display for NormalCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour shared by all coordinate systems.
///
/// Column numbers returned by [`columns`](Self::columns) and
/// [`oriented_column`](Self::oriented_column) are offsets within one
/// tetrahedron's block; coordinate `k` of tetrahedron `t` lives at
/// `t * per_tetrahedron() + k`.
pub trait CoordinateSystem: fmt::Debug + Send + Sync {
    /// The tag naming this system.
    fn coords(&self) -> NormalCoords;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Coordinates per tetrahedron.
    fn per_tetrahedron(&self) -> usize;

    /// Total coordinate count for `tri`.
    fn dimension(&self, tri: &Triangulation3) -> usize {
        self.per_tetrahedron() * tri.size()
    }

    /// Returns `true` if triangle coordinates are not stored.
    fn is_quad_only(&self) -> bool;

    /// Returns `true` if octagons are allowed.
    fn allows_almost_normal(&self) -> bool;

    /// Returns `true` if discs carry a transverse orientation.
    fn allows_oriented(&self) -> bool;

    /// The system with triangle coordinates restored.
    fn standard_counterpart(&self) -> NormalCoords;

    /// The system with triangle coordinates dropped.
    fn reduced_counterpart(&self) -> NormalCoords;

    /// Block offsets holding discs of `kind`, over all orientations. Empty if
    /// the system does not store that kind.
    fn columns(&self, kind: DiscKind) -> SmallBuffer<usize, 2>;

    /// Block offset holding discs of `kind` with orientation `o` (`0` for
    /// canonical, `1` for reversed). `None` in unoriented systems.
    fn oriented_column(&self, kind: DiscKind, o: usize) -> Option<usize>;

    /// The matching equations, one primitive row each.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError::ArithmeticOverflow`] if a row cannot be
    /// normalised, which does not happen for valid input.
    fn equations(&self, tri: &Triangulation3) -> Result<MatrixInt<i64>, EnumerationError>;

    /// The admissibility constraints.
    fn constraints(&self, tri: &Triangulation3) -> ValidityConstraints;

    /// The type layout for tree traversal, or `None` if the system does not
    /// support it.
    fn tree_layout(&self, tri: &Triangulation3) -> Option<TreeLayout>;

    /// The Euler characteristic as a linear form on compact surfaces, if the
    /// system stores triangles.
    fn euler_row(&self, tri: &Triangulation3) -> Option<Vec<i64>>;

    /// Rows kept in place at the head of the matrix by double description.
    fn initial_rows(&self, _tri: &Triangulation3) -> usize {
        0
    }
}

// =============================================================================
// LAYOUTS
// =============================================================================

/// How a system lays out its block.
#[derive(Clone, Copy, Debug)]
struct Layout {
    coords: NormalCoords,
    name: &'static str,
    triangles: bool,
    octagons: bool,
    oriented: bool,
}

impl Layout {
    const fn per_tetrahedron(&self) -> usize {
        let quads = if self.octagons { 6 } else { 3 };
        let tris = if self.triangles { 4 } else { 0 };
        if self.oriented { 2 * (quads + tris) } else { quads + tris }
    }

    const fn quad_base(&self) -> usize {
        match (self.triangles, self.oriented) {
            (false, _) => 0,
            (true, false) => 4,
            (true, true) => 8,
        }
    }

    fn columns(&self, kind: DiscKind) -> SmallBuffer<usize, 2> {
        let base = self.quad_base();
        match kind {
            DiscKind::Triangle(v) if self.triangles => {
                if self.oriented {
                    smallvec![2 * v, 2 * v + 1]
                } else {
                    smallvec![v]
                }
            }
            DiscKind::Quad(q) => {
                if self.oriented {
                    smallvec![base + 2 * q, base + 2 * q + 1]
                } else {
                    smallvec![base + q]
                }
            }
            DiscKind::Octagon(o) if self.octagons => smallvec![base + 3 + o],
            _ => SmallBuffer::new(),
        }
    }

    const fn oriented_column(&self, kind: DiscKind, o: usize) -> Option<usize> {
        if !self.oriented || o > 1 {
            return None;
        }
        match kind {
            DiscKind::Triangle(v) if self.triangles => Some(2 * v + o),
            DiscKind::Quad(q) => Some(self.quad_base() + 2 * q + o),
            _ => None,
        }
    }

    /// Adds `sign` times the arcs at corner `v` of face `f` of `tet`. For an
    /// oriented layout `towards` selects the discs whose normal points towards
    /// (`true`) or away from (`false`) the corner.
    fn add_corner(&self, row: &mut [i64], tet: usize, v: usize, f: usize, towards: Option<bool>, sign: i64) {
        let block = tet * self.per_tetrahedron();
        for kind in corner_discs(v, f) {
            match towards {
                Some(dir) => {
                    let o = usize::from(kind.normal_towards(v) != dir);
                    if let Some(c) = self.oriented_column(kind, o) {
                        row[block + c] += sign;
                    }
                }
                None => {
                    for c in self.columns(kind) {
                        row[block + c] += sign;
                    }
                }
            }
        }
    }

    fn directions(&self) -> &'static [Option<bool>] {
        if self.oriented {
            &[Some(true), Some(false)]
        } else {
            &[None]
        }
    }

    /// Arc matching across every internal triangle.
    fn triangle_rows(&self, tri: &Triangulation3) -> Vec<Vec<i64>> {
        let dim = self.per_tetrahedron() * tri.size();
        let skeleton = tri.skeleton();
        let mut rows = Vec::new();
        for face in skeleton.triangles() {
            if face.is_boundary() {
                continue;
            }
            let front = face.front();
            let (t, i) = (front.simplex(), front.face());
            let Some((t2, g)) = tri.adjacent(t, i) else {
                continue;
            };
            for v in (0..4).filter(|&v| v != i) {
                for &dir in self.directions() {
                    let mut row = vec![0_i64; dim];
                    self.add_corner(&mut row, t, v, i, dir, 1);
                    self.add_corner(&mut row, t2, g[v], g[i], dir, -1);
                    rows.push(row);
                }
            }
        }
        rows
    }

    /// Triangle cancellation around every internal edge.
    fn edge_rows(&self, tri: &Triangulation3) -> Vec<Vec<i64>> {
        let dim = self.per_tetrahedron() * tri.size();
        let skeleton = tri.skeleton();
        let ends: &[(usize, Option<bool>)] = if self.oriented {
            &[(0, Some(true)), (1, Some(true))]
        } else {
            &[(0, None)]
        };
        let mut rows = Vec::new();
        for edge in skeleton.edges() {
            if edge.is_boundary() {
                continue;
            }
            for &(end, dir) in ends {
                let mut row = vec![0_i64; dim];
                for emb in edge.embeddings() {
                    let p = emb.vertices();
                    self.add_corner(&mut row, emb.simplex(), p[end], p[2], dir, 1);
                    self.add_corner(&mut row, emb.simplex(), p[end], p[3], dir, -1);
                }
                rows.push(row);
            }
        }
        rows
    }

    fn equations(&self, tri: &Triangulation3) -> Result<MatrixInt<i64>, EnumerationError> {
        let rows = if self.triangles {
            self.triangle_rows(tri)
        } else {
            self.edge_rows(tri)
        };
        let mut m = MatrixInt::from_rows(
            self.per_tetrahedron() * tri.size(),
            rows.into_iter().filter(|r| r.iter().any(|&x| x != 0)).collect(),
        );
        for r in 0..m.rows() {
            m.make_row_primitive(r)?;
        }
        Ok(m)
    }

    fn constraints(&self, tri: &Triangulation3) -> ValidityConstraints {
        let base = self.quad_base();
        let mut c = ValidityConstraints::new(self.per_tetrahedron(), tri.size());
        if self.oriented {
            for i in 0..3 {
                for j in i + 1..3 {
                    for a in 0..2 {
                        for b in 0..2 {
                            c.add_local(&[base + 2 * i + a, base + 2 * j + b]);
                        }
                    }
                }
            }
        } else if self.octagons {
            c.add_local(&[base, base + 1, base + 2, base + 3, base + 4, base + 5]);
            c.add_global(&[base + 3, base + 4, base + 5]);
        } else {
            c.add_local(&[base, base + 1, base + 2]);
        }
        c
    }

    fn tree_layout(&self, tri: &Triangulation3) -> Option<TreeLayout> {
        if self.oriented {
            return None;
        }
        let base = self.quad_base();
        Some(TreeLayout {
            tetrahedra: tri.size(),
            block: self.per_tetrahedron(),
            quad_offset: base,
            oct_offset: self.octagons.then_some(base + 3),
            triangle_offset: self.triangles.then_some(0),
        })
    }

    fn euler_row(&self, tri: &Triangulation3) -> Option<Vec<i64>> {
        if !self.triangles {
            return None;
        }
        let per = self.per_tetrahedron();
        let discs = disc_euler_row(tri);
        let mut row = vec![0_i64; per * tri.size()];
        for t in 0..tri.size() {
            for kind in DiscKind::ALL {
                for c in self.columns(kind) {
                    row[t * per + c] += discs[10 * t + kind.offset()];
                }
            }
        }
        Some(row)
    }
}

/// The Euler characteristic `V - E + F` of a compact surface as a linear form
/// over ten disc coordinates per tetrahedron (see [`DiscKind::offset`]).
///
/// Each disc is one face. Each arc class in a triangle of the triangulation
/// is one edge, counted once at the triangle's first embedding; each point
/// where the surface crosses an edge is one vertex, counted once at the
/// edge's first embedding.
#[must_use]
pub fn disc_euler_row(tri: &Triangulation3) -> Vec<i64> {
    let mut row = vec![1_i64; 10 * tri.size()];
    let skeleton = tri.skeleton();
    for face in skeleton.triangles() {
        let front = face.front();
        let (t, f) = (front.simplex(), front.face());
        for v in (0..4).filter(|&v| v != f) {
            for kind in corner_discs(v, f) {
                row[10 * t + kind.offset()] -= 1;
            }
        }
    }
    for edge in skeleton.edges() {
        let front = edge.front();
        let (t, p) = (front.simplex(), front.vertices());
        let (a, b) = (p[0], p[1]);
        row[10 * t + a] += 1;
        row[10 * t + b] += 1;
        for q in quad_meeting(a, b) {
            row[10 * t + 4 + q] += 1;
        }
        for o in 0..3 {
            row[10 * t + 7 + o] += if o == quad_separating(a, b) { 2 } else { 1 };
        }
    }
    row
}

macro_rules! coordinate_system {
    ($(#[$meta:meta])* $ty:ident, $layout:expr, $standard:ident, $reduced:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $ty;

        impl $ty {
            const LAYOUT: Layout = $layout;
        }

        impl CoordinateSystem for $ty {
            fn coords(&self) -> NormalCoords {
                Self::LAYOUT.coords
            }

            fn name(&self) -> &'static str {
                Self::LAYOUT.name
            }

            fn per_tetrahedron(&self) -> usize {
                Self::LAYOUT.per_tetrahedron()
            }

            fn is_quad_only(&self) -> bool {
                !Self::LAYOUT.triangles
            }

            fn allows_almost_normal(&self) -> bool {
                Self::LAYOUT.octagons
            }

            fn allows_oriented(&self) -> bool {
                Self::LAYOUT.oriented
            }

            fn standard_counterpart(&self) -> NormalCoords {
                NormalCoords::$standard
            }

            fn reduced_counterpart(&self) -> NormalCoords {
                NormalCoords::$reduced
            }

            fn columns(&self, kind: DiscKind) -> SmallBuffer<usize, 2> {
                Self::LAYOUT.columns(kind)
            }

            fn oriented_column(&self, kind: DiscKind, o: usize) -> Option<usize> {
                Self::LAYOUT.oriented_column(kind, o)
            }

            fn equations(&self, tri: &Triangulation3) -> Result<MatrixInt<i64>, EnumerationError> {
                Self::LAYOUT.equations(tri)
            }

            fn constraints(&self, tri: &Triangulation3) -> ValidityConstraints {
                Self::LAYOUT.constraints(tri)
            }

            fn tree_layout(&self, tri: &Triangulation3) -> Option<TreeLayout> {
                Self::LAYOUT.tree_layout(tri)
            }

            fn euler_row(&self, tri: &Triangulation3) -> Option<Vec<i64>> {
                Self::LAYOUT.euler_row(tri)
            }
        }
    };
}

coordinate_system!(
    /// Standard normal coordinates: four triangles and three quads.
    StandardCoords,
    Layout {
        coords: NormalCoords::Standard,
        name: "Standard normal (tri-quad)",
        triangles: true,
        octagons: false,
        oriented: false,
    },
    Standard,
    Quad
);

coordinate_system!(
    /// Quad coordinates: three quads per tetrahedron.
    QuadCoords,
    Layout {
        coords: NormalCoords::Quad,
        name: "Quad normal",
        triangles: false,
        octagons: false,
        oriented: false,
    },
    Standard,
    Quad
);

coordinate_system!(
    /// Standard almost normal coordinates: triangles, quads and octagons.
    AlmostNormalCoords,
    Layout {
        coords: NormalCoords::AlmostNormal,
        name: "Standard almost normal (tri-quad-oct)",
        triangles: true,
        octagons: true,
        oriented: false,
    },
    AlmostNormal,
    QuadOct
);

coordinate_system!(
    /// Quad-oct coordinates: quads and octagons.
    QuadOctCoords,
    Layout {
        coords: NormalCoords::QuadOct,
        name: "Quad-oct almost normal",
        triangles: false,
        octagons: true,
        oriented: false,
    },
    AlmostNormal,
    QuadOct
);

coordinate_system!(
    /// Transversely oriented quad coordinates.
    QuadOrientedCoords,
    Layout {
        coords: NormalCoords::QuadOriented,
        name: "Transversely oriented quad normal",
        triangles: false,
        octagons: false,
        oriented: true,
    },
    StandardOriented,
    QuadOriented
);

coordinate_system!(
    /// Transversely oriented standard coordinates.
    StandardOrientedCoords,
    Layout {
        coords: NormalCoords::StandardOriented,
        name: "Transversely oriented standard normal",
        triangles: true,
        octagons: false,
        oriented: true,
    },
    StandardOriented,
    QuadOriented
);

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::census;
    use crate::core::ray::Ray;

    /// Standard vector with one triangle at each listed `(tet, vertex)`.
    fn standard_link(corners: impl Iterator<Item = (usize, usize)>, size: usize) -> Vec<i64> {
        let mut v = vec![0; 7 * size];
        for (tet, vertex) in corners {
            v[7 * tet + vertex] += 1;
        }
        v
    }

    fn satisfies(m: &MatrixInt<i64>, v: &[i64]) -> bool {
        m.iter_rows()
            .all(|row| row.iter().zip(v).map(|(a, b)| a * b).sum::<i64>() == 0)
    }

    #[test]
    fn test_block_sizes() {
        let sizes: Vec<usize> = NormalCoords::ALL
            .iter()
            .map(|c| c.system().per_tetrahedron())
            .collect();
        assert_eq!(sizes, vec![7, 3, 10, 6, 6, 14]);
        for c in NormalCoords::ALL {
            assert_eq!(c.system().coords(), c);
            assert_eq!(c.standard_counterpart().reduced_counterpart(), c.reduced_counterpart());
        }
    }

    #[test]
    fn test_ball_has_no_equations() {
        let tri = census::ball();
        for c in NormalCoords::ALL {
            let m = c.system().equations(&tri).unwrap();
            assert_eq!(m.rows(), 0, "{c}");
            assert_eq!(m.cols(), c.system().per_tetrahedron());
        }
    }

    #[test]
    fn test_vertex_links_satisfy_standard_equations() {
        // C~(1) has a single vertex: its link has every triangle once.
        let tri = census::layered_loop(1, true).unwrap();
        assert_eq!(tri.skeleton().vertices().len(), 1);
        let m = NormalCoords::Standard.system().equations(&tri).unwrap();
        assert!(m.rows() > 0);
        assert!(satisfies(&m, &[1, 1, 1, 1, 0, 0, 0]));
        assert!(!satisfies(&m, &[1, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_each_vertex_link_of_two_vertex_sphere() {
        let tri = census::layered_loop(1, false).unwrap();
        let m = NormalCoords::Standard.system().equations(&tri).unwrap();
        let row = NormalCoords::Standard.system().euler_row(&tri).unwrap();
        let skeleton = tri.skeleton();
        assert_eq!(skeleton.vertices().len(), 2);
        for vertex in skeleton.vertices() {
            let links = standard_link(vertex.embeddings().iter().map(|e| (e.simplex(), e.face())), tri.size());
            assert!(satisfies(&m, &links));
            let chi: i64 = row.iter().zip(&links).map(|(a, b)| a * b).sum();
            assert_eq!(chi, 2);
        }
    }

    #[test]
    fn test_quad_rows_are_primitive() {
        let tri = census::layered_lens_space(5, 2).unwrap();
        let m = NormalCoords::Quad.system().equations(&tri).unwrap();
        for r in 0..m.rows() {
            let ray: Ray<i64> = m.row(r).iter().copied().collect();
            assert_eq!(ray.content().unwrap(), 1);
        }
    }

    #[test]
    fn test_oriented_columns() {
        let sys = NormalCoords::StandardOriented.system();
        assert_eq!(sys.columns(DiscKind::Triangle(3)).as_slice(), &[6, 7]);
        assert_eq!(sys.oriented_column(DiscKind::Quad(2), 1), Some(13));
        assert_eq!(sys.oriented_column(DiscKind::Octagon(0), 0), None);
        assert_eq!(NormalCoords::Quad.system().oriented_column(DiscKind::Quad(0), 0), None);
    }

    #[test]
    fn test_constraints() {
        let tri = census::ball();
        let oct = NormalCoords::AlmostNormal.system().constraints(&tri);
        assert_eq!(oct.sets(), vec![vec![4, 5, 6, 7, 8, 9], vec![7, 8, 9]]);
        let oriented = NormalCoords::QuadOriented.system().constraints(&tri);
        assert_eq!(oriented.sets().len(), 12);
        assert!(oriented.is_admissible(&Ray::from(vec![1_i64, 1, 0, 0, 0, 0])));
        assert!(!oriented.is_admissible(&Ray::from(vec![1_i64, 0, 0, 1, 0, 0])));
    }

    #[test]
    fn test_tree_layouts() {
        let tri = census::ball();
        let layout = NormalCoords::AlmostNormal.system().tree_layout(&tri).unwrap();
        assert_eq!((layout.block, layout.quad_offset), (10, 4));
        assert_eq!(layout.oct_offset, Some(7));
        assert_eq!(layout.triangle_offset, Some(0));
        assert!(NormalCoords::QuadOriented.system().tree_layout(&tri).is_none());
    }

    #[test]
    fn test_euler_form_on_single_discs() {
        // Every disc alone in a single tetrahedron is a disc: χ = 1.
        let row = disc_euler_row(&census::ball());
        assert_eq!(row, vec![1; 10]);
        let std = NormalCoords::Standard.system().euler_row(&census::ball()).unwrap();
        assert_eq!(std, vec![1; 7]);
        assert!(NormalCoords::Quad.system().euler_row(&census::ball()).is_none());
    }

    #[test]
    fn test_euler_of_vertex_link_is_two() {
        let tri = census::layered_loop(1, true).unwrap();
        let row = NormalCoords::Standard.system().euler_row(&tri).unwrap();
        let chi: i64 = row.iter().zip([1, 1, 1, 1, 0, 0, 0]).map(|(a, b)| a * b).sum();
        assert_eq!(chi, 2);
    }
}
