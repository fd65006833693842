//! Standard example triangulations.
//!
//! Small, deterministic 3-manifold triangulations with well-known normal
//! surface counts. They serve as fixtures for tests and benchmarks.
//!
//! | constructor | manifold |
//! |---|---|
//! | [`ball`] | a single tetrahedron, all faces boundary |
//! | [`layered_loop`] | `S² × S¹`-type and twisted layered loops `C(n)`, `C~(n)` |
//! | [`layered_solid_torus`] | the layered solid torus `LST(a, b, a + b)` |
//! | [`layered_lens_space`] | the lens space `L(p, q)` |
//! | [`figure_eight`] | the ideal figure eight knot complement |
//! | [`gieseking`] | the ideal, non-orientable Gieseking manifold |
//! | [`twisted_kxi`] | a twisted `K × I` with boundary |

use crate::core::perm::Perm3;
use crate::core::triangulation::{Triangulation3, TriangulationError};
use num_integer::Integer;

fn perm(images: [usize; 4]) -> Result<Perm3, TriangulationError> {
    Ok(Perm3::from_images(&images)?)
}

/// A single tetrahedron with no gluings.
#[must_use]
pub fn ball() -> Triangulation3 {
    Triangulation3::with_simplices(1)
}

/// The layered loop on `n` tetrahedra.
///
/// Consecutive tetrahedra share two faces; the last is glued back to the
/// first either directly (`C(n)`) or with a twist (`C~(n)`). `C(1)` is the
/// one-tetrahedron 3-sphere.
///
/// # Errors
///
/// Returns [`TriangulationError::InvalidParameters`] if `n == 0`.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::census::layered_loop;
///
/// let s3 = layered_loop(1, false)?;
/// assert!(s3.skeleton().is_closed());
/// assert_eq!(layered_loop(5, true)?.size(), 5);
/// # Ok::<(), normal_surfaces::core::triangulation::TriangulationError>(())
/// ```
pub fn layered_loop(n: usize, twisted: bool) -> Result<Triangulation3, TriangulationError> {
    if n == 0 {
        return Err(TriangulationError::InvalidParameters {
            construction: "layered loop",
            reason: "needs at least one tetrahedron".to_owned(),
        });
    }
    let mut tri = Triangulation3::with_simplices(n);
    let across = perm([1, 0, 2, 3])?;
    let along = perm([0, 1, 3, 2])?;
    for i in 0..n - 1 {
        tri.join(i, 0, i + 1, across)?;
        tri.join(i, 3, i + 1, along)?;
    }
    if twisted {
        tri.join(n - 1, 0, 0, perm([2, 3, 1, 0])?)?;
        tri.join(n - 1, 3, 0, perm([3, 2, 0, 1])?)?;
    } else {
        tri.join(n - 1, 0, 0, across)?;
        tri.join(n - 1, 3, 0, along)?;
    }
    Ok(tri)
}

/// Boundary edge of a layered solid torus: a representative `(tet, local edge)`
/// and the number of times the meridian disc cuts it.
#[derive(Clone, Copy, Debug)]
struct BoundaryEdge {
    tet: usize,
    edge: usize,
    cuts: u64,
}

/// Layers a new tetrahedron over the boundary edge containing local edge
/// `edge` of `tet`. The new edge is local edge 5 of the new tetrahedron.
fn layer_on(tri: &mut Triangulation3, tet: usize, edge: usize) -> Result<usize, TriangulationError> {
    let (first, last) = boundary_edge_ends(tri, tet, edge)?;
    let new = tri.add_simplex();
    tri.join(new, 3, first.0, first.1)?;
    tri.join(new, 2, last.0, last.1)?;
    Ok(new)
}

/// First and last embeddings of a boundary edge, in walk order.
fn boundary_edge_ends(
    tri: &Triangulation3,
    tet: usize,
    edge: usize,
) -> Result<((usize, Perm3), (usize, Perm3)), TriangulationError> {
    let skeleton = tri.skeleton();
    let face = skeleton
        .face_of(1, tet, edge)
        .filter(|f| f.is_boundary())
        .ok_or_else(|| TriangulationError::InvalidParameters {
            construction: "layering",
            reason: format!("edge {edge} of tetrahedron {tet} is not a boundary edge"),
        })?;
    let embeddings = face.embeddings();
    let first = embeddings[0];
    let last = embeddings[embeddings.len() - 1];
    Ok((
        (first.simplex(), first.vertices()),
        (last.simplex(), last.vertices()),
    ))
}

/// Builds `LST(a, b, a + b)` and reports its three boundary edges.
fn build_lst(a: u64, b: u64) -> Result<(Triangulation3, [BoundaryEdge; 3]), TriangulationError> {
    let invalid = |reason: &str| TriangulationError::InvalidParameters {
        construction: "layered solid torus",
        reason: reason.to_owned(),
    };
    if a.gcd(&b) != 1 {
        return Err(invalid("parameters must be coprime"));
    }

    // Reverse Euclid: the cut counts layered over, from LST(1, 2, 3) upwards.
    let mut steps = Vec::new();
    let (mut x, mut y) = (a.min(b), a.max(b));
    while (x, y) != (1, 2) {
        match (x, y) {
            (1, 1) => {
                steps.push(3);
                (x, y) = (1, 2);
            }
            (0, 1) => {
                steps.push(2);
                (x, y) = (1, 1);
            }
            _ => {
                steps.push(y - x);
                (x, y) = ((y - x).min(x), (y - x).max(x));
            }
        }
    }

    let mut tri = Triangulation3::with_simplices(1);
    tri.join(0, 0, 0, perm([1, 2, 3, 0])?)?;
    let skeleton = tri.skeleton();
    let mut edges = [BoundaryEdge {
        tet: 0,
        edge: 0,
        cuts: 0,
    }; 3];
    for (slot, face) in edges.iter_mut().zip(skeleton.edges()) {
        let front = face.front();
        *slot = BoundaryEdge {
            tet: front.simplex(),
            edge: front.face(),
            cuts: match face.degree() {
                1 => 3,
                2 => 2,
                _ => 1,
            },
        };
    }

    for &cut in steps.iter().rev() {
        let target = edges
            .iter()
            .position(|e| e.cuts == cut)
            .ok_or_else(|| invalid("no boundary edge with the required cut count"))?;
        let max = edges.iter().map(|e| e.cuts).max().unwrap_or(0);
        let others: Vec<u64> = (0..3).filter(|&i| i != target).map(|i| edges[i].cuts).collect();
        let new = layer_on(&mut tri, edges[target].tet, edges[target].edge)?;
        edges[target] = BoundaryEdge {
            tet: new,
            edge: 5,
            cuts: if cut == max {
                others[0].abs_diff(others[1])
            } else {
                others[0] + others[1]
            },
        };
    }
    Ok((tri, edges))
}

/// The layered solid torus `LST(a, b, a + b)`.
///
/// # Errors
///
/// Returns [`TriangulationError::InvalidParameters`] unless `gcd(a, b) = 1`.
pub fn layered_solid_torus(a: u64, b: u64) -> Result<Triangulation3, TriangulationError> {
    build_lst(a, b).map(|(tri, _)| tri)
}

/// The layered lens space `L(p, q)`, obtained by folding the boundary of a
/// layered solid torus along its edge with `p − 2q` cuts.
///
/// # Errors
///
/// Returns [`TriangulationError::InvalidParameters`] unless `p ≥ 2` and
/// `gcd(p, q) = 1`.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::census::layered_lens_space;
///
/// let lens = layered_lens_space(8, 3)?;
/// let skeleton = lens.skeleton();
/// assert!(skeleton.is_closed());
/// assert_eq!(skeleton.vertices().len(), 1);
/// # Ok::<(), normal_surfaces::core::triangulation::TriangulationError>(())
/// ```
pub fn layered_lens_space(p: u64, q: u64) -> Result<Triangulation3, TriangulationError> {
    if p < 2 || p.gcd(&q) != 1 {
        return Err(TriangulationError::InvalidParameters {
            construction: "layered lens space",
            reason: format!("L({p}, {q}) needs p >= 2 and gcd(p, q) = 1"),
        });
    }
    let q = q % p;
    let q = q.min(p - q);
    let a = p - 2 * q;
    let (mut tri, edges) = build_lst(a, q)?;
    let fold = edges
        .iter()
        .find(|e| e.cuts == a)
        .ok_or_else(|| TriangulationError::InvalidParameters {
            construction: "layered lens space",
            reason: format!("no boundary edge with {a} cuts"),
        })?;
    let ((t0, p0), (tk, pk)) = boundary_edge_ends(&tri, fold.tet, fold.edge)?;
    let sigma = [0, 1, 3, 2];
    let mut images = [0; 4];
    for i in 0..4 {
        images[p0.image(i)] = pk.image(sigma[i]);
    }
    tri.join(t0, p0.image(3), tk, perm(images)?)?;
    Ok(tri)
}

/// The two-tetrahedron ideal triangulation of the figure eight knot complement.
///
/// # Errors
///
/// Never fails in practice; the error type is shared with the other builders.
pub fn figure_eight() -> Result<Triangulation3, TriangulationError> {
    Triangulation3::from_gluings(
        2,
        &[
            (0, 0, 1, perm([1, 3, 0, 2])?),
            (0, 1, 1, perm([2, 0, 3, 1])?),
            (0, 2, 1, perm([0, 3, 2, 1])?),
            (0, 3, 1, perm([2, 1, 0, 3])?),
        ],
    )
}

/// The one-tetrahedron Gieseking manifold.
///
/// # Errors
///
/// Never fails in practice; the error type is shared with the other builders.
pub fn gieseking() -> Result<Triangulation3, TriangulationError> {
    Triangulation3::from_gluings(
        1,
        &[(0, 0, 0, perm([1, 2, 0, 3])?), (0, 2, 0, perm([0, 2, 3, 1])?)],
    )
}

/// A three-tetrahedron twisted `K × I` with two boundary faces.
///
/// # Errors
///
/// Never fails in practice; the error type is shared with the other builders.
pub fn twisted_kxi() -> Result<Triangulation3, TriangulationError> {
    Triangulation3::from_gluings(
        3,
        &[
            (0, 0, 1, Perm3::identity()),
            (0, 1, 2, perm([2, 1, 0, 3])?),
            (0, 2, 2, perm([1, 3, 2, 0])?),
            (1, 1, 2, perm([0, 3, 2, 1])?),
            (1, 2, 2, perm([3, 1, 0, 2])?),
        ],
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::skeleton::VertexLink;

    #[test]
    fn test_layered_loops_are_closed() {
        for n in 1..=4 {
            for twisted in [false, true] {
                let tri = layered_loop(n, twisted).unwrap();
                let sk = tri.skeleton();
                assert!(sk.is_valid(), "C({n}), twisted = {twisted}");
                assert!(!sk.has_boundary_facets());
            }
        }
        assert!(layered_loop(0, false).is_err());
    }

    #[test]
    fn test_layered_solid_torus_has_torus_boundary() {
        let tri = layered_solid_torus(3, 5).unwrap();
        let sk = tri.skeleton();
        assert!(sk.is_valid());
        assert_eq!(sk.boundary_components().len(), 1);
        assert_eq!(sk.vertices().len(), 1);
        assert_eq!(sk.vertices()[0].link(), Some(VertexLink::Disc));
        assert!(layered_solid_torus(2, 4).is_err());
    }

    #[test]
    fn test_lens_spaces_are_one_vertex_closed() {
        for (p, q) in [(4, 1), (5, 2), (7, 2), (8, 3), (13, 3), (21, 8)] {
            let tri = layered_lens_space(p, q).unwrap();
            let sk = tri.skeleton();
            assert!(sk.is_closed(), "L({p}, {q})");
            assert!(sk.is_orientable(), "L({p}, {q})");
            assert_eq!(sk.vertices().len(), 1, "L({p}, {q})");
            assert_eq!(sk.vertices()[0].link(), Some(VertexLink::Sphere));
        }
        assert!(layered_lens_space(6, 2).is_err());
        assert!(layered_lens_space(1, 0).is_err());
    }

    #[test]
    fn test_fixed_census_shapes() {
        assert_eq!(figure_eight().unwrap().size(), 2);
        assert!(gieseking().unwrap().skeleton().is_ideal());
        let kxi = twisted_kxi().unwrap();
        assert!(kxi.skeleton().has_boundary_facets());
        assert!(!kxi.skeleton().is_orientable());
    }
}
