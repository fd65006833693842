//! Cutting a triangulation along an embedded normal surface.
//!
//! Inside each tetrahedron the discs split the interior into blocks: one
//! layer between consecutive triangles at each vertex, and the central
//! blocks between consecutive quads. Every block is a convex cell whose
//! boundary is made of disc polygons and pieces of tetrahedron faces. Each
//! polygon is fanned from its least point and the fan is coned to an apex
//! inside the block.
//!
//! Face pieces are named canonically through the triangle class's front
//! labels, so both sides of a glued face fan the same way and their cone
//! tetrahedra can be glued. Disc pieces are left unglued and become the two
//! boundary copies of the surface.

use crate::core::collections::{FastHashMap, fast_hash_map_with_capacity};
use crate::core::perm::Perm3;
use crate::core::triangulation::Triangulation3;
use crate::error::EnumerationError;
use crate::surfaces::disc_set::DiscSet;
use crate::surfaces::tables::{DiscKind, EDGE_VERTEX, QUAD_DEFN, edge_number, on_zero_side, quad_meeting, quad_partner};
use std::collections::BTreeMap;

/// A point on the boundary of a tetrahedron: a corner, or the `k`-th
/// crossing (`1`-based) along an edge counted from its lower endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Point {
    Corner(usize),
    Cross(usize, usize),
}

/// A block of one tetrahedron: layer `l` next to vertex `v`, or the central
/// region lying above `m` quads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Block {
    Layer(usize, usize),
    Central(usize),
}

/// A vertex of a cone tetrahedron, local to its original tetrahedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Node {
    Apex(Block),
    At(Point),
}

/// A cone tetrahedron: vertex 0 is the apex, the opposite face lies on face
/// `face` of tetrahedron `tet`, or on a disc if `face` is `None`.
#[derive(Clone, Debug)]
struct Piece {
    tet: usize,
    face: Option<usize>,
    nodes: [Node; 4],
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum FaceKey {
    /// On triangle class `(tet, face)` (its front), through three canonical
    /// points.
    Triangle((usize, usize), [Point; 3]),
    /// Inside tetrahedron `tet`.
    Internal(usize, [Node; 3]),
}

struct Cutter<'a> {
    tri: &'a Triangulation3,
    set: &'a DiscSet,
}

impl Cutter<'_> {
    fn count(&self, tet: usize, kind: DiscKind) -> usize {
        self.set.count(tet, kind)
    }

    /// Number of crossings on local edge `e` of `tet`.
    fn weight(&self, tet: usize, e: usize) -> usize {
        let [a, b] = EDGE_VERTEX[e];
        self.count(tet, DiscKind::Triangle(a))
            + self.count(tet, DiscKind::Triangle(b))
            + quad_meeting(a, b)
                .iter()
                .map(|&q| self.count(tet, DiscKind::Quad(q)))
                .sum::<usize>()
    }

    /// The crossing on edge `xy` at distance `dist` from `x`.
    fn cross(&self, tet: usize, x: usize, y: usize, dist: usize) -> Point {
        let e = edge_number(x, y);
        if x < y {
            Point::Cross(e, dist)
        } else {
            Point::Cross(e, self.weight(tet, e) + 1 - dist)
        }
    }

    /// Triangle class of face `face` of `tet`, with `point` renamed into
    /// the labels of that class's front.
    fn canonical(&self, tet: usize, face: usize, point: Point) -> ((usize, usize), Point) {
        let Some((other, g)) = self.tri.adjacent(tet, face) else {
            return ((tet, face), point);
        };
        if (tet, face) <= (other, g[face]) {
            return ((tet, face), point);
        }
        let renamed = match point {
            Point::Corner(v) => Point::Corner(g[v]),
            Point::Cross(e, k) => {
                let [x, y] = EDGE_VERTEX[e];
                let (gx, gy) = (g[x], g[y]);
                let k = if gx < gy { k } else { self.weight(tet, e) + 1 - k };
                Point::Cross(edge_number(gx, gy), k)
            }
        };
        ((other, g[face]), renamed)
    }

    /// The boundary polygons of every block of `tet`, each tagged with the
    /// tetrahedron face it lies on.
    fn blocks(&self, tet: usize) -> BTreeMap<Block, Vec<(Vec<Point>, Option<usize>)>> {
        let quad = (0..3).find(|&q| self.count(tet, DiscKind::Quad(q)) > 0);
        let stacked = quad.map_or(0, |q| self.count(tet, DiscKind::Quad(q)));
        let tris = |v: usize| self.count(tet, DiscKind::Triangle(v));
        let central_at = |v: usize| match quad {
            Some(q) if !on_zero_side(q, v) => Block::Central(stacked),
            _ => Block::Central(0),
        };

        let mut blocks: BTreeMap<Block, Vec<(Vec<Point>, Option<usize>)>> = BTreeMap::new();
        let mut add = |block: Block, polygon: Vec<Point>, face: Option<usize>| {
            blocks.entry(block).or_default().push((polygon, face));
        };

        for f in 0..4 {
            let corners: Vec<usize> = (0..4).filter(|&v| v != f).collect();
            let mut middle = Vec::with_capacity(6);
            for (i, &c) in corners.iter().enumerate() {
                let prev = corners[(i + 2) % 3];
                let next = corners[(i + 1) % 3];
                let arcs = self.set.arc_count(tet, f, c);
                for p in 0..arcs {
                    let strip = if p == 0 {
                        vec![Point::Corner(c), self.cross(tet, c, next, 1), self.cross(tet, c, prev, 1)]
                    } else {
                        vec![
                            self.cross(tet, c, prev, p),
                            self.cross(tet, c, next, p),
                            self.cross(tet, c, next, p + 1),
                            self.cross(tet, c, prev, p + 1),
                        ]
                    };
                    let block = if p < tris(c) {
                        Block::Layer(c, p)
                    } else {
                        let j = p - tris(c);
                        match quad {
                            Some(q) if !on_zero_side(q, c) => Block::Central(stacked - j),
                            _ => Block::Central(j),
                        }
                    };
                    add(block, strip, Some(f));
                }
                if arcs == 0 {
                    middle.push(Point::Corner(c));
                } else {
                    middle.push(self.cross(tet, c, prev, arcs));
                    middle.push(self.cross(tet, c, next, arcs));
                }
            }
            let block = match quad {
                Some(q) if on_zero_side(q, quad_partner(q, f)) => Block::Central(stacked),
                _ => Block::Central(0),
            };
            add(block, middle, Some(f));
        }

        for v in 0..4 {
            let layers = tris(v);
            for i in 0..layers {
                let polygon: Vec<Point> = (0..4)
                    .filter(|&u| u != v)
                    .map(|u| self.cross(tet, v, u, i + 1))
                    .collect();
                add(Block::Layer(v, i), polygon.clone(), None);
                let beyond = if i + 1 < layers {
                    Block::Layer(v, i + 1)
                } else {
                    central_at(v)
                };
                add(beyond, polygon, None);
            }
        }

        if let Some(q) = quad {
            let [a, b, c, d] = QUAD_DEFN[q];
            for k in 0..stacked {
                let (da, db) = (tris(a) + k + 1, tris(b) + k + 1);
                let polygon = vec![
                    self.cross(tet, a, c, da),
                    self.cross(tet, a, d, da),
                    self.cross(tet, b, d, db),
                    self.cross(tet, b, c, db),
                ];
                add(Block::Central(k), polygon.clone(), None);
                add(Block::Central(k + 1), polygon, None);
            }
        }
        blocks
    }

    /// Cones every block of `tet` into `pieces`.
    fn cone(&self, tet: usize, pieces: &mut Vec<Piece>) {
        for (block, polygons) in self.blocks(tet) {
            for (polygon, face) in polygons {
                let start = match face {
                    Some(f) => (0..polygon.len()).min_by_key(|&i| self.canonical(tet, f, polygon[i]).1),
                    None => (0..polygon.len()).min_by_key(|&i| polygon[i]),
                }
                .unwrap_or(0);
                let mut fan = polygon;
                fan.rotate_left(start);
                for i in 1..fan.len() - 1 {
                    pieces.push(Piece {
                        tet,
                        face,
                        nodes: [
                            Node::Apex(block),
                            Node::At(fan[0]),
                            Node::At(fan[i]),
                            Node::At(fan[i + 1]),
                        ],
                    });
                }
            }
        }
    }

    /// The gluing key of face `j` of `piece` and its three nodes in face
    /// order, or `None` if that face stays boundary.
    fn face_key(&self, piece: &Piece, j: usize) -> Option<(FaceKey, [Node; 3])> {
        let mut nodes = [piece.nodes[0]; 3];
        for (slot, k) in nodes.iter_mut().zip((0..4).filter(|&k| k != j)) {
            *slot = piece.nodes[k];
        }
        if j != 0 {
            let mut sorted = nodes;
            sorted.sort_unstable();
            return Some((FaceKey::Internal(piece.tet, sorted), nodes));
        }
        let f = piece.face?;
        self.tri.adjacent(piece.tet, f)?;
        let mut class = (piece.tet, f);
        let mut ids = [Point::Corner(0); 3];
        for (id, node) in ids.iter_mut().zip(nodes) {
            let Node::At(point) = node else {
                return None;
            };
            let (c, renamed) = self.canonical(piece.tet, f, point);
            class = c;
            *id = renamed;
        }
        let mut sorted = ids;
        sorted.sort_unstable();
        Some((FaceKey::Triangle(class, sorted), ids.map(Node::At)))
    }
}

/// Cuts `tri` along the surface with disc set `set`.
///
/// # Errors
///
/// - [`EnumerationError::FailedPrecondition`] if the set holds octagons.
/// - [`EnumerationError::Internal`] if the cone tetrahedra fail to pair up,
///   which means the disc counts violate the matching equations.
pub fn cut_along(tri: &Triangulation3, set: &DiscSet) -> Result<Triangulation3, EnumerationError> {
    let n = tri.size();
    if (0..n).any(|t| (0..3).any(|o| set.count(t, DiscKind::Octagon(o)) > 0)) {
        return Err(EnumerationError::precondition("cut_along", "a surface without octagons"));
    }
    let cutter = Cutter { tri, set };
    let mut pieces = Vec::new();
    for tet in 0..n {
        cutter.cone(tet, &mut pieces);
    }

    let mut out = Triangulation3::with_simplices(pieces.len());
    let mut waiting: FastHashMap<FaceKey, (usize, usize, [Node; 3])> = fast_hash_map_with_capacity(pieces.len());
    for (index, piece) in pieces.iter().enumerate() {
        for j in 0..4 {
            let Some((key, nodes)) = cutter.face_key(piece, j) else {
                continue;
            };
            let Some((other, other_j, other_nodes)) = waiting.remove(&key) else {
                waiting.insert(key, (index, j, nodes));
                continue;
            };
            let mut images = [0_usize; 4];
            images[j] = other_j;
            let other_slots: Vec<usize> = (0..4).filter(|&k| k != other_j).collect();
            for (k, node) in (0..4).filter(|&k| k != j).zip(nodes) {
                let at = other_nodes
                    .iter()
                    .position(|&m| m == node)
                    .ok_or_else(|| EnumerationError::internal("matched faces disagree on their vertices"))?;
                images[k] = other_slots[at];
            }
            let perm = Perm3::from_images(&images).map_err(|e| EnumerationError::internal(e.to_string()))?;
            out.join(index, j, other, perm)?;
        }
    }
    if waiting.keys().any(|k| matches!(k, FaceKey::Internal(..))) {
        return Err(EnumerationError::internal("block cones did not close up"));
    }
    tracing::debug!(before = n, after = pieces.len(), "triangulation cut along surface");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::census;
    use crate::core::ray::Ray;
    use num_bigint::BigInt;

    fn set(standard: &[i64]) -> DiscSet {
        // Expand seven standard coordinates per tetrahedron to ten.
        let ray: Ray<BigInt> = standard
            .chunks(7)
            .flat_map(|c| c.iter().copied().chain([0, 0, 0]))
            .map(BigInt::from)
            .collect();
        DiscSet::new(&ray).unwrap()
    }

    fn summary(tri: &Triangulation3) -> (usize, i64, usize, usize) {
        let skeleton = tri.skeleton();
        let count = |k: usize| i64::try_from(skeleton.count_faces(k)).unwrap();
        let size = i64::try_from(tri.size()).unwrap();
        let boundary: usize = skeleton.components().iter().map(|c| c.boundary_facets()).sum();
        (
            tri.size(),
            count(0) - count(1) + count(2) - size,
            boundary,
            skeleton.components().len(),
        )
    }

    #[test]
    fn test_cut_ball_along_nothing() {
        let out = cut_along(&census::ball(), &set(&[0; 7])).unwrap();
        assert_eq!(summary(&out), (4, 1, 4, 1));
    }

    #[test]
    fn test_cut_ball_along_quad() {
        let out = cut_along(&census::ball(), &set(&[0, 0, 0, 0, 1, 0, 0])).unwrap();
        assert_eq!(out.size(), 16);
        assert_eq!(out.skeleton().components().len(), 2);
    }

    #[test]
    fn test_cut_sphere_along_vertex_link() {
        let tri = census::layered_loop(1, false).unwrap();
        let out = cut_along(&tri, &set(&[1, 1, 0, 0, 0, 0, 0])).unwrap();
        assert_eq!(summary(&out), (20, 2, 4, 2));
    }

    #[test]
    fn test_cut_along_torus() {
        let tri = census::layered_loop(1, false).unwrap();
        let out = cut_along(&tri, &set(&[0, 0, 0, 0, 1, 0, 0])).unwrap();
        assert_eq!(summary(&out), (16, 0, 4, 2));
    }

    #[test]
    fn test_cut_along_one_sided_surface() {
        let tri = census::layered_loop(2, false).unwrap();
        let out = cut_along(&tri, &set(&[0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1])).unwrap();
        assert_eq!(summary(&out), (32, 1, 8, 1));
    }

    #[test]
    fn test_rejects_octagons() {
        let ray: Ray<BigInt> = [0, 0, 0, 0, 0, 0, 0, 1, 0, 0].into_iter().map(BigInt::from).collect();
        let discs = DiscSet::new(&ray).unwrap();
        assert!(cut_along(&census::ball(), &discs).is_err());
    }
}
