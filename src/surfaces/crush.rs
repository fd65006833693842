//! Crushing a normal surface to a point.
//!
//! Every tetrahedron holding a quad is flattened away. The remaining
//! tetrahedra are reglued by walking through chains of flattened ones: a
//! flattened tetrahedron with quad type `q` identifies each face with the
//! face across the quad, so a face leaving a kept tetrahedron is followed
//! until it reaches another kept tetrahedron or the boundary.

use crate::core::perm::Perm3;
use crate::core::triangulation::Triangulation3;
use crate::error::EnumerationError;
use crate::surfaces::disc_set::DiscSet;
use crate::surfaces::tables::{DiscKind, quad_partner};

/// Where the chain leaving a face ends.
enum ChainEnd {
    Boundary,
    Glued { tet: usize, perm: Perm3 },
}

/// Crushes the surface with disc set `set` in `tri`.
///
/// # Errors
///
/// - [`EnumerationError::FailedPrecondition`] if the set holds octagons.
/// - [`EnumerationError::Internal`] if a chain fails to terminate or the
///   new gluings clash.
pub fn crush(tri: &Triangulation3, set: &DiscSet) -> Result<Triangulation3, EnumerationError> {
    let n = tri.size();
    let mut quad = Vec::with_capacity(n);
    for tet in 0..n {
        if (0..3).any(|o| set.count(tet, DiscKind::Octagon(o)) > 0) {
            return Err(EnumerationError::precondition("crush", "a surface without octagons"));
        }
        quad.push((0..3).find(|&q| set.count(tet, DiscKind::Quad(q)) > 0));
    }

    let kept: Vec<usize> = (0..n).filter(|&t| quad[t].is_none()).collect();
    let mut index = vec![usize::MAX; n];
    for (new, &old) in kept.iter().enumerate() {
        index[old] = new;
    }

    let mut out = Triangulation3::with_simplices(kept.len());
    for &tet in &kept {
        for face in 0..4 {
            if out.adjacent(index[tet], face).is_some() {
                continue;
            }
            let ChainEnd::Glued { tet: end, perm } = follow_chain(tri, &quad, tet, face)? else {
                continue;
            };
            if end == tet && perm[face] == face {
                tracing::warn!(tet, face, "crushed chain returns to its own face; leaving it as boundary");
                continue;
            }
            out.join(index[tet], face, index[end], perm)?;
        }
    }
    tracing::debug!(before = n, after = kept.len(), "surface crushed");
    Ok(out)
}

/// Follows face `face` of kept tetrahedron `tet` through flattened
/// tetrahedra.
fn follow_chain(
    tri: &Triangulation3,
    quad: &[Option<usize>],
    tet: usize,
    face: usize,
) -> Result<ChainEnd, EnumerationError> {
    let Some((mut adj, mut perm)) = tri.adjacent(tet, face) else {
        return Ok(ChainEnd::Boundary);
    };
    let limit = 4 * quad.len() + 4;
    let mut steps = 0;
    while let Some(q) = quad[adj] {
        let entry = perm[face];
        let swap = Perm3::transposition(entry, quad_partner(q, entry));
        let exit = swap[entry];
        let Some((next, gluing)) = tri.adjacent(adj, exit) else {
            return Ok(ChainEnd::Boundary);
        };
        perm = gluing.compose(&swap.compose(&perm));
        adj = next;
        steps += 1;
        if steps > limit {
            return Err(EnumerationError::internal(format!(
                "chain from face {face} of tetrahedron {tet} does not terminate"
            )));
        }
    }
    Ok(ChainEnd::Glued { tet: adj, perm })
}
