//! Conversion between standard-type and reduced (quad-type) coordinates.
//!
//! Dropping triangle coordinates is a projection. Going back is only defined
//! up to vertex links: [`quad_to_standard_canonical`] rebuilds the triangles
//! around each vertex and shifts them so that no vertex link can be removed.
//! [`quad_to_standard_vertices`] turns the vertex rays of the reduced cone
//! into the vertex rays of the standard cone, adding vertex links one vertex
//! at a time.

use crate::core::bitmask::Bitmask;
use crate::core::collections::FastHashMap;
use crate::core::integer::{IntegerBackend, IntegerOverflow};
use crate::core::matrix::MatrixInt;
use crate::core::progress::ProgressTracker;
use crate::core::ray::Ray;
use crate::core::triangulation::Triangulation3;
use crate::error::EnumerationError;
use crate::surfaces::coords::{CoordinateSystem, NormalCoords};
use crate::surfaces::tables::{DiscKind, corner_discs};
use num_bigint::BigInt;
use std::cmp::Ordering;

/// Pairs of `(standard column, reduced column)` within one block, for every
/// coordinate the two systems share.
fn shared_columns(standard: &dyn CoordinateSystem, reduced: &dyn CoordinateSystem) -> Vec<(usize, usize)> {
    DiscKind::ALL
        .iter()
        .filter(|k| !matches!(k, DiscKind::Triangle(_)))
        .flat_map(|&k| standard.columns(k).into_iter().zip(reduced.columns(k)))
        .collect()
}

/// Projects a standard-type vector onto its reduced system by dropping the
/// triangle coordinates. Vectors already in a reduced system are returned
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::ray::Ray;
/// use normal_surfaces::surfaces::conversion::standard_to_quad;
/// use normal_surfaces::surfaces::coords::NormalCoords;
///
/// let std = Ray::from(vec![1_i64, 1, 1, 1, 0, 2, 0]);
/// let quad = standard_to_quad(NormalCoords::Standard, &std)?;
/// assert_eq!(quad.into_vec(), vec![0, 2, 0]);
/// # Ok::<(), normal_surfaces::error::EnumerationError>(())
/// ```
///
/// # Errors
///
/// Returns [`EnumerationError::InvalidArgument`] if the length of `ray` is
/// not a whole number of tetrahedron blocks of `coords`.
pub fn standard_to_quad<I: IntegerBackend>(coords: NormalCoords, ray: &Ray<I>) -> Result<Ray<I>, EnumerationError> {
    let standard = coords.system();
    let ps = standard.per_tetrahedron();
    if ray.len() % ps != 0 {
        return Err(EnumerationError::invalid(format!(
            "{coords} vector length {} is not a multiple of {ps}",
            ray.len()
        )));
    }
    if standard.is_quad_only() {
        return Ok(ray.clone());
    }
    let reduced = coords.reduced_counterpart().system();
    let pr = reduced.per_tetrahedron();
    let tets = ray.len() / ps;
    let mut out = Ray::zeros(pr * tets);
    let pairs = shared_columns(standard, reduced);
    for t in 0..tets {
        for &(s, r) in &pairs {
            out.set(t * pr + r, ray[t * ps + s].clone());
        }
    }
    Ok(out)
}

/// Sum of the non-triangle arcs at corner `v` of face `f`, in a standard-type
/// vector. `towards` selects an orientation in oriented systems.
fn corner_offset<I: IntegerBackend>(
    sys: &dyn CoordinateSystem,
    ray: &Ray<I>,
    tet: usize,
    v: usize,
    f: usize,
    towards: Option<bool>,
) -> Result<I, IntegerOverflow> {
    let block = tet * sys.per_tetrahedron();
    let mut sum = I::zero();
    for kind in corner_discs(v, f).into_iter().skip(1) {
        match towards {
            Some(dir) => {
                let o = usize::from(kind.normal_towards(v) != dir);
                if let Some(c) = sys.oriented_column(kind, o) {
                    sum = sum.try_add(&ray[block + c])?;
                }
            }
            None => {
                for c in sys.columns(kind) {
                    sum = sum.try_add(&ray[block + c])?;
                }
            }
        }
    }
    Ok(sum)
}

fn triangle_column(sys: &dyn CoordinateSystem, v: usize, towards: Option<bool>) -> Option<usize> {
    match towards {
        Some(dir) => sys.oriented_column(DiscKind::Triangle(v), usize::from(!dir)),
        None => sys.columns(DiscKind::Triangle(v)).first().copied(),
    }
}

/// Rebuilds triangle coordinates for a reduced-system vector.
///
/// Around each vertex the triangle counts are determined up to a constant by
/// the matching equations; the constant is chosen so the smallest count at
/// that vertex is zero. Returns `Ok(None)` if the counts cannot be made
/// consistent around some vertex, which happens exactly for non-compact
/// (spun) surfaces.
///
/// `coords` is the reduced system of `ray`; the result is in its standard
/// counterpart. Vectors already in a standard-type system are returned
/// unchanged.
///
/// # Errors
///
/// - [`EnumerationError::InvalidArgument`] if `ray` does not have one block
///   of `coords` per tetrahedron of `tri`.
/// - [`EnumerationError::ArithmeticOverflow`] if the backend overflows.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::census;
/// use normal_surfaces::core::ray::Ray;
/// use normal_surfaces::surfaces::conversion::quad_to_standard_canonical;
/// use normal_surfaces::surfaces::coords::NormalCoords;
///
/// let ball = census::ball();
/// let quad = Ray::from(vec![0_i64, 1, 0]);
/// let std = quad_to_standard_canonical(&ball, NormalCoords::Quad, &quad)?.unwrap();
/// assert_eq!(std.into_vec(), vec![0, 0, 0, 0, 0, 1, 0]);
/// # Ok::<(), normal_surfaces::error::EnumerationError>(())
/// ```
pub fn quad_to_standard_canonical<I: IntegerBackend>(
    tri: &Triangulation3,
    coords: NormalCoords,
    ray: &Ray<I>,
) -> Result<Option<Ray<I>>, EnumerationError> {
    let reduced = coords.system();
    let expected = reduced.dimension(tri);
    if ray.len() != expected {
        return Err(EnumerationError::invalid(format!(
            "{coords} vector needs {expected} coordinates, got {}",
            ray.len()
        )));
    }
    if !reduced.is_quad_only() {
        return Ok(Some(ray.clone()));
    }
    let standard = coords.standard_counterpart().system();
    let (ps, pr) = (standard.per_tetrahedron(), reduced.per_tetrahedron());
    let mut out = Ray::zeros(ps * tri.size());
    let pairs = shared_columns(standard, reduced);
    for t in 0..tri.size() {
        for &(s, r) in &pairs {
            out.set(t * ps + s, ray[t * pr + r].clone());
        }
    }

    let directions: &[Option<bool>] = if standard.allows_oriented() {
        &[Some(true), Some(false)]
    } else {
        &[None]
    };
    let skeleton = tri.skeleton();
    for vertex in skeleton.vertices() {
        let start = vertex.front();
        for &dir in directions {
            let mut values: FastHashMap<(usize, usize), I> = FastHashMap::default();
            values.insert((start.simplex(), start.face()), I::zero());
            let mut stack = vec![(start.simplex(), start.face())];
            while let Some((t, v)) = stack.pop() {
                let here = values.get(&(t, v)).cloned().unwrap_or_else(I::zero);
                for i in (0..4).filter(|&i| i != v) {
                    let Some((t2, g)) = tri.adjacent(t, i) else {
                        continue;
                    };
                    let value = here
                        .try_add(&corner_offset(standard, &out, t, v, i, dir)?)?
                        .try_sub(&corner_offset(standard, &out, t2, g[v], g[i], dir)?)?;
                    match values.get(&(t2, g[v])) {
                        Some(existing) if *existing != value => return Ok(None),
                        Some(_) => {}
                        None => {
                            values.insert((t2, g[v]), value);
                            stack.push((t2, g[v]));
                        }
                    }
                }
            }
            let Some(min) = values.values().min().cloned() else {
                continue;
            };
            for ((t, v), value) in values {
                if let Some(c) = triangle_column(standard, v, dir) {
                    out.set(t * ps + c, value.try_sub(&min)?);
                }
            }
        }
    }
    Ok(Some(out))
}

/// A ray with its zero set, as used by the vertex conversion.
#[derive(Clone, Debug)]
struct ConvRay<I, B> {
    ray: Ray<I>,
    zeros: B,
}

impl<I: IntegerBackend, B: Bitmask> ConvRay<I, B> {
    fn new(ray: Ray<I>) -> Result<Self, EnumerationError> {
        let zeros = ray.zero_set::<B>()?;
        Ok(Self { ray, zeros })
    }
}

/// Converts the vertex rays of a reduced cone into the vertex rays of the
/// corresponding standard cone.
///
/// The canonical reconstructions of `rays` are extended one vertex at a time:
/// the negated vertex link is added as a temporary generator, every triangle
/// coordinate of that vertex is cut down to the non-negative half-space by a
/// double description step, and the vertex link itself is added. Triangle
/// coordinates of vertices not yet processed are ignored by the adjacency
/// test. Returns `Ok(None)` if the tracker cancels.
///
/// `coords` must be `Quad` or `QuadOct`.
///
/// # Errors
///
/// - [`EnumerationError::InvalidArgument`] for any other system.
/// - [`EnumerationError::FailedPrecondition`] if `tri` is invalid or ideal.
/// - [`EnumerationError::Internal`] if a ray cannot be reconstructed.
/// - [`EnumerationError::ArithmeticOverflow`] / [`EnumerationError::Bitmask`]
///   if the backend or mask type is too small.
pub fn quad_to_standard_vertices<I, B>(
    tri: &Triangulation3,
    coords: NormalCoords,
    rays: &[Ray<I>],
    tracker: &dyn ProgressTracker,
) -> Result<Option<Vec<Ray<I>>>, EnumerationError>
where
    I: IntegerBackend,
    B: Bitmask,
{
    if !matches!(coords, NormalCoords::Quad | NormalCoords::QuadOct) {
        return Err(EnumerationError::invalid(format!(
            "vertex conversion is not available from {coords}"
        )));
    }
    let skeleton = tri.skeleton();
    if !skeleton.is_valid() || skeleton.is_ideal() {
        return Err(EnumerationError::precondition(
            "vertex conversion to standard coordinates",
            "a valid triangulation without ideal vertices",
        ));
    }
    let standard = coords.standard_counterpart().system();
    let per = standard.per_tetrahedron();
    let len = standard.dimension(tri);
    let masks: Vec<B> = standard.constraints(tri).bitmasks(len)?;

    let classes: Vec<Vec<usize>> = skeleton
        .vertices()
        .iter()
        .map(|v| v.embeddings().iter().map(|e| e.simplex() * per + e.face()).collect())
        .collect();
    let links: Vec<Ray<I>> = classes
        .iter()
        .map(|class| {
            let mut link = Ray::zeros(len);
            for &c in class {
                link.set(c, I::one());
            }
            link
        })
        .collect();

    let mut current: Vec<ConvRay<I, B>> = Vec::with_capacity(rays.len() + links.len());
    for ray in rays {
        let mirrored = quad_to_standard_canonical(tri, coords, ray)?
            .ok_or_else(|| EnumerationError::internal("reduced vertex ray has no compact reconstruction"))?;
        current.push(ConvRay::new(mirrored)?);
    }

    let mut ignore = B::with_len(len)?;
    for t in 0..tri.size() {
        for v in 0..4 {
            ignore.set(t * per + v, true);
        }
    }

    for (vi, class) in classes.iter().enumerate() {
        if tracker.is_cancelled() {
            return Ok(None);
        }
        let negated: Ray<I> = links[vi].iter().map(|c| c.try_neg()).collect::<Result<_, _>>()?;
        current.push(ConvRay::new(negated)?);
        for &tc in class {
            current = eliminate(current, tc, &ignore, &masks, len)?;
            ignore.set(tc, false);
        }
        current.push(ConvRay::new(links[vi].clone())?);

        for later in &links[vi + 1..] {
            let link_zeros = later.zero_set::<B>()?;
            for r in &mut current {
                if !r.zeros.is_subset_of(&link_zeros) {
                    continue;
                }
                let Some(min) = later
                    .iter()
                    .zip(r.ray.iter())
                    .filter(|(l, _)| !l.is_zero())
                    .map(|(_, x)| x.clone())
                    .min()
                else {
                    continue;
                };
                let mut reduced = Ray::combine(&I::one(), &r.ray, &min.try_neg()?, later)?;
                reduced.make_primitive()?;
                *r = ConvRay::new(reduced)?;
            }
        }
        tracing::trace!(vertex = vi, rays = current.len(), "vertex link added");
    }
    tracing::debug!(reduced = rays.len(), standard = current.len(), "converted vertex rays");
    Ok(Some(current.into_iter().map(|r| r.ray).collect()))
}

/// One double description step on coordinate `tc` with the given ignored
/// coordinates: rays negative at `tc` are replaced by combinations with rays
/// positive there.
fn eliminate<I: IntegerBackend, B: Bitmask>(
    current: Vec<ConvRay<I, B>>,
    tc: usize,
    ignore: &B,
    masks: &[B],
    len: usize,
) -> Result<Vec<ConvRay<I, B>>, EnumerationError> {
    let mut pos = Vec::new();
    let mut neg = Vec::new();
    for (k, r) in current.iter().enumerate() {
        match r.ray[tc].sign() {
            Ordering::Greater => pos.push(k),
            Ordering::Less => neg.push(k),
            Ordering::Equal => {}
        }
    }
    let mut next: Vec<ConvRay<I, B>> = current
        .iter()
        .filter(|r| !r.ray[tc].is_negative())
        .cloned()
        .collect();
    for &a in &pos {
        for &b in &neg {
            let join = current[a].zeros.intersection(&current[b].zeros);
            let nonzero = join.complement(len);
            if masks
                .iter()
                .any(|m| !m.intersection(&nonzero).at_most_one_bit())
            {
                continue;
            }
            let blocked = current
                .iter()
                .enumerate()
                .any(|(k, r)| k != a && k != b && join.is_subset_of(&ignore.union(&r.zeros)));
            if blocked {
                continue;
            }
            let pd = &current[a].ray[tc];
            let nd = current[b].ray[tc].try_neg()?;
            let mut combined = Ray::combine(pd, &current[b].ray, &nd, &current[a].ray)?;
            combined.make_primitive()?;
            next.push(ConvRay::new(combined)?);
        }
    }
    Ok(next)
}

/// Keeps the standard-type vertex rays whose projections are vertex rays of
/// the reduced cone, projected and without duplicates. Vertex links (which
/// project to zero) are dropped.
///
/// `coords` is the standard-type system of `rays`.
///
/// # Errors
///
/// Returns [`EnumerationError::ArithmeticOverflow`] if rank computations
/// overflow, which does not happen with the arbitrary precision backend used
/// internally.
pub fn standard_to_quad_vertices<I: IntegerBackend>(
    tri: &Triangulation3,
    coords: NormalCoords,
    rays: &[Ray<I>],
) -> Result<Vec<Ray<I>>, EnumerationError> {
    let reduced = coords.reduced_counterpart();
    let equations: MatrixInt<BigInt> = reduced.system().equations(tri)?.convert()?;
    let n = equations.cols();
    let mut out: Vec<Ray<I>> = Vec::new();
    for ray in rays {
        let mut projected = standard_to_quad(coords, ray)?;
        if projected.is_zero() {
            continue;
        }
        projected.make_primitive()?;
        if out.contains(&projected) {
            continue;
        }
        let mut m = equations.clone();
        for (i, c) in projected.iter().enumerate() {
            if c.is_zero() {
                let mut unit = vec![BigInt::from(0); n];
                unit[i] = BigInt::from(1);
                m.append_row(unit);
            }
        }
        if m.rank()? + 1 == n {
            out.push(projected);
        }
    }
    Ok(out)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::census;
    use crate::core::progress::NoProgress;

    #[test]
    fn test_projection_of_almost_normal() {
        let an = Ray::from(vec![1_i64, 0, 0, 0, 0, 0, 0, 0, 3, 0]);
        assert_eq!(
            standard_to_quad(NormalCoords::AlmostNormal, &an).unwrap().into_vec(),
            vec![0, 0, 0, 0, 3, 0]
        );
        let quad = Ray::from(vec![1_i64, 2, 3]);
        assert_eq!(standard_to_quad(NormalCoords::Quad, &quad).unwrap(), quad);
    }

    #[test]
    fn test_canonical_reconstruction_of_zero_is_zero() {
        let tri = census::layered_loop(2, false).unwrap();
        let zero: Ray<i64> = Ray::zeros(6);
        let std = quad_to_standard_canonical(&tri, NormalCoords::Quad, &zero)
            .unwrap()
            .unwrap();
        assert!(std.is_zero());
        assert_eq!(std.len(), 14);
    }

    #[test]
    fn test_round_trip_through_standard() {
        let tri = census::layered_lens_space(5, 2).unwrap();
        let sys = NormalCoords::Standard.system();
        let m = sys.equations(&tri).unwrap();
        assert_eq!(tri.size(), 1);
        for quad in [[0_i64, 0, 0], [0, 1, 0], [1, 0, 0]] {
            let Some(std) = quad_to_standard_canonical(&tri, NormalCoords::Quad, &Ray::from(quad.to_vec())).unwrap()
            else {
                continue;
            };
            assert_eq!(std.len(), 7);
            for row in m.iter_rows() {
                assert_eq!(std.dot(row).unwrap(), 0);
            }
            assert_eq!(
                standard_to_quad(NormalCoords::Standard, &std).unwrap().into_vec(),
                quad.to_vec()
            );
        }
    }

    #[test]
    fn test_conversions_reject_wrong_lengths() {
        let tri = census::layered_loop(2, false).unwrap();
        let short: Ray<i64> = Ray::zeros(3);
        let err = quad_to_standard_canonical(&tri, NormalCoords::Quad, &short).unwrap_err();
        assert!(matches!(err, EnumerationError::InvalidArgument { .. }));
        let long: Ray<i64> = Ray::zeros(15);
        let err = quad_to_standard_canonical(&tri, NormalCoords::Standard, &long).unwrap_err();
        assert!(matches!(err, EnumerationError::InvalidArgument { .. }));

        let ragged: Ray<i64> = Ray::zeros(9);
        let err = standard_to_quad(NormalCoords::Standard, &ragged).unwrap_err();
        assert!(matches!(err, EnumerationError::InvalidArgument { .. }));
        assert_eq!(standard_to_quad(NormalCoords::Standard, &Ray::<i64>::zeros(14)).unwrap().len(), 6);
    }

    #[test]
    fn test_vertex_conversion_rejects_oriented() {
        let tri = census::ball();
        let err = quad_to_standard_vertices::<i64, u64>(&tri, NormalCoords::QuadOriented, &[], &NoProgress)
            .unwrap_err();
        assert!(matches!(err, EnumerationError::InvalidArgument { .. }));
    }

    #[test]
    fn test_vertex_conversion_rejects_ideal() {
        let tri = census::figure_eight().unwrap();
        let err = quad_to_standard_vertices::<i64, u64>(&tri, NormalCoords::Quad, &[], &NoProgress)
            .unwrap_err();
        assert!(matches!(err, EnumerationError::FailedPrecondition { .. }));
    }

    #[test]
    fn test_ball_vertices_from_quads() {
        // One tetrahedron: three quads become the three quads plus four
        // vertex links.
        let tri = census::ball();
        let quads: Vec<Ray<i64>> = (0..3).map(|i| Ray::unit(3, i)).collect();
        let std = quad_to_standard_vertices::<i64, u64>(&tri, NormalCoords::Quad, &quads, &NoProgress)
            .unwrap()
            .unwrap();
        assert_eq!(std.len(), 7);
        let back = standard_to_quad_vertices(&tri, NormalCoords::Standard, &std).unwrap();
        assert_eq!(back.len(), 3);
    }
}
