//! A single normal or almost normal surface.
//!
//! A [`NormalSurface`] owns its coordinate vector and shares its
//! triangulation. Derived properties are computed on first use and cached;
//! nothing else about a surface ever changes.

use crate::core::ray::Ray;
use crate::core::triangulation::Triangulation3;
use crate::error::EnumerationError;
use crate::surfaces::conversion::{quad_to_standard_canonical, standard_to_quad};
use crate::surfaces::coords::{NormalCoords, disc_euler_row};
use crate::surfaces::crush;
use crate::surfaces::cut;
use crate::surfaces::disc_set::{DiscSet, DiscSetAnalysis};
use crate::surfaces::tables::{DiscKind, corner_discs, edge_number, oct_edge_crossings, quad_meeting, quad_separating};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A normal or almost normal surface in a fixed triangulation.
#[derive(Clone)]
pub struct NormalSurface {
    vector: Ray<BigInt>,
    coords: NormalCoords,
    triangulation: Arc<Triangulation3>,
    standard: OnceLock<Option<Ray<BigInt>>>,
    discs: OnceLock<Option<Ray<BigInt>>>,
    euler: OnceLock<Option<BigInt>>,
    analysis: OnceLock<Option<DiscSetAnalysis>>,
}

impl NormalSurface {
    /// Wraps a coordinate vector.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError::InvalidArgument`] if the vector has the
    /// wrong length for `coords` on `triangulation`, or has a negative entry.
    pub fn new(
        triangulation: Arc<Triangulation3>,
        coords: NormalCoords,
        vector: Ray<BigInt>,
    ) -> Result<Self, EnumerationError> {
        let expected = coords.system().dimension(&triangulation);
        if vector.len() != expected {
            return Err(EnumerationError::invalid(format!(
                "{coords} vector needs {expected} coordinates, got {}",
                vector.len()
            )));
        }
        if !vector.is_non_negative() {
            return Err(EnumerationError::invalid("normal coordinates must be non-negative"));
        }
        Ok(Self::from_parts(triangulation, coords, vector))
    }

    pub(crate) const fn from_parts(
        triangulation: Arc<Triangulation3>,
        coords: NormalCoords,
        vector: Ray<BigInt>,
    ) -> Self {
        Self {
            vector,
            coords,
            triangulation,
            standard: OnceLock::new(),
            discs: OnceLock::new(),
            euler: OnceLock::new(),
            analysis: OnceLock::new(),
        }
    }

    /// The raw coordinate vector.
    #[must_use]
    pub const fn vector(&self) -> &Ray<BigInt> {
        &self.vector
    }

    /// The system the vector is expressed in.
    #[must_use]
    pub const fn coords(&self) -> NormalCoords {
        self.coords
    }

    /// The underlying triangulation.
    #[must_use]
    pub fn triangulation(&self) -> &Arc<Triangulation3> {
        &self.triangulation
    }

    /// Number of stored coordinates.
    #[must_use]
    pub fn count_coords(&self) -> usize {
        self.vector.len()
    }

    /// Returns `true` for the zero vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vector.is_zero()
    }

    // =========================================================================
    // DISC COUNTS
    // =========================================================================

    fn raw_count(&self, tet: usize, kind: DiscKind) -> BigInt {
        let system = self.coords.system();
        let base = tet * system.per_tetrahedron();
        system
            .columns(kind)
            .iter()
            .map(|c| self.vector[base + c].clone())
            .sum()
    }

    /// Disc count for a caller-supplied position; `None` past the last
    /// tetrahedron.
    fn checked_count(&self, tet: usize, kind: DiscKind) -> Option<BigInt> {
        (tet < self.triangulation.size()).then(|| self.raw_count(tet, kind))
    }

    /// Number of quads of type `q` in tetrahedron `tet`, over both
    /// orientations. `None` if `tet` or `q` is out of range.
    #[must_use]
    pub fn quads(&self, tet: usize, q: usize) -> Option<BigInt> {
        if q >= 3 {
            return None;
        }
        self.checked_count(tet, DiscKind::Quad(q))
    }

    /// Number of octagons of type `o` in tetrahedron `tet`. `None` if `tet`
    /// or `o` is out of range.
    #[must_use]
    pub fn octs(&self, tet: usize, o: usize) -> Option<BigInt> {
        if o >= 3 {
            return None;
        }
        self.checked_count(tet, DiscKind::Octagon(o))
    }

    /// Number of triangles at vertex `v` of tetrahedron `tet`. `None` if an
    /// index is out of range, or if the vector is in reduced coordinates and
    /// the surface is not compact.
    #[must_use]
    pub fn triangles(&self, tet: usize, v: usize) -> Option<BigInt> {
        if v >= 4 || tet >= self.triangulation.size() {
            return None;
        }
        if !self.coords.is_quad_only() {
            return Some(self.raw_count(tet, DiscKind::Triangle(v)));
        }
        self.discs().map(|d| d[tet * 10 + v].clone())
    }

    /// Quads of type `q` in `tet` with orientation `o` (`0` canonical, `1`
    /// reversed). `None` in unoriented systems or for out-of-range indices.
    #[must_use]
    pub fn oriented_quads(&self, tet: usize, q: usize, o: usize) -> Option<BigInt> {
        if q >= 3 || o >= 2 || tet >= self.triangulation.size() {
            return None;
        }
        let system = self.coords.system();
        let column = system.oriented_column(DiscKind::Quad(q), o)?;
        Some(self.vector[tet * system.per_tetrahedron() + column].clone())
    }

    /// Triangles at vertex `v` of `tet` with orientation `o`. `None` in
    /// unoriented systems, for out-of-range indices, or if the triangles
    /// cannot be reconstructed.
    #[must_use]
    pub fn oriented_triangles(&self, tet: usize, v: usize, o: usize) -> Option<BigInt> {
        if !self.coords.allows_oriented() || v >= 4 || o >= 2 || tet >= self.triangulation.size() {
            return None;
        }
        let standard = NormalCoords::StandardOriented.system();
        let column = standard.oriented_column(DiscKind::Triangle(v), o)?;
        let vector = self.standard()?;
        Some(vector[tet * standard.per_tetrahedron() + column].clone())
    }

    /// The first tetrahedron and octagon type with a non-zero octagon
    /// count.
    #[must_use]
    pub fn octagon_position(&self) -> Option<(usize, usize)> {
        if !self.coords.allows_almost_normal() {
            return None;
        }
        (0..self.triangulation.size())
            .flat_map(|t| (0..3).map(move |o| (t, o)))
            .find(|&(t, o)| !self.raw_count(t, DiscKind::Octagon(o)).is_zero())
    }

    /// Number of times the surface meets edge class `edge`. `None` if the
    /// surface is not compact or the edge does not exist.
    #[must_use]
    pub fn edge_weight(&self, edge: usize) -> Option<BigInt> {
        let discs = self.discs()?;
        let skeleton = self.triangulation.skeleton();
        let front = skeleton.edges().get(edge)?.front();
        let (tet, p) = (front.simplex(), front.vertices());
        let (a, b) = (p[0], p[1]);
        let block = &discs.as_slice()[tet * 10..tet * 10 + 10];
        let e = edge_number(a, b);
        let mut weight = block[a].clone() + &block[b];
        for q in quad_meeting(a, b) {
            weight += &block[4 + q];
        }
        for o in 0..3 {
            weight += &block[7 + o] * BigInt::from(oct_edge_crossings(o, e));
        }
        Some(weight)
    }

    /// Number of arcs in triangle class `triangle` cutting off its corner
    /// `corner` (`0..3`). `None` if the surface is not compact.
    #[must_use]
    pub fn arcs(&self, triangle: usize, corner: usize) -> Option<BigInt> {
        let discs = self.discs()?;
        let skeleton = self.triangulation.skeleton();
        let front = skeleton.triangles().get(triangle)?.front();
        let (tet, p) = (front.simplex(), front.vertices());
        let (v, f) = (p[corner], p[3]);
        Some(
            corner_discs(v, f)
                .iter()
                .map(|k| discs[tet * 10 + k.offset()].clone())
                .sum(),
        )
    }

    // =========================================================================
    // DERIVED VECTORS
    // =========================================================================

    /// The vector in the standard counterpart of [`Self::coords`], with
    /// triangles rebuilt canonically from reduced data.
    fn standard(&self) -> Option<&Ray<BigInt>> {
        self.standard
            .get_or_init(|| {
                quad_to_standard_canonical(&self.triangulation, self.coords, &self.vector)
                    .ok()
                    .flatten()
            })
            .as_ref()
    }

    /// Unoriented counts in the ten-per-tetrahedron disc layout.
    fn discs(&self) -> Option<&Ray<BigInt>> {
        self.discs
            .get_or_init(|| {
                let standard = self.standard()?;
                let system = self.coords.standard_counterpart().system();
                let per = system.per_tetrahedron();
                let mut out = Ray::zeros(10 * self.triangulation.size());
                for tet in 0..self.triangulation.size() {
                    for kind in DiscKind::ALL {
                        let value: BigInt = system
                            .columns(kind)
                            .iter()
                            .map(|c| standard[tet * per + c].clone())
                            .sum();
                        out.set(tet * 10 + kind.offset(), value);
                    }
                }
                Some(out)
            })
            .as_ref()
    }

    fn disc_set(&self) -> Option<DiscSet> {
        DiscSet::new(self.discs()?).ok()
    }

    fn analysis(&self) -> Option<&DiscSetAnalysis> {
        self.analysis
            .get_or_init(|| {
                let set = self.disc_set()?;
                match set.analyse(&self.triangulation) {
                    Ok(analysis) => Some(analysis),
                    Err(err) => {
                        tracing::debug!(%err, "disc set analysis failed");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// The vector in `target` coordinates, if the surface can be expressed
    /// there.
    ///
    /// Conversions never invent data: oriented and unoriented systems do not
    /// mix, octagons cannot move into a normal system, and triangles can be
    /// dropped but are only restored for compact surfaces.
    #[must_use]
    pub fn vector_in(&self, target: NormalCoords) -> Option<Ray<BigInt>> {
        if target == self.coords {
            return Some(self.vector.clone());
        }
        if target.allows_oriented() || self.coords.allows_oriented() {
            if !(target.allows_oriented() && self.coords.allows_oriented()) {
                return None;
            }
            return if target.is_quad_only() {
                standard_to_quad(self.coords, &self.vector).ok()
            } else {
                self.standard().cloned()
            };
        }
        if !target.allows_almost_normal() && self.octagon_position().is_some() {
            return None;
        }
        let system = target.system();
        let per = system.per_tetrahedron();
        let n = self.triangulation.size();
        let discs = if target.is_quad_only() { None } else { Some(self.discs()?) };
        let mut out = Ray::zeros(per * n);
        for tet in 0..n {
            for kind in DiscKind::ALL {
                let columns = system.columns(kind);
                let Some(&column) = columns.first() else {
                    continue;
                };
                let value = match (kind, discs) {
                    (DiscKind::Triangle(_), Some(d)) => d[tet * 10 + kind.offset()].clone(),
                    _ => self.raw_count(tet, kind),
                };
                out.set(tet * per + column, value);
            }
        }
        Some(out)
    }

    // =========================================================================
    // TOPOLOGY
    // =========================================================================

    /// Returns `true` if the surface has finitely many discs, that is if its
    /// triangle coordinates are known or can be rebuilt.
    #[must_use]
    pub fn is_compact(&self) -> bool {
        self.standard().is_some()
    }

    /// Euler characteristic, or `None` for non-compact surfaces.
    #[must_use]
    pub fn euler_char(&self) -> Option<BigInt> {
        self.euler
            .get_or_init(|| {
                let discs = self.discs()?;
                let row: Vec<BigInt> = disc_euler_row(&self.triangulation)
                    .into_iter()
                    .map(BigInt::from)
                    .collect();
                discs.dot(&row).ok()
            })
            .clone()
    }

    /// Orientability. `None` if the surface is not compact or not embedded.
    #[must_use]
    pub fn is_orientable(&self) -> Option<bool> {
        self.analysis().map(|a| a.orientable)
    }

    /// Two-sidedness. `None` if the surface is not compact or not embedded.
    #[must_use]
    pub fn is_two_sided(&self) -> Option<bool> {
        self.analysis().map(|a| a.two_sided)
    }

    /// Connectedness. The empty surface is not connected. `None` if the
    /// surface is not compact or not embedded.
    #[must_use]
    pub fn is_connected(&self) -> Option<bool> {
        self.analysis().map(|a| a.components == 1)
    }

    /// Returns `true` if some disc meets a boundary triangle.
    #[must_use]
    pub fn has_real_boundary(&self) -> bool {
        if let Some(analysis) = self.analysis() {
            return analysis.real_boundary;
        }
        // Fall back to counting discs next to boundary faces.
        let n = self.triangulation.size();
        (0..n).any(|tet| {
            (0..4).any(|f| {
                self.triangulation.adjacent(tet, f).is_none()
                    && DiscKind::ALL.iter().any(|&kind| {
                        !matches!(kind, DiscKind::Triangle(v) if v == f)
                            && match kind {
                                DiscKind::Triangle(v) => self
                                    .triangles(tet, v)
                                    .is_none_or(|c| !c.is_zero()),
                                _ => !self.raw_count(tet, kind).is_zero(),
                            }
                    })
            })
        })
    }

    /// If the surface is a positive multiple of a single vertex link, the
    /// index of that vertex.
    #[must_use]
    pub fn vertex_link(&self) -> Option<usize> {
        let discs = self.discs()?;
        let n = self.triangulation.size();
        let non_triangle = (0..n).any(|t| (4..10).any(|k| !discs[t * 10 + k].is_zero()));
        if non_triangle || discs.is_zero() {
            return None;
        }
        let skeleton = self.triangulation.skeleton();
        let mut found = None;
        for (index, vertex) in skeleton.vertices().iter().enumerate() {
            let counts: Vec<&BigInt> = vertex
                .embeddings()
                .iter()
                .map(|emb| &discs[emb.simplex() * 10 + emb.face()])
                .collect();
            let first = counts[0];
            if counts.iter().any(|c| *c != first) {
                return None;
            }
            if !first.is_zero() {
                if found.is_some() {
                    return None;
                }
                found = Some(index);
            }
        }
        found
    }

    /// Returns `true` if the surface is exactly one copy of a vertex link.
    #[must_use]
    pub fn is_vertex_linking(&self) -> bool {
        let Some(vertex) = self.vertex_link() else {
            return false;
        };
        let skeleton = self.triangulation.skeleton();
        let front = skeleton.vertices()[vertex].front();
        self.discs()
            .is_some_and(|d| d[front.simplex() * 10 + front.face()] == BigInt::from(1))
    }

    /// Returns `true` if every tetrahedron holds exactly one quad and no
    /// other disc.
    #[must_use]
    pub fn is_splitting(&self) -> bool {
        let Some(discs) = self.discs() else {
            return false;
        };
        let one = BigInt::from(1);
        (0..self.triangulation.size()).all(|t| {
            let block = &discs.as_slice()[t * 10..t * 10 + 10];
            block[..4].iter().all(Zero::is_zero)
                && block[7..].iter().all(Zero::is_zero)
                && block[4..7].iter().sum::<BigInt>() == one
        })
    }

    /// The number of discs if every tetrahedron meets at most one disc,
    /// otherwise `0`.
    #[must_use]
    pub fn is_central(&self) -> usize {
        let Some(discs) = self.discs() else {
            return 0;
        };
        let mut total = 0;
        for t in 0..self.triangulation.size() {
            let count: BigInt = discs.as_slice()[t * 10..t * 10 + 10].iter().sum();
            match count.to_usize() {
                Some(0) => {}
                Some(1) => total += 1,
                _ => return 0,
            }
        }
        total
    }

    /// Up to two edge classes whose thin edge links are proportional to
    /// this surface.
    #[must_use]
    pub fn is_thin_edge_link(&self) -> (Option<usize>, Option<usize>) {
        let Some(discs) = self.discs() else {
            return (None, None);
        };
        if discs.is_zero() || self.octagon_position().is_some() {
            return (None, None);
        }
        let skeleton = self.triangulation.skeleton();
        let mut found = Vec::with_capacity(2);
        for index in 0..skeleton.edges().len() {
            let Some(link) = self.thin_edge_link(index) else {
                continue;
            };
            if proportional(discs, &link) {
                found.push(index);
                if found.len() == 2 {
                    break;
                }
            }
        }
        (found.first().copied(), found.get(1).copied())
    }

    /// Disc counts of the boundary of a thin regular neighbourhood of edge
    /// class `edge`, or `None` if that boundary is not normal.
    fn thin_edge_link(&self, edge: usize) -> Option<Vec<i64>> {
        let skeleton = self.triangulation.skeleton();
        let class = skeleton.edges().get(edge)?;
        let n = self.triangulation.size();
        let front = class.front();
        let ends = [
            skeleton.vertex_of(front.simplex(), front.vertices()[0]),
            skeleton.vertex_of(front.simplex(), front.vertices()[1]),
        ];
        let mut link = vec![0_i64; 10 * n];
        let mut touched = vec![[false; 4]; n];
        let mut used: Vec<Vec<usize>> = vec![Vec::new(); n];
        for emb in class.embeddings() {
            let (t, p) = (emb.simplex(), emb.vertices());
            let e = edge_number(p[0], p[1]);
            if used[t].iter().any(|&other| other != 5 - e) {
                return None;
            }
            used[t].push(e);
            link[t * 10 + 4 + quad_separating(p[0], p[1])] += 1;
            touched[t][p[0]] = true;
            touched[t][p[1]] = true;
        }
        for t in 0..n {
            for v in 0..4 {
                if !touched[t][v] && ends.contains(&skeleton.vertex_of(t, v)) {
                    link[t * 10 + v] += 1;
                }
            }
        }
        Some(link)
    }

    // =========================================================================
    // PAIRS OF SURFACES
    // =========================================================================

    fn check_same_triangulation(&self, other: &Self, operation: &'static str) -> Result<(), EnumerationError> {
        if Arc::ptr_eq(&self.triangulation, &other.triangulation) || *self.triangulation == *other.triangulation {
            Ok(())
        } else {
            Err(EnumerationError::invalid(format!(
                "{operation} needs surfaces in the same triangulation"
            )))
        }
    }

    /// Returns `true` if the two surfaces never use different quad or
    /// octagon types in the same tetrahedron, so that their sum is
    /// embedded.
    #[must_use]
    pub fn locally_compatible(&self, other: &Self) -> bool {
        (0..self.triangulation.size()).all(|t| {
            DiscKind::ALL[4..]
                .iter()
                .filter(|&&kind| !self.raw_count(t, kind).is_zero() || !other.raw_count(t, kind).is_zero())
                .count()
                <= 1
        })
    }

    /// The sum of two surfaces, in this surface's coordinates where
    /// possible. Mixing systems drops to the standard counterpart, which
    /// needs both surfaces compact.
    ///
    /// # Errors
    ///
    /// - [`EnumerationError::InvalidArgument`] if the triangulations differ.
    /// - [`EnumerationError::FailedPrecondition`] if the vectors cannot be
    ///   brought into a common system.
    pub fn add(&self, other: &Self) -> Result<Self, EnumerationError> {
        self.check_same_triangulation(other, "add")?;
        let coords = if self.coords == other.coords {
            self.coords
        } else if self.coords.allows_almost_normal() || self.coords.allows_oriented() {
            self.coords.standard_counterpart()
        } else {
            other.coords.standard_counterpart()
        };
        let (Some(a), Some(b)) = (self.vector_in(coords), other.vector_in(coords)) else {
            return Err(EnumerationError::precondition(
                "add",
                format!("both surfaces to be expressible in {coords}"),
            ));
        };
        Ok(Self::from_parts(
            Arc::clone(&self.triangulation),
            coords,
            a.try_add(&b)?,
        ))
    }

    /// Twice this surface.
    #[must_use]
    pub fn double_surface(&self) -> Self {
        let vector: Ray<BigInt> = self.vector.iter().map(|x| x * 2).collect();
        Self::from_parts(Arc::clone(&self.triangulation), self.coords, vector)
    }

    /// Returns `true` if the two surfaces can be normally isotoped apart.
    ///
    /// # Errors
    ///
    /// - [`EnumerationError::InvalidArgument`] if the triangulations differ.
    /// - [`EnumerationError::FailedPrecondition`] unless both surfaces are
    ///   compact, embedded, non-empty and connected.
    pub fn disjoint(&self, other: &Self) -> Result<bool, EnumerationError> {
        self.check_same_triangulation(other, "disjoint")?;
        for surface in [self, other] {
            if surface.is_empty() || surface.is_connected() != Some(true) {
                return Err(EnumerationError::precondition(
                    "disjoint",
                    "compact, embedded, non-empty and connected surfaces",
                ));
            }
        }
        if !self.locally_compatible(other) {
            return Ok(false);
        }
        let sum = self.add(other)?;
        let (Some(set), Some(analysis)) = (sum.disc_set(), sum.analysis()) else {
            return Ok(false);
        };
        let counts = |s: &Self| -> Option<Vec<usize>> { s.discs()?.iter().map(ToPrimitive::to_usize).collect() };
        let (Some(a), Some(b)) = (counts(self), counts(other)) else {
            return Ok(false);
        };
        Ok(analysis
            .component_counts(&set)
            .iter()
            .any(|c| *c == a || *c == b))
    }

    // =========================================================================
    // SURGERY
    // =========================================================================

    fn surgery_discs(&self, operation: &'static str) -> Result<DiscSet, EnumerationError> {
        if self.octagon_position().is_some() {
            return Err(EnumerationError::precondition(operation, "a surface without octagons"));
        }
        let discs = self
            .discs()
            .ok_or_else(|| EnumerationError::precondition(operation, "a compact surface"))?;
        DiscSet::new(discs)
    }

    /// Crushes the surface to a point and returns the resulting
    /// triangulation.
    ///
    /// # Errors
    ///
    /// [`EnumerationError::FailedPrecondition`] if the surface has octagons,
    /// is not compact or is not embedded.
    pub fn crush(&self) -> Result<Triangulation3, EnumerationError> {
        let set = self.surgery_discs("crush")?;
        crush::crush(&self.triangulation, &set)
    }

    /// Cuts the triangulation along the surface.
    ///
    /// # Errors
    ///
    /// As for [`Self::crush`].
    pub fn cut_along(&self) -> Result<Triangulation3, EnumerationError> {
        let set = self.surgery_discs("cut_along")?;
        cut::cut_along(&self.triangulation, &set)
    }
}

fn proportional(discs: &Ray<BigInt>, link: &[i64]) -> bool {
    let Some(k) = link.iter().position(|&x| x != 0) else {
        return false;
    };
    let (a, b) = (&discs[k], BigInt::from(link[k]));
    if !a.is_positive() {
        return false;
    }
    discs
        .iter()
        .zip(link)
        .all(|(x, &y)| x * &b == a * BigInt::from(y))
}

impl fmt::Debug for NormalSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalSurface")
            .field("coords", &self.coords)
            .field("vector", &self.vector)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for NormalSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.vector)
    }
}

impl PartialEq for NormalSurface {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords && self.vector == other.vector
    }
}

impl Eq for NormalSurface {}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::census;

    fn surface(tri: &Arc<Triangulation3>, coords: NormalCoords, v: &[i64]) -> NormalSurface {
        let vector: Ray<BigInt> = v.iter().map(|&x| BigInt::from(x)).collect();
        NormalSurface::new(Arc::clone(tri), coords, vector).unwrap()
    }

    #[test]
    fn test_new_checks_length() {
        let ball = Arc::new(census::ball());
        let short: Ray<BigInt> = vec![BigInt::from(1)].into();
        assert!(NormalSurface::new(ball, NormalCoords::Standard, short).is_err());
    }

    #[test]
    fn test_ball_vertex_link_properties() {
        let ball = Arc::new(census::ball());
        let s = surface(&ball, NormalCoords::Standard, &[1, 0, 0, 0, 0, 0, 0]);
        assert!(s.is_compact());
        assert_eq!(s.euler_char(), Some(BigInt::from(1)));
        assert_eq!(s.is_orientable(), Some(true));
        assert_eq!(s.is_connected(), Some(true));
        assert!(s.has_real_boundary());
        assert_eq!(s.vertex_link(), Some(0));
        assert!(s.is_vertex_linking());
        assert_eq!(s.is_central(), 1);
        assert!(!s.is_splitting());
    }

    #[test]
    fn test_quad_in_ball_is_splitting_disc() {
        let ball = Arc::new(census::ball());
        let s = surface(&ball, NormalCoords::Quad, &[0, 1, 0]);
        assert!(s.is_compact());
        assert_eq!(s.triangles(0, 2), Some(BigInt::zero()));
        assert_eq!(s.quads(0, 1), Some(BigInt::from(1)));
        assert_eq!(s.quads(1, 0), None);
        assert_eq!(s.quads(0, 3), None);
        assert_eq!(s.octs(0, 0), Some(BigInt::zero()));
        assert_eq!(s.triangles(2, 0), None);
        assert_eq!(s.triangles(0, 4), None);
        assert_eq!(s.oriented_quads(0, 1, 0), None);
        assert_eq!(s.euler_char(), Some(BigInt::from(1)));
        assert!(s.is_splitting());
        assert!(s.vertex_link().is_none());
        let std = s.vector_in(NormalCoords::Standard).unwrap();
        assert_eq!(std.into_vec(), [0, 0, 0, 0, 0, 1, 0].map(BigInt::from).to_vec());
        assert!(s.vector_in(NormalCoords::QuadOriented).is_none());
    }

    #[test]
    fn test_empty_surface() {
        let ball = Arc::new(census::ball());
        let s = surface(&ball, NormalCoords::Standard, &[0; 7]);
        assert!(s.is_empty());
        assert_eq!(s.euler_char(), Some(BigInt::zero()));
        assert_eq!(s.is_orientable(), Some(true));
        assert_eq!(s.is_two_sided(), Some(true));
        assert_eq!(s.is_connected(), Some(false));
        assert!(!s.has_real_boundary());
        assert_eq!(s.is_central(), 0);
    }

    #[test]
    fn test_s3_vertex_link_is_closed_sphere() {
        let tri = Arc::new(census::layered_loop(1, false).unwrap());
        let s = surface(&tri, NormalCoords::Standard, &[1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(s.euler_char(), Some(BigInt::from(2)));
        assert_eq!(s.is_two_sided(), Some(true));
        assert!(!s.has_real_boundary());
        let doubled = s.double_surface();
        assert_eq!(doubled.euler_char(), Some(BigInt::from(4)));
        assert_eq!(doubled.is_connected(), Some(false));
        assert!(!doubled.is_vertex_linking());
    }

    #[test]
    fn test_octagon_position() {
        let ball = Arc::new(census::ball());
        let s = surface(&ball, NormalCoords::AlmostNormal, &[0, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        assert_eq!(s.octagon_position(), Some((0, 1)));
        assert!(s.vector_in(NormalCoords::Standard).is_none());
        assert!(s.crush().is_err());
        let q = surface(&ball, NormalCoords::AlmostNormal, &[0, 0, 0, 0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(q.octagon_position(), None);
    }

    #[test]
    fn test_add_and_compatibility() {
        let ball = Arc::new(census::ball());
        let a = surface(&ball, NormalCoords::Standard, &[1, 0, 0, 0, 0, 0, 0]);
        let b = surface(&ball, NormalCoords::Standard, &[0, 1, 0, 0, 0, 0, 0]);
        let q0 = surface(&ball, NormalCoords::Standard, &[0, 0, 0, 0, 1, 0, 0]);
        let q1 = surface(&ball, NormalCoords::Standard, &[0, 0, 0, 0, 0, 1, 0]);
        assert!(a.locally_compatible(&b));
        assert!(!q0.locally_compatible(&q1));
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.vector().as_slice()[..2], [BigInt::from(1), BigInt::from(1)]);
        assert!(a.disjoint(&b).unwrap());
        assert!(!q0.disjoint(&q1).unwrap());
    }

    #[test]
    fn test_disjoint_requires_connected() {
        let ball = Arc::new(census::ball());
        let a = surface(&ball, NormalCoords::Standard, &[1, 0, 0, 0, 0, 0, 0]);
        let empty = surface(&ball, NormalCoords::Standard, &[0; 7]);
        assert!(matches!(
            a.disjoint(&empty),
            Err(EnumerationError::FailedPrecondition { .. })
        ));
    }

    #[test]
    fn test_edge_weights_and_arcs() {
        let ball = Arc::new(census::ball());
        let s = surface(&ball, NormalCoords::Standard, &[1, 0, 0, 0, 1, 0, 0]);
        let skeleton = ball.skeleton();
        let edge01 = skeleton.edge_of(0, 0);
        let edge12 = skeleton.edge_of(0, 3);
        // Quad 0 misses edges 01 and 23; the triangle at 0 meets edge 01.
        assert_eq!(s.edge_weight(edge01), Some(BigInt::from(1)));
        assert_eq!(s.edge_weight(edge12), Some(BigInt::from(1)));
        let total: BigInt = (0..6).filter_map(|e| s.edge_weight(e)).sum();
        assert_eq!(total, BigInt::from(7));
        let arcs: BigInt = (0..4)
            .flat_map(|t| (0..3).map(move |c| (t, c)))
            .filter_map(|(t, c)| s.arcs(t, c))
            .sum();
        assert_eq!(arcs, BigInt::from(7));
    }
}
