//! Skeletal structure of a triangulation.
//!
//! The skeleton identifies the `k`-faces of all simplices into face classes for
//! every `0 ≤ k < D`, records how each class embeds in the simplices, and derives
//! the global properties built on top of that: validity, vertex links, ideal
//! vertices, connected components, orientability and boundary components.
//!
//! # Local numbering
//!
//! - Vertices are numbered `0..=D`.
//! - Facets are numbered by their opposite vertex.
//! - All other faces are numbered by the lexicographic order of their vertex
//!   sets, so in dimension 3 the edges are `01, 02, 03, 12, 13, 23`.
//!
//! # Vertex maps
//!
//! Each [`FaceEmbedding`] carries a permutation whose images `0..=k` are the
//! face's vertices inside the simplex. These maps are consistent across all
//! embeddings of a face. For the edges of a 3-manifold triangulation the
//! embeddings are listed in cyclic order around the edge: images `0, 1` are the
//! ends of the edge and the next embedding is reached through the facet opposite
//! image `2`. For a boundary edge the list runs from one boundary facet to the
//! other.

use crate::core::collections::{FastHashMap, SmallBuffer};
use crate::core::perm::Perm;
use crate::core::triangulation::Triangulation;

// =============================================================================
// LOCAL FACE TABLES
// =============================================================================

/// Vertices of local face `local` of dimension `k` in a `d`-simplex.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::core::skeleton::face_vertices;
///
/// assert_eq!(face_vertices(3, 1, 4).as_slice(), &[1, 3]);
/// assert_eq!(face_vertices(3, 2, 0).as_slice(), &[1, 2, 3]);
/// ```
#[must_use]
pub fn face_vertices(d: usize, k: usize, local: usize) -> SmallBuffer<usize, 8> {
    if k + 1 == d {
        return (0..=d).filter(|&v| v != local).collect();
    }
    let mut current: SmallBuffer<usize, 8> = (0..=k).collect();
    for _ in 0..local {
        next_combination(&mut current, d);
    }
    current
}

/// Number of local faces of dimension `k` in a `d`-simplex.
#[must_use]
pub fn face_count(d: usize, k: usize) -> usize {
    binomial(d + 1, k + 1)
}

/// Local number of the face of dimension `vertices.len() - 1` spanned by
/// `vertices` (in any order) in a `d`-simplex.
#[must_use]
pub fn face_number(d: usize, vertices: &[usize]) -> usize {
    let k = vertices.len() - 1;
    let mut sorted: SmallBuffer<usize, 8> = vertices.iter().copied().collect();
    sorted.sort_unstable();
    if k + 1 == d {
        return (0..=d).find(|v| !sorted.contains(v)).unwrap_or(0);
    }
    // Rank of a combination in lexicographic order.
    let n = d + 1;
    let mut rank = 0;
    let mut prev = 0;
    for (i, &v) in sorted.iter().enumerate() {
        for skipped in prev..v {
            rank += binomial(n - skipped - 1, k - i);
        }
        prev = v + 1;
    }
    rank
}

fn next_combination(c: &mut [usize], d: usize) {
    let len = c.len();
    let mut i = len;
    while i > 0 {
        i -= 1;
        if c[i] < d + 1 - (len - i) {
            c[i] += 1;
            for j in (i + 1)..len {
                c[j] = c[j - 1] + 1;
            }
            return;
        }
    }
}

const fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let mut result = 1;
    let mut i = 0;
    while i < k {
        result = result * (n - i) / (i + 1);
        i += 1;
    }
    result
}

// =============================================================================
// FACES
// =============================================================================

/// One appearance of a face inside a top-dimensional simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceEmbedding<const D: usize> {
    simplex: usize,
    face: usize,
    vertices: Perm<D>,
}

impl<const D: usize> FaceEmbedding<D> {
    /// Index of the simplex containing this appearance.
    #[must_use]
    #[inline]
    pub const fn simplex(&self) -> usize {
        self.simplex
    }

    /// Local face number inside the simplex.
    #[must_use]
    #[inline]
    pub const fn face(&self) -> usize {
        self.face
    }

    /// Vertex map: images `0..=k` are the face's vertices in the simplex.
    #[must_use]
    #[inline]
    pub const fn vertices(&self) -> Perm<D> {
        self.vertices
    }
}

/// Topological type of the link of a vertex in a 3-manifold triangulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexLink {
    /// Internal vertex of a closed manifold.
    Sphere,
    /// Vertex on the real boundary.
    Disc,
    /// Ideal vertex with a torus cusp.
    Torus,
    /// Ideal vertex with a Klein bottle cusp.
    KleinBottle,
    /// Ideal vertex with some other closed link.
    OtherClosed,
    /// The link has boundary but is not a disc.
    Invalid,
}

impl VertexLink {
    /// Closed links other than the sphere make the vertex ideal.
    #[must_use]
    pub const fn is_ideal(self) -> bool {
        matches!(self, Self::Torus | Self::KleinBottle | Self::OtherClosed)
    }
}

/// A face class of the triangulation.
#[derive(Clone, Debug)]
pub struct Face<const D: usize> {
    dimension: usize,
    embeddings: Vec<FaceEmbedding<D>>,
    boundary: bool,
    identified_consistently: bool,
    link_orientable: bool,
    link: Option<VertexLink>,
    link_euler: Option<i64>,
}

impl<const D: usize> Face<D> {
    /// Dimension `k` of this face.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of appearances in the simplices.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    /// All appearances, in the order described in the module documentation.
    #[must_use]
    pub fn embeddings(&self) -> &[FaceEmbedding<D>] {
        &self.embeddings
    }

    /// The first appearance.
    #[must_use]
    pub fn front(&self) -> &FaceEmbedding<D> {
        &self.embeddings[0]
    }

    /// Returns `true` if this face lies in the boundary of the triangulation.
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        self.boundary
    }

    /// A face is valid unless it is identified with itself under a
    /// non-identity map, or (for vertices in dimension 3) its link has boundary
    /// without being a disc.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.identified_consistently && self.link != Some(VertexLink::Invalid)
    }

    /// Whether the link of this face is orientable.
    #[must_use]
    pub const fn is_link_orientable(&self) -> bool {
        self.link_orientable
    }

    /// Vertex link classification; only set for vertices of 3-dimensional
    /// triangulations.
    #[must_use]
    pub const fn link(&self) -> Option<VertexLink> {
        self.link
    }

    /// Euler characteristic of the vertex link, where [`Self::link`] is set.
    #[must_use]
    pub const fn link_euler_char(&self) -> Option<i64> {
        self.link_euler
    }

    /// Returns `true` for ideal vertices.
    #[must_use]
    pub fn is_ideal(&self) -> bool {
        self.link.is_some_and(VertexLink::is_ideal)
    }
}

// =============================================================================
// COMPONENTS
// =============================================================================

/// A connected component of the triangulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    simplices: Vec<usize>,
    orientable: bool,
    boundary_facets: usize,
}

impl Component {
    /// Simplex indices in this component, in increasing order.
    #[must_use]
    pub fn simplices(&self) -> &[usize] {
        &self.simplices
    }

    /// Number of simplices.
    #[must_use]
    pub fn size(&self) -> usize {
        self.simplices.len()
    }

    /// Whether this component is orientable.
    #[must_use]
    pub const fn is_orientable(&self) -> bool {
        self.orientable
    }

    /// Number of boundary facets in this component.
    #[must_use]
    pub const fn boundary_facets(&self) -> usize {
        self.boundary_facets
    }
}

/// A boundary component: either a connected union of boundary facets or a
/// single ideal vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundaryComponent {
    /// Boundary facets `(simplex, facet)` joined along boundary ridges.
    Real {
        /// The facets making up this component.
        facets: Vec<(usize, usize)>,
    },
    /// An ideal vertex, by vertex index.
    Ideal {
        /// Index of the vertex in [`Skeleton::faces`]`(0)`.
        vertex: usize,
    },
}

// =============================================================================
// SKELETON
// =============================================================================

/// The full skeleton of a triangulation, built by
/// [`Triangulation::skeleton`].
#[derive(Clone, Debug)]
pub struct Skeleton<const D: usize> {
    generation: u64,
    size: usize,
    faces: Vec<Vec<Face<D>>>,
    face_of: Vec<Vec<usize>>,
    components: Vec<Component>,
    simplex_component: Vec<usize>,
    orientation: Vec<i8>,
    boundary_components: Vec<BoundaryComponent>,
}

impl<const D: usize> Skeleton<D> {
    pub(crate) fn build(tri: &Triangulation<D>, generation: u64) -> Self {
        let size = tri.size();
        let mut faces = Vec::with_capacity(D);
        let mut face_of = Vec::with_capacity(D);
        for k in 0..D {
            let (list, owner) = Self::trace_faces(tri, k);
            faces.push(list);
            face_of.push(owner);
        }
        let mut skeleton = Self {
            generation,
            size,
            faces,
            face_of,
            components: Vec::new(),
            simplex_component: vec![0; size],
            orientation: vec![1; size],
            boundary_components: Vec::new(),
        };
        if D == 3 {
            skeleton.order_edges(tri);
            skeleton.classify_vertex_links(tri);
        }
        skeleton.build_components(tri);
        skeleton.build_boundary_components(tri);
        skeleton
    }

    /// Identifies all `k`-faces by breadth-first search across facet gluings.
    fn trace_faces(tri: &Triangulation<D>, k: usize) -> (Vec<Face<D>>, Vec<usize>) {
        let per_simplex = face_count(D, k);
        let mut owner = vec![usize::MAX; tri.size() * per_simplex];
        let mut list = Vec::new();
        for s in 0..tri.size() {
            for local in 0..per_simplex {
                if owner[s * per_simplex + local] != usize::MAX {
                    continue;
                }
                let id = list.len();
                list.push(Self::trace_face(tri, k, s, local, id, &mut owner));
            }
        }
        (list, owner)
    }

    fn trace_face(
        tri: &Triangulation<D>,
        k: usize,
        simplex: usize,
        local: usize,
        id: usize,
        owner: &mut [usize],
    ) -> Face<D> {
        let per_simplex = face_count(D, k);
        let verts = face_vertices(D, k, local);
        let mut images: SmallBuffer<usize, 8> = verts.clone();
        images.extend((0..=D).filter(|v| !verts.contains(v)));
        let start = Perm::<D>::from_images(&images).unwrap_or_default();

        let mut embeddings = vec![FaceEmbedding {
            simplex,
            face: local,
            vertices: start,
        }];
        let mut signs: Vec<i32> = vec![1];
        let mut position: FastHashMap<(usize, usize), usize> = FastHashMap::default();
        position.insert((simplex, local), 0);
        owner[simplex * per_simplex + local] = id;

        let mut boundary = false;
        let mut consistent = true;
        let mut orientable = true;
        let mut next = 0;
        while next < embeddings.len() {
            let emb = embeddings[next];
            let sign = signs[next];
            next += 1;
            for m in (k + 1)..=D {
                let facet = emb.vertices.image(m);
                let Some((adj, gluing)) = tri.adjacent(emb.simplex, facet) else {
                    boundary = true;
                    continue;
                };
                let map = gluing.compose(&emb.vertices);
                let image_verts: SmallBuffer<usize, 8> = (0..=k).map(|i| map.image(i)).collect();
                let adj_local = face_number(D, &image_verts);
                let adj_sign = -gluing.sign() * sign;
                if let Some(&j) = position.get(&(adj, adj_local)) {
                    let existing = embeddings[j].vertices;
                    if (0..=k).any(|i| existing.image(i) != map.image(i)) {
                        consistent = false;
                    }
                    if signs[j] != adj_sign {
                        orientable = false;
                    }
                } else {
                    position.insert((adj, adj_local), embeddings.len());
                    owner[adj * per_simplex + adj_local] = id;
                    embeddings.push(FaceEmbedding {
                        simplex: adj,
                        face: adj_local,
                        vertices: map,
                    });
                    signs.push(adj_sign);
                }
            }
        }

        Face {
            dimension: k,
            embeddings,
            boundary,
            identified_consistently: consistent,
            link_orientable: orientable,
            link: None,
            link_euler: None,
        }
    }

    /// Reorders the embeddings of each valid edge of a 3-manifold triangulation
    /// cyclically around the edge.
    fn order_edges(&mut self, tri: &Triangulation<D>) {
        let swap = Perm::<D>::transposition(2, 3);
        let limit = 6 * tri.size() + 1;
        for edge in &mut self.faces[1] {
            if !edge.identified_consistently {
                continue;
            }
            let first = edge.embeddings[0];
            let step = |simplex: usize, map: Perm<D>| -> Option<(usize, Perm<D>)> {
                let (adj, gluing) = tri.adjacent(simplex, map.image(2))?;
                Some((adj, gluing.compose(&map).compose(&swap)))
            };

            let mut forward = vec![(first.simplex, first.vertices)];
            let mut hit_boundary = false;
            loop {
                let &(s, map) = forward.last().unwrap_or(&(first.simplex, first.vertices));
                match step(s, map) {
                    None => {
                        hit_boundary = true;
                        break;
                    }
                    Some(next) if next == (first.simplex, first.vertices) => break,
                    Some(next) => {
                        if forward.len() > limit {
                            break;
                        }
                        forward.push(next);
                    }
                }
            }
            if hit_boundary {
                let mut backward = Vec::new();
                let mut current = (first.simplex, first.vertices.compose(&swap));
                while let Some(next) = step(current.0, current.1) {
                    if backward.len() > limit {
                        break;
                    }
                    backward.push((next.0, next.1.compose(&swap)));
                    current = next;
                }
                backward.reverse();
                backward.extend(forward);
                forward = backward;
            }
            edge.embeddings = forward
                .into_iter()
                .map(|(simplex, vertices)| FaceEmbedding {
                    simplex,
                    face: face_number(D, &[vertices.image(0), vertices.image(1)]),
                    vertices,
                })
                .collect();
        }
    }

    /// Computes the Euler characteristic and type of every vertex link of a
    /// 3-manifold triangulation.
    #[expect(clippy::cast_possible_wrap)]
    fn classify_vertex_links(&mut self, tri: &Triangulation<D>) {
        let vertex_count = self.faces[0].len();
        let mut link_vertices = vec![0_i64; vertex_count];
        for edge in &self.faces[1] {
            let front = edge.front();
            for end in 0..2 {
                let v = self.face_of[0][front.simplex * 4 + front.vertices.image(end)];
                link_vertices[v] += 1;
            }
        }
        for (v, vertex) in self.faces[0].iter_mut().enumerate() {
            let triangles = vertex.embeddings.len() as i64;
            let open_edges = vertex.open_link_edges(tri) as i64;
            let edges = (3 * triangles + open_edges) / 2;
            let euler = link_vertices[v] - edges + triangles;
            let link = if open_edges > 0 {
                if euler == 1 && vertex.link_orientable {
                    VertexLink::Disc
                } else {
                    VertexLink::Invalid
                }
            } else {
                match (euler, vertex.link_orientable) {
                    (2, _) => VertexLink::Sphere,
                    (0, true) => VertexLink::Torus,
                    (0, false) => VertexLink::KleinBottle,
                    _ => VertexLink::OtherClosed,
                }
            };
            vertex.link = Some(link);
            vertex.link_euler = Some(euler);
        }
    }

    fn build_components(&mut self, tri: &Triangulation<D>) {
        let n = self.size;
        let mut seen = vec![false; n];
        for start in 0..n {
            if seen[start] {
                continue;
            }
            let id = self.components.len();
            let mut simplices = vec![start];
            let mut orientable = true;
            let mut boundary_facets = 0;
            seen[start] = true;
            self.orientation[start] = 1;
            let mut next = 0;
            while next < simplices.len() {
                let s = simplices[next];
                next += 1;
                self.simplex_component[s] = id;
                for facet in 0..=D {
                    let Some((adj, gluing)) = tri.adjacent(s, facet) else {
                        boundary_facets += 1;
                        continue;
                    };
                    let expected = if gluing.sign() == 1 {
                        -self.orientation[s]
                    } else {
                        self.orientation[s]
                    };
                    if seen[adj] {
                        if self.orientation[adj] != expected {
                            orientable = false;
                        }
                    } else {
                        seen[adj] = true;
                        self.orientation[adj] = expected;
                        simplices.push(adj);
                    }
                }
            }
            simplices.sort_unstable();
            self.components.push(Component {
                simplices,
                orientable,
                boundary_facets,
            });
        }
    }

    fn build_boundary_components(&mut self, tri: &Triangulation<D>) {
        let facets: Vec<(usize, usize)> = (0..self.size)
            .flat_map(|s| (0..=D).map(move |f| (s, f)))
            .filter(|&(s, f)| tri.adjacent(s, f).is_none())
            .collect();
        if !facets.is_empty() {
            let mut parent: Vec<usize> = (0..facets.len()).collect();
            if D >= 2 {
                let ridge_dim = D - 2;
                let per_simplex = face_count(D, ridge_dim);
                let mut first_on_ridge: FastHashMap<usize, usize> = FastHashMap::default();
                for (i, &(s, f)) in facets.iter().enumerate() {
                    let facet_verts: SmallBuffer<usize, 8> = (0..=D).filter(|&v| v != f).collect();
                    for skip in &facet_verts {
                        let ridge: SmallBuffer<usize, 8> =
                            facet_verts.iter().copied().filter(|v| v != skip).collect();
                        let ridge_id = self.face_of[ridge_dim][s * per_simplex + face_number(D, &ridge)];
                        match first_on_ridge.get(&ridge_id) {
                            Some(&j) => union(&mut parent, i, j),
                            None => {
                                first_on_ridge.insert(ridge_id, i);
                            }
                        }
                    }
                }
            }
            let mut groups: Vec<Vec<(usize, usize)>> = Vec::new();
            let mut group_of: FastHashMap<usize, usize> = FastHashMap::default();
            for (i, &facet) in facets.iter().enumerate() {
                let root = find(&mut parent, i);
                let g = *group_of.entry(root).or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
                groups[g].push(facet);
            }
            self.boundary_components
                .extend(groups.into_iter().map(|facets| BoundaryComponent::Real { facets }));
        }
        if D == 3 {
            for (vertex, face) in self.faces[0].iter().enumerate() {
                if face.is_ideal() {
                    self.boundary_components
                        .push(BoundaryComponent::Ideal { vertex });
                }
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Generation of the triangulation this skeleton was built from.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of top-dimensional simplices.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// All `k`-faces for `k < D`; empty for other `k`.
    #[must_use]
    pub fn faces(&self, k: usize) -> &[Face<D>] {
        self.faces.get(k).map_or(&[], Vec::as_slice)
    }

    /// Number of `k`-faces; `count_faces(D)` is the number of simplices.
    #[must_use]
    pub fn count_faces(&self, k: usize) -> usize {
        if k == D {
            self.size
        } else {
            self.faces(k).len()
        }
    }

    /// Index of the `k`-face class containing local face `local` of `simplex`.
    #[must_use]
    pub fn face_index(&self, k: usize, simplex: usize, local: usize) -> Option<usize> {
        let per_simplex = face_count(D, k);
        if local >= per_simplex {
            return None;
        }
        self.face_of.get(k)?.get(simplex * per_simplex + local).copied()
    }

    /// The `k`-face class containing local face `local` of `simplex`.
    #[must_use]
    pub fn face_of(&self, k: usize, simplex: usize, local: usize) -> Option<&Face<D>> {
        self.faces.get(k)?.get(self.face_index(k, simplex, local)?)
    }

    /// Connected components, ordered by their lowest simplex.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Index of the component containing `simplex`.
    #[must_use]
    pub fn component_of(&self, simplex: usize) -> Option<usize> {
        self.simplex_component.get(simplex).copied()
    }

    /// Orientation (`±1`) chosen for `simplex`; consistent across gluings in
    /// orientable components.
    #[must_use]
    pub fn orientation(&self, simplex: usize) -> i8 {
        self.orientation.get(simplex).copied().unwrap_or(1)
    }

    /// Real boundary components followed by ideal vertices.
    #[must_use]
    pub fn boundary_components(&self) -> &[BoundaryComponent] {
        &self.boundary_components
    }

    /// Returns `true` if every face is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.faces.iter().flatten().all(Face::is_valid)
    }

    /// Returns `true` if some vertex is ideal.
    #[must_use]
    pub fn is_ideal(&self) -> bool {
        self.faces(0).iter().any(Face::is_ideal)
    }

    /// Returns `true` if every component is orientable.
    #[must_use]
    pub fn is_orientable(&self) -> bool {
        self.components.iter().all(Component::is_orientable)
    }

    /// Returns `true` if there is at most one component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.components.len() <= 1
    }

    /// Returns `true` if some facet is unglued.
    #[must_use]
    pub fn has_boundary_facets(&self) -> bool {
        self.components.iter().any(|c| c.boundary_facets > 0)
    }

    /// Valid, without boundary facets, and not ideal.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.is_valid() && !self.has_boundary_facets() && !self.is_ideal()
    }
}

impl<const D: usize> Face<D> {
    /// Number of link edges of this vertex lying on unglued facets.
    fn open_link_edges(&self, tri: &Triangulation<D>) -> usize {
        self.embeddings
            .iter()
            .map(|emb| {
                (1..=D)
                    .filter(|&m| tri.adjacent(emb.simplex, emb.vertices.image(m)).is_none())
                    .count()
            })
            .sum()
    }
}

/// Convenience accessors for 3-manifold triangulations.
impl Skeleton<3> {
    /// Vertex classes.
    #[must_use]
    pub fn vertices(&self) -> &[Face<3>] {
        self.faces(0)
    }

    /// Edge classes.
    #[must_use]
    pub fn edges(&self) -> &[Face<3>] {
        self.faces(1)
    }

    /// Triangle classes.
    #[must_use]
    pub fn triangles(&self) -> &[Face<3>] {
        self.faces(2)
    }

    /// Index of the vertex class of vertex `v` of tetrahedron `tet`.
    #[must_use]
    pub fn vertex_of(&self, tet: usize, v: usize) -> usize {
        self.face_index(0, tet, v).unwrap_or(usize::MAX)
    }

    /// Index of the edge class of local edge `e` of tetrahedron `tet`.
    #[must_use]
    pub fn edge_of(&self, tet: usize, e: usize) -> usize {
        self.face_index(1, tet, e).unwrap_or(usize::MAX)
    }

    /// Index of the triangle class of face `f` of tetrahedron `tet`.
    #[must_use]
    pub fn triangle_of(&self, tet: usize, f: usize) -> usize {
        self.face_index(2, tet, f).unwrap_or(usize::MAX)
    }
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perm::Perm3;
    use crate::core::triangulation::Triangulation3;

    fn perm(images: [usize; 4]) -> Perm3 {
        Perm3::from_images(&images).unwrap()
    }

    // =============================================================================
    // LOCAL NUMBERING
    // =============================================================================

    #[test]
    fn test_local_numbering_round_trips() {
        for k in 0..3 {
            for local in 0..face_count(3, k) {
                let verts = face_vertices(3, k, local);
                assert_eq!(face_number(3, &verts), local, "k = {k}, local = {local}");
            }
        }
        assert_eq!(face_vertices(3, 1, 0).as_slice(), &[0, 1]);
        assert_eq!(face_vertices(3, 1, 5).as_slice(), &[2, 3]);
        assert_eq!(face_number(3, &[3, 0]), 2);
        assert_eq!(face_count(4, 1), 10);
        assert_eq!(face_number(4, &[2, 4]), 8);
    }

    // =============================================================================
    // SINGLE TETRAHEDRON
    // =============================================================================

    #[test]
    fn test_ball_skeleton() {
        let tri = Triangulation3::with_simplices(1);
        let sk = tri.skeleton();
        assert_eq!(sk.vertices().len(), 4);
        assert_eq!(sk.edges().len(), 6);
        assert_eq!(sk.triangles().len(), 4);
        assert!(sk.vertices().iter().all(|v| v.link() == Some(VertexLink::Disc)));
        assert!(sk.edges().iter().all(|e| e.is_boundary() && e.degree() == 1));
        assert!(sk.is_valid());
        assert!(!sk.is_closed());
        assert_eq!(sk.boundary_components().len(), 1);
        assert!(sk.is_orientable());
    }

    // =============================================================================
    // CLOSED AND IDEAL EXAMPLES
    // =============================================================================

    #[test]
    fn test_figure_eight_has_one_torus_cusp() {
        let tri = Triangulation3::from_gluings(
            2,
            &[
                (0, 0, 1, perm([1, 3, 0, 2])),
                (0, 1, 1, perm([2, 0, 3, 1])),
                (0, 2, 1, perm([0, 3, 2, 1])),
                (0, 3, 1, perm([2, 1, 0, 3])),
            ],
        )
        .unwrap();
        let sk = tri.skeleton();
        assert_eq!(sk.vertices().len(), 1);
        assert_eq!(sk.edges().len(), 2);
        assert_eq!(sk.triangles().len(), 4);
        assert_eq!(sk.vertices()[0].link(), Some(VertexLink::Torus));
        assert!(sk.is_ideal());
        assert!(sk.is_orientable());
        assert!(!sk.has_boundary_facets());
        assert_eq!(
            sk.boundary_components(),
            &[BoundaryComponent::Ideal { vertex: 0 }]
        );
        assert!(sk.edges().iter().all(|e| e.degree() == 6));
    }

    #[test]
    fn test_gieseking_is_non_orientable_with_klein_bottle_cusp() {
        let tri = Triangulation3::from_gluings(
            1,
            &[(0, 0, 0, perm([1, 2, 0, 3])), (0, 2, 0, perm([0, 2, 3, 1]))],
        )
        .unwrap();
        let sk = tri.skeleton();
        assert_eq!(sk.vertices().len(), 1);
        assert_eq!(sk.edges().len(), 1);
        assert_eq!(sk.vertices()[0].link(), Some(VertexLink::KleinBottle));
        assert!(!sk.is_orientable());
        assert!(sk.is_valid());
    }

    #[test]
    fn test_edge_walk_is_cyclic() {
        // One-tetrahedron S^3: faces 0/1 and 2/3 folded.
        let mut tri = Triangulation3::with_simplices(1);
        tri.join(0, 0, 0, perm([1, 0, 2, 3])).unwrap();
        tri.join(0, 3, 0, perm([0, 1, 3, 2])).unwrap();
        let sk = tri.skeleton();
        assert!(sk.is_closed());
        assert_eq!(sk.vertices()[0].link(), Some(VertexLink::Sphere));
        for edge in sk.edges() {
            let embs = edge.embeddings();
            for (i, emb) in embs.iter().enumerate() {
                let next = embs[(i + 1) % embs.len()];
                let (adj, g) = tri.adjacent(emb.simplex(), emb.vertices().image(2)).unwrap();
                assert_eq!(adj, next.simplex());
                assert_eq!(g.image(emb.vertices().image(0)), next.vertices().image(0));
                assert_eq!(g.image(emb.vertices().image(1)), next.vertices().image(1));
                assert_eq!(g.image(emb.vertices().image(2)), next.vertices().image(3));
            }
        }
    }

    #[test]
    fn test_disconnected_components() {
        let mut tri = Triangulation3::with_simplices(3);
        tri.join(0, 0, 2, perm([0, 1, 2, 3])).unwrap();
        let sk = tri.skeleton();
        assert_eq!(sk.components().len(), 2);
        assert_eq!(sk.components()[0].simplices(), &[0, 2]);
        assert_eq!(sk.component_of(1), Some(1));
        assert!(!sk.is_connected());
        assert_eq!(sk.boundary_components().len(), 2);
    }
}
