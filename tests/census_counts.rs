//! Vertex surface counts for the census triangulations.
//!
//! Each row lists the number of embedded vertex surfaces in quad, standard,
//! almost normal and quad-oct coordinates. The driver is left to choose its
//! algorithm, so these counts also exercise the tree traversal, the
//! via-reduced route and direct double description.

use normal_surfaces::prelude::*;
use num_bigint::BigInt;
use std::sync::Arc;

struct Scenario {
    name: &'static str,
    build: fn() -> Triangulation3,
    quad: usize,
    standard: usize,
    almost_normal: usize,
    quad_oct: Option<usize>,
}

fn c(n: usize) -> Triangulation3 {
    census::layered_loop(n, false).unwrap()
}

fn c_twisted(n: usize) -> Triangulation3 {
    census::layered_loop(n, true).unwrap()
}

fn lens(p: u64, q: u64) -> Triangulation3 {
    census::layered_lens_space(p, q).unwrap()
}

const SCENARIOS: &[Scenario] = &[
    Scenario { name: "ball", build: census::ball, quad: 3, standard: 7, almost_normal: 10, quad_oct: Some(6) },
    Scenario { name: "S3", build: || c(1), quad: 1, standard: 3, almost_normal: 4, quad_oct: Some(2) },
    Scenario { name: "C(2)", build: || c(2), quad: 3, standard: 5, almost_normal: 5, quad_oct: Some(3) },
    Scenario { name: "C~(3)", build: || c_twisted(3), quad: 4, standard: 5, almost_normal: 5, quad_oct: Some(4) },
    Scenario { name: "C~(5)", build: || c_twisted(5), quad: 6, standard: 12, almost_normal: 12, quad_oct: Some(6) },
    Scenario { name: "C~(6)", build: || c_twisted(6), quad: 7, standard: 19, almost_normal: 25, quad_oct: None },
    Scenario {
        name: "twisted KxI",
        build: || census::twisted_kxi().unwrap(),
        quad: 6,
        standard: 8,
        almost_normal: 13,
        quad_oct: Some(9),
    },
    Scenario {
        name: "figure eight",
        build: || census::figure_eight().unwrap(),
        quad: 4,
        standard: 1,
        almost_normal: 1,
        quad_oct: Some(14),
    },
    Scenario {
        name: "Gieseking",
        build: || census::gieseking().unwrap(),
        quad: 0,
        standard: 1,
        almost_normal: 1,
        quad_oct: Some(0),
    },
    Scenario { name: "L(13,3)", build: || lens(13, 3), quad: 3, standard: 6, almost_normal: 7, quad_oct: Some(4) },
    Scenario { name: "L(21,8)", build: || lens(21, 8), quad: 3, standard: 4, almost_normal: 6, quad_oct: Some(5) },
    Scenario { name: "L(8,3)", build: || lens(8, 3), quad: 1, standard: 2, almost_normal: 4, quad_oct: None },
    Scenario { name: "L(5,2)", build: || lens(5, 2), quad: 0, standard: 1, almost_normal: 1, quad_oct: None },
    Scenario { name: "L(4,1)", build: || lens(4, 1), quad: 1, standard: 2, almost_normal: 3, quad_oct: None },
    Scenario { name: "L(7,2)", build: || lens(7, 2), quad: 1, standard: 2, almost_normal: 2, quad_oct: None },
];

fn vertex_count(tri: &Arc<Triangulation3>, coords: NormalCoords) -> usize {
    NormalSurfaces::enumerate_with(Arc::clone(tri), coords, NormalList::default(), NormalAlg::empty())
        .unwrap()
        .len()
}

// =============================================================================
// COUNTS
// =============================================================================

#[test]
fn test_census_vertex_counts() {
    for scenario in SCENARIOS {
        let tri = Arc::new((scenario.build)());
        assert_eq!(vertex_count(&tri, NormalCoords::Quad), scenario.quad, "{} quad", scenario.name);
        assert_eq!(
            vertex_count(&tri, NormalCoords::Standard),
            scenario.standard,
            "{} standard",
            scenario.name
        );
        assert_eq!(
            vertex_count(&tri, NormalCoords::AlmostNormal),
            scenario.almost_normal,
            "{} almost normal",
            scenario.name
        );
        if let Some(expected) = scenario.quad_oct {
            assert_eq!(vertex_count(&tri, NormalCoords::QuadOct), expected, "{} quad-oct", scenario.name);
        }
    }
}

#[test]
fn test_empty_triangulation_has_no_surfaces() {
    let empty = Arc::new(Triangulation3::new());
    for coords in NormalCoords::ALL {
        let list =
            NormalSurfaces::enumerate_with(Arc::clone(&empty), coords, NormalList::default(), NormalAlg::empty())
                .unwrap();
        assert!(list.is_empty(), "{coords}");
        assert!(!list.is_cancelled());
    }
}

// =============================================================================
// PROPERTIES OF KNOWN SURFACES
// =============================================================================

#[test]
fn test_single_tetrahedron_standard_surfaces() {
    let list = NormalSurfaces::enumerate_with(
        Arc::new(census::ball()),
        NormalCoords::Standard,
        NormalList::default(),
        NormalAlg::empty(),
    )
    .unwrap();
    assert_eq!(list.len(), 7);

    let links: Vec<&NormalSurface> = list.iter().filter(|s| s.is_vertex_linking()).collect();
    assert_eq!(links.len(), 4);
    for link in links {
        assert_eq!(link.euler_char(), Some(BigInt::from(1)));
        assert_eq!(link.is_connected(), Some(true));
        assert!(link.has_real_boundary());
    }
    let quads: Vec<&NormalSurface> = list.iter().filter(|s| s.is_splitting()).collect();
    assert_eq!(quads.len(), 3);
    for quad in quads {
        assert_eq!(quad.euler_char(), Some(BigInt::from(1)));
        assert_eq!(quad.is_two_sided(), Some(true));
    }
}

#[test]
fn test_lens_space_quad_surface() {
    // L(8,3) has a single quad vertex surface, closed and compact.
    let list = NormalSurfaces::enumerate_with(
        Arc::new(lens(8, 3)),
        NormalCoords::Quad,
        NormalList::default(),
        NormalAlg::empty(),
    )
    .unwrap();
    assert_eq!(list.len(), 1);
    let surface = &list[0];
    assert!(surface.is_compact());
    assert!(!surface.has_real_boundary());
    assert!(!surface.is_vertex_linking());
}

#[test]
fn test_figure_eight_quad_oct_euler_bound() {
    let list = NormalSurfaces::enumerate_with(
        Arc::new(census::figure_eight().unwrap()),
        NormalCoords::QuadOct,
        NormalList::default(),
        NormalAlg::empty(),
    )
    .unwrap();
    assert_eq!(list.len(), 14);
    for surface in &list {
        if let Some(chi) = surface.euler_char() {
            assert!(chi <= BigInt::from(0), "χ = {chi} for {surface}");
        }
    }

    let quads = NormalSurfaces::enumerate_with(
        Arc::new(census::figure_eight().unwrap()),
        NormalCoords::Quad,
        NormalList::default(),
        NormalAlg::empty(),
    )
    .unwrap();
    assert_eq!(quads.len(), 4);
    assert!(quads.iter().all(|s| !s.is_compact()));
}

#[test]
fn test_twisted_loops_are_thin_edge_links() {
    for n in 3..=6 {
        let list = NormalSurfaces::enumerate_with(
            Arc::new(c_twisted(n)),
            NormalCoords::Quad,
            NormalList::default(),
            NormalAlg::empty(),
        )
        .unwrap();
        assert_eq!(list.len(), n + 1);
        for surface in &list {
            let (first, second) = surface.is_thin_edge_link();
            assert!(first.is_some(), "C~({n}): {surface}");
            assert!(second.is_none(), "C~({n}): {surface}");
        }
    }
}

#[test]
fn test_untwisted_loop_has_double_edge_link() {
    let list = NormalSurfaces::enumerate_with(
        Arc::new(c(4)),
        NormalCoords::Quad,
        NormalList::default(),
        NormalAlg::empty(),
    )
    .unwrap();
    let doubles = list
        .iter()
        .filter(|s| matches!(s.is_thin_edge_link(), (Some(_), Some(_))))
        .count();
    assert_eq!(doubles, 1);
    assert!(list.iter().all(|s| s.is_thin_edge_link().0.is_some()));
}

#[test]
fn test_via_reduced_standard_rays_are_primitive() {
    // Reducing against later vertex links leaves a common factor in some
    // converted rays of C(4).
    let tri = Arc::new(c(4));
    let via = NormalSurfaces::enumerate_with(
        Arc::clone(&tri),
        NormalCoords::Standard,
        NormalList::default(),
        NormalAlg::empty(),
    )
    .unwrap();
    assert!(via.algorithm().contains(NormalAlg::VIA_REDUCED));
    for ray in via.vectors() {
        assert_eq!(ray.content().unwrap(), BigInt::from(1), "{ray}");
    }

    let direct = NormalSurfaces::enumerate_with(
        tri,
        NormalCoords::Standard,
        NormalList::default(),
        NormalAlg::DD | NormalAlg::STANDARD_DIRECT,
    )
    .unwrap();
    let mut via: Vec<Ray<BigInt>> = via.vectors().cloned().collect();
    let mut direct: Vec<Ray<BigInt>> = direct.vectors().cloned().collect();
    via.sort();
    direct.sort();
    assert_eq!(via, direct);
}
