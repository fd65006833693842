//! Euler characteristic and topology validation on census triangulations and
//! on triangulations produced by cutting along surfaces.

use normal_surfaces::prelude::*;
use normal_surfaces::topology::characteristics::euler::{self, TopologyClassification};
use normal_surfaces::topology::characteristics::validation;
use std::sync::Arc;

#[test]
fn test_closed_census_has_zero_chi() {
    let closed = [
        census::layered_loop(1, false).unwrap(),
        census::layered_loop(4, true).unwrap(),
        census::layered_lens_space(7, 2).unwrap(),
        census::layered_lens_space(21, 8).unwrap(),
    ];
    for tri in closed {
        let result = validation::validate(&tri).unwrap();
        assert_eq!(result.classification, TopologyClassification::Closed(3));
        assert_eq!(result.chi, 0);
        assert_eq!(result.expected, Some(0));
        assert!(result.is_valid());
    }
}

#[test]
fn test_ideal_census_counts_ideal_vertices() {
    for tri in [census::figure_eight().unwrap(), census::gieseking().unwrap()] {
        let result = validation::validate(&tri).unwrap();
        assert_eq!(result.classification, TopologyClassification::Ideal(3));
        assert_eq!(result.chi, 1);
    }
    let gieseking = validation::validate(&census::gieseking().unwrap()).unwrap();
    assert!(gieseking.notes.iter().any(|n| n.contains("non-orientable")));
}

#[test]
fn test_single_tetrahedron() {
    let counts = euler::f_vector(&census::ball());
    assert_eq!(counts.by_dim, vec![4, 6, 4, 1]);
    assert_eq!(
        euler::classify(&census::ball()),
        TopologyClassification::SingleSimplex(3)
    );
}

#[test]
fn test_cut_pieces_have_expected_chi() {
    // Cutting S³ along a vertex link leaves two balls.
    let sphere = Arc::new(census::layered_loop(1, false).unwrap());
    let list = NormalSurfaces::enumerate_with(
        Arc::clone(&sphere),
        NormalCoords::Standard,
        NormalList::default(),
        NormalAlg::empty(),
    )
    .unwrap();
    for surface in &list {
        let pieces = surface.cut_along().unwrap();
        let result = validation::validate(&pieces).unwrap();
        assert_eq!(result.classification, TopologyClassification::WithBoundary(3));
        let expected = if surface.is_vertex_linking() { 2 } else { 0 };
        assert_eq!(result.chi, expected, "{surface}");
    }
}
