//! Serde round trips for the persisted value types.
//!
//! Covers enumeration options, coordinate tags, named flag sets, rays and
//! triangulations, including rejection of non-reciprocal gluings.

use normal_surfaces::prelude::*;
use num_bigint::BigInt;

#[test]
fn test_options_round_trip() {
    let options = EnumerationOptionsBuilder::default()
        .coords(NormalCoords::QuadOct)
        .which(NormalList::FUNDAMENTAL | NormalList::EMBEDDED_ONLY)
        .algorithm(NormalAlg::DD)
        .integer(IntegerChoice::Native64)
        .initial_rows(4_usize)
        .build()
        .unwrap();
    let json = serde_json::to_string(&options).unwrap();
    let back: EnumerationOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[test]
fn test_default_options_round_trip() {
    let options = EnumerationOptions::default();
    let back: EnumerationOptions = serde_json::from_str(&serde_json::to_string(&options).unwrap()).unwrap();
    assert_eq!(back, options);
    assert_eq!(back.coords, NormalCoords::Standard);
}

#[test]
fn test_coordinate_tags_round_trip() {
    for coords in NormalCoords::ALL {
        let json = serde_json::to_string(&coords).unwrap();
        let back: NormalCoords = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coords);
    }
}

#[test]
fn test_flags_serialise_by_name() {
    let which = NormalList::VERTEX | NormalList::EMBEDDED_ONLY;
    assert_eq!(serde_json::to_string(&which).unwrap(), "\"VERTEX | EMBEDDED_ONLY\"");
    let back: NormalAlg = serde_json::from_str("\"DD | HILBERT_DUAL\"").unwrap();
    assert_eq!(back, NormalAlg::DD | NormalAlg::HILBERT_DUAL);
    assert_eq!(back.bits(), 0x0102);
    assert!(serde_json::from_str::<NormalAlg>("\"SIMPLEX\"").is_err());
}

#[test]
fn test_ray_serialises_as_list() {
    let ray: Ray<BigInt> = vec![BigInt::from(1), BigInt::from(0), BigInt::from(2)].into();
    let json = serde_json::to_string(&ray).unwrap();
    let back: Ray<BigInt> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ray);
}

#[test]
fn test_census_triangulations_round_trip() {
    let census = [
        census::ball(),
        census::layered_loop(3, true).unwrap(),
        census::layered_lens_space(8, 3).unwrap(),
        census::figure_eight().unwrap(),
        census::gieseking().unwrap(),
        census::twisted_kxi().unwrap(),
    ];
    for tri in census {
        let json = serde_json::to_string(&tri).unwrap();
        let back: Triangulation3 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tri);
        assert_eq!(back.skeleton().edges().len(), tri.skeleton().edges().len());
    }
}
