//! Microbenchmarks for the building blocks of enumeration.
//!
//! 1. **Bitmask operations**: union, subset tests and popcount for each width
//! 2. **Ray arithmetic**: combination and primitive reduction per backend
//! 3. **Skeleton computation**: face classes of the layered families
//! 4. **Matching equations**: building the matrices for each coordinate system
//! 5. **Surface properties**: Euler characteristic and orientability of vertex surfaces

#![allow(missing_docs)] // Criterion macros generate undocumented functions

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use normal_surfaces::core::bitmask::{Bitmask, DynamicBitmask};
use normal_surfaces::prelude::*;
use num_bigint::BigInt;
use std::hint::black_box;
use std::sync::Arc;

fn masks<B: Bitmask>(len: usize) -> (B, B) {
    let mut a = B::with_len(len).unwrap();
    let mut b = B::with_len(len).unwrap();
    for i in (0..len).step_by(3) {
        a.set(i, true);
    }
    for i in (0..len).step_by(2) {
        b.set(i, true);
    }
    (a, b)
}

fn bench_mask<B: Bitmask>(c: &mut Criterion, label: &str, len: usize) {
    let (a, b) = masks::<B>(len);
    let mut group = c.benchmark_group(format!("bitmask_{label}"));
    group.bench_function("union", |bench| bench.iter(|| black_box(a.union(&b))));
    group.bench_function("is_subset_of", |bench| bench.iter(|| black_box(a.is_subset_of(&b))));
    group.bench_function("count", |bench| bench.iter(|| black_box(a.intersection(&b).count())));
    group.finish();
}

fn benchmark_bitmasks(c: &mut Criterion) {
    bench_mask::<u64>(c, "u64", 60);
    bench_mask::<u128>(c, "u128", 120);
    bench_mask::<DynamicBitmask>(c, "dynamic", 400);
}

fn benchmark_ray_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_combine");
    let len = 70;
    let left: Vec<i64> = (0..len).map(|i| (i % 7) * 6).collect();
    let right: Vec<i64> = (0..len).map(|i| (i % 5) * 4).collect();

    let (l64, r64) = (Ray::from(left.clone()), Ray::from(right.clone()));
    group.bench_function(BenchmarkId::new("combine_primitive", "i64"), |b| {
        b.iter(|| {
            let mut ray = Ray::combine(&3, &l64, &-2, &r64).unwrap();
            ray.make_primitive().unwrap();
            black_box(ray)
        });
    });

    let lbig: Ray<BigInt> = left.iter().map(|&x| BigInt::from(x)).collect();
    let rbig: Ray<BigInt> = right.iter().map(|&x| BigInt::from(x)).collect();
    let (three, minus_two) = (BigInt::from(3), BigInt::from(-2));
    group.bench_function(BenchmarkId::new("combine_primitive", "bigint"), |b| {
        b.iter(|| {
            let mut ray = Ray::combine(&three, &lbig, &minus_two, &rbig).unwrap();
            ray.make_primitive().unwrap();
            black_box(ray)
        });
    });
    group.finish();
}

fn benchmark_skeleton(c: &mut Criterion) {
    let mut group = c.benchmark_group("skeleton");
    for n in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("layered_loop", n), &n, |b, &n| {
            b.iter_batched(
                || census::layered_loop(n, true).unwrap(),
                |tri| black_box(tri.skeleton().edges().len()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn benchmark_matching_equations(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching_equations");
    let tri = census::layered_lens_space(21, 8).unwrap();
    for coords in NormalCoords::ALL {
        group.bench_function(coords.name(), |b| {
            b.iter(|| black_box(coords.system().equations(&tri).unwrap().rows()));
        });
    }
    group.finish();
}

fn benchmark_surface_properties(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_properties");
    let tri = Arc::new(census::layered_loop(6, true).unwrap());
    let list = NormalSurfaces::enumerate_with(tri, NormalCoords::Standard, NormalList::default(), NormalAlg::empty())
        .unwrap();
    let vectors: Vec<Ray<BigInt>> = list.vectors().cloned().collect();
    group.bench_function("euler_and_orientability", |b| {
        b.iter_batched(
            || {
                vectors
                    .iter()
                    .map(|v| NormalSurface::new(Arc::clone(list.triangulation()), NormalCoords::Standard, v.clone()).unwrap())
                    .collect::<Vec<_>>()
            },
            |surfaces| {
                for s in &surfaces {
                    black_box((s.euler_char(), s.is_orientable()));
                }
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_config() -> Criterion {
    use std::time::Duration;
    let mut c = Criterion::default();

    if let Some(v) = std::env::var("CRIT_SAMPLE_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
    {
        c = c.sample_size(v);
    }
    if let Some(v) = std::env::var("CRIT_MEASUREMENT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
    {
        c = c.measurement_time(Duration::from_millis(v));
    }
    c
}

criterion_group!(
    name = benches;
    config = bench_config();
    targets =
        benchmark_bitmasks,
        benchmark_ray_arithmetic,
        benchmark_skeleton,
        benchmark_matching_equations,
        benchmark_surface_properties
);
criterion_main!(benches);
