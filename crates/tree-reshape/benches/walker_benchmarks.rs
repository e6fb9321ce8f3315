//! Benchmarks for the tree-reshape crate.
//!
//! Run with: cargo bench --package tree-reshape
//! Or: cargo bench --package tree-reshape --bench walker_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use covjson_protocol::ParameterCatalogue;
use test_utils::{coordinate_range, TreeSpec};
use tree_reshape::{
    DenseReshaper, GridAssembler, GridDecoder, ReshapeConfig, TreeNode, TreeWalker,
};

fn ensemble_tree(grid: usize) -> (TreeSpec, TreeNode) {
    let spec = TreeSpec {
        nesting: vec!["date", "number", "param", "step", "levelist"],
        dates: vec!["20170101".into(), "20170102".into()],
        levels: vec![500, 700, 850, 1000],
        numbers: (0..5).collect(),
        params: vec!["167".into(), "130".into()],
        steps: vec![0, 6, 12],
        latitudes: coordinate_range(30.0, 0.25, grid),
        longitudes: coordinate_range(-10.0, 0.25, grid),
    };
    let tree = serde_json::from_value(spec.to_json()).expect("generated tree should deserialize");
    (spec, tree)
}

// =============================================================================
// WALK BENCHMARKS
// =============================================================================

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");
    let walker = TreeWalker::default();

    for grid in [8, 32, 64] {
        let (spec, tree) = ensemble_tree(grid);
        group.throughput(Throughput::Elements(spec.value_count() as u64));
        group.bench_with_input(BenchmarkId::new("ensemble", grid), &tree, |b, tree| {
            b.iter(|| walker.walk(black_box(tree)))
        });
    }

    group.finish();
}

// =============================================================================
// ASSEMBLY BENCHMARKS
// =============================================================================

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    let assembler = GridAssembler::new(ParameterCatalogue::ecmwf(), ReshapeConfig::default());

    for grid in [8, 32] {
        let (spec, tree) = ensemble_tree(grid);
        let walk = TreeWalker::default().walk(&tree).expect("walk should succeed");
        group.throughput(Throughput::Elements(spec.value_count() as u64));
        group.bench_with_input(BenchmarkId::new("ensemble", grid), &walk, |b, walk| {
            b.iter(|| assembler.assemble(black_box(walk)))
        });
    }

    group.finish();
}

// =============================================================================
// DENSE RESHAPE BENCHMARKS
// =============================================================================

fn bench_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense");
    let config = ReshapeConfig::default();

    for grid in [8, 32, 64] {
        let (spec, tree) = ensemble_tree(grid);
        let walk = TreeWalker::default().walk(&tree).expect("walk should succeed");
        let collection = GridAssembler::new(ParameterCatalogue::ecmwf(), config.clone())
            .assemble(&walk)
            .expect("assembly should succeed");
        let records = GridDecoder::new(config.clone())
            .decode(&collection)
            .expect("decode should succeed");
        group.throughput(Throughput::Elements(spec.value_count() as u64));

        let parallel = DenseReshaper::new(config.clone().with_parallel_threshold(0));
        group.bench_with_input(BenchmarkId::new("parallel", grid), &records, |b, records| {
            b.iter(|| parallel.reshape(black_box(records), &collection.parameters))
        });

        let serial = DenseReshaper::new(config.clone().with_parallel_threshold(usize::MAX));
        group.bench_with_input(BenchmarkId::new("serial", grid), &records, |b, records| {
            b.iter(|| serial.reshape(black_box(records), &collection.parameters))
        });
    }

    group.finish();
}

// =============================================================================
// DECODE BENCHMARKS
// =============================================================================

fn bench_decode_json(c: &mut Criterion) {
    let config = ReshapeConfig::default();
    let (_, tree) = ensemble_tree(32);
    let walk = TreeWalker::default().walk(&tree).expect("walk should succeed");
    let collection = GridAssembler::new(ParameterCatalogue::ecmwf(), config.clone())
        .assemble(&walk)
        .expect("assembly should succeed");
    let json = serde_json::to_string(&collection).expect("collection should serialize");
    let decoder = GridDecoder::new(config);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(json.len() as u64));
    group.bench_function("decode_json_32", |b| {
        b.iter(|| decoder.decode_json(black_box(&json)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_walk,
    bench_assemble,
    bench_dense,
    bench_decode_json,
);

criterion_main!(benches);
