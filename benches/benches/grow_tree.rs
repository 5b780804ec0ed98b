// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use curlicue_geom::Boundary;
use curlicue_tree::{DumpFlags, ScrollConfig, ScrollTree, SizeMode};
use kurbo::{Point, Rect};

fn rect_region() -> Boundary {
    Boundary::from_rect(Rect::new(0.0, 0.0, 1200.0, 900.0)).unwrap()
}

/// A regular polygon approximating a circle of radius 500.
fn round_region(sides: usize) -> Boundary {
    let step = core::f64::consts::TAU / sides as f64;
    Boundary::new((0..sides).map(|i| {
        let a = i as f64 * step;
        Point::new(600.0 + 500.0 * a.cos(), 600.0 + 500.0 * a.sin())
    }))
    .unwrap()
}

fn bench_grow(c: &mut Criterion) {
    let mut group = c.benchmark_group("grow");
    for &max_nodes in &[50_usize, 200, 800] {
        for (label, size_mode, twin) in [
            ("uniform", SizeMode::Uniform, false),
            ("large_to_small", SizeMode::LargeToSmall, false),
            ("small_to_large_twin", SizeMode::SmallToLarge, true),
        ] {
            let config = ScrollConfig {
                max_nodes,
                size_mode,
                twin,
                seed: 11,
                ..ScrollConfig::default()
            };
            group.throughput(Throughput::Elements(max_nodes as u64));
            group.bench_function(format!("rect/{label}/{max_nodes}"), |b| {
                b.iter_batched(
                    || ScrollTree::new(config.clone(), rect_region()).unwrap(),
                    |mut tree| {
                        let report = tree.grow();
                        black_box((report, tree.len()));
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_round_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("grow_round");
    for &sides in &[8_usize, 32, 128] {
        let config = ScrollConfig {
            max_nodes: 200,
            seed: 5,
            ..ScrollConfig::default()
        };
        group.bench_function(format!("sides/{sides}"), |b| {
            b.iter_batched(
                || ScrollTree::new(config.clone(), round_region(sides)).unwrap(),
                |mut tree| {
                    tree.grow();
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_paths(c: &mut Criterion) {
    let mut tree = ScrollTree::new(
        ScrollConfig {
            max_nodes: 400,
            seed: 3,
            ..ScrollConfig::default()
        },
        rect_region(),
    )
    .unwrap();
    tree.grow();

    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(tree.len() as u64));
    group.bench_function("spiral_points", |b| {
        b.iter(|| {
            let count: usize = tree.spiral_paths().map(Iterator::count).sum();
            black_box(count);
        });
    });
    group.bench_function("envelope_points", |b| {
        b.iter(|| {
            let count: usize = tree.nodes().iter().map(|n| n.envelope_points().count()).sum();
            black_box(count);
        });
    });
    group.bench_function("dump_all", |b| {
        b.iter(|| black_box(tree.dump(DumpFlags::all()).to_string().len()));
    });
    group.finish();
}

criterion_group!(benches, bench_grow, bench_round_region, bench_paths);
criterion_main!(benches);
