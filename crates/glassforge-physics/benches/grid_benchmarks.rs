//! Collision Grid Benchmarks
//!
//! Per-tick costs of range queries, footprint maintenance and movement

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{UVec2, Vec2};
use glassforge_core::{ObjectId, Rect};
use glassforge_physics::{Body, CollisionGrid, Obstacles};

fn populated_grid(size: u32) -> CollisionGrid {
    let mut grid = CollisionGrid::new(size, size);
    for x in 0..size as i32 {
        grid.write_terrain(x, size as i32 - 1);
    }
    for i in 0..(size / 4) {
        let offset = (i * 4) as i32;
        grid.write_footprint(ObjectId(i), Rect::from_xywh(offset, offset / 2, 3, 3));
    }
    grid
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_query");

    for size in [32u32, 128, 512].iter() {
        let grid = populated_grid(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let rect = Rect::from_xywh(0, 0, size as i32 / 2, size as i32 / 2);
            b.iter(|| black_box(grid.query(black_box(rect)).len()));
        });
    }

    group.finish();
}

fn bench_footprint_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("footprint_update");

    for extent in [2i32, 8, 32].iter() {
        let mut grid = populated_grid(128);
        let id = ObjectId(9999);
        group.bench_with_input(BenchmarkId::from_parameter(extent), extent, |b, &extent| {
            let rect = Rect::from_xywh(10, 10, extent, extent);
            b.iter(|| {
                grid.clear_footprint(id, rect);
                grid.write_footprint(id, black_box(rect));
            });
        });
    }

    group.finish();
}

fn bench_body_movement(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_movement");
    let grid = populated_grid(128);
    let is_solid = |_: ObjectId| true;

    for speed in [0.5f32, 2.0, 8.0].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(speed), speed, |b, &speed| {
            let obstacles = Obstacles { grid: &grid, is_solid: &is_solid };
            b.iter(|| {
                let mut body = Body::new(1, 64).with_size(4, 4);
                for _ in 0..16 {
                    body.move_by(None, Vec2::new(speed, speed), UVec2::new(4, 4), &obstacles);
                }
                black_box(body.position())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_query,
    bench_footprint_update,
    bench_body_movement,
);

criterion_main!(benches);
