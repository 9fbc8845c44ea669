//! Benchmarks for point location and interpolation.
//!
//! Run with: `cargo bench --bench interpolation_bench`
//!
//! Measures locator construction and per-point interpolation throughput
//! on regular triangulations of increasing size.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use seisgrid::grid::GridSampler;
use seisgrid::interp::{MeshInterpolator, TriangleLocator};
use seisgrid::mesh::TriMesh;

/// Unit square split into `2·n²` triangles.
fn square_mesh(n: usize) -> TriMesh {
    let h = 1.0 / n as f64;
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push([i as f64 * h, j as f64 * h, 0.0]);
        }
    }
    let mut faces = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v0 = j * (n + 1) + i;
            let v2 = v0 + n + 1;
            faces.push([v0, v0 + 1, v2]);
            faces.push([v0 + 1, v2 + 1, v2]);
        }
    }
    TriMesh::new(vertices, faces).unwrap()
}

fn bench_locator_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("locator_build");

    for n in [50, 200, 500] {
        let mesh = square_mesh(n);
        group.throughput(Throughput::Elements(mesh.n_faces() as u64));
        group.bench_with_input(BenchmarkId::new("rtree", 2 * n * n), &mesh, |b, mesh| {
            b.iter(|| TriangleLocator::new(black_box(mesh)));
        });
    }

    group.finish();
}

fn bench_grid_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_sampling");

    let mesh = Arc::new(square_mesh(200));
    let locator = Arc::new(TriangleLocator::new(&mesh));
    let interp = MeshInterpolator::new(Arc::clone(&mesh), locator);
    let values: Vec<f64> = mesh
        .vertices()
        .iter()
        .map(|v| (3.0 * v[0]).sin() * v[1])
        .collect();

    for n_points in [100, 300, 1000] {
        let axis: Vec<f64> = (0..n_points).map(|i| i as f64 / n_points as f64).collect();
        let sampler = GridSampler::new(axis.clone(), axis).unwrap();

        group.throughput(Throughput::Elements((n_points * n_points) as u64));
        group.bench_with_input(
            BenchmarkId::new("points", format!("{0}x{0}", n_points)),
            &sampler,
            |b, sampler| {
                b.iter(|| sampler.sample(black_box(&interp), black_box(&values)).unwrap());
            },
        );
    }

    group.finish();
}

/// Points just outside the mesh take the retry path.
fn bench_misses(c: &mut Criterion) {
    let mesh = Arc::new(square_mesh(100));
    let locator = Arc::new(TriangleLocator::new(&mesh));
    let interp = MeshInterpolator::new(Arc::clone(&mesh), locator);
    let values = vec![1.0; mesh.n_vertices()];
    let points: Vec<(f64, f64)> = (0..10_000)
        .map(|i| (1.5 + i as f64 * 1e-4, 0.5))
        .collect();

    c.bench_function("interpolate_misses", |b| {
        b.iter(|| interp.interpolate(black_box(&points), black_box(&values)).unwrap());
    });
}

criterion_group!(benches, bench_locator_build, bench_grid_sampling, bench_misses);
criterion_main!(benches);
