//! Benchmarks for face-to-node aggregation and mesh reprojection.
//!
//! Run with: `cargo bench --bench aggregation_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use seisgrid::crs::{Crs, CrsTransform, reproject_mesh};
use seisgrid::mesh::{NodeAggregator, TriMesh};

/// Regular triangulation in UTM zone 35N, 1 km spacing.
fn utm_mesh(n: usize) -> TriMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            let x = 400_000.0 + i as f64 * 1000.0;
            let y = 4_000_000.0 + j as f64 * 1000.0;
            vertices.push([x, y, -(i + j) as f64]);
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

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for n in [100, 300] {
        let mesh = utm_mesh(n);
        let aggregator = NodeAggregator::new(&mesh).unwrap();
        let samples: Vec<f64> = (0..mesh.n_faces()).map(|f| (f % 17) as f64).collect();

        group.bench_with_input(BenchmarkId::new("faces", mesh.n_faces()), &samples, |b, s| {
            b.iter(|| aggregator.aggregate(black_box(s)).unwrap());
        });
    }

    group.finish();
}

fn bench_reproject(c: &mut Criterion) {
    let mesh = utm_mesh(200).flatten();
    let transform = CrsTransform::new(&Crs::parse("EPSG:32635").unwrap(), &Crs::wgs84());

    c.bench_function("reproject_utm_to_wgs84", |b| {
        b.iter(|| reproject_mesh(black_box(&mesh), &transform).unwrap());
    });
}

criterion_group!(benches, bench_aggregate, bench_reproject);
criterion_main!(benches);
