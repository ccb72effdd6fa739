//! Criterion benchmarks for incremental diagram construction.
//! Sizes: n in {10, 100, 1000} random points; closed star polygons with 8 and 32 segments.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use planevd::point::Point;
use planevd::sample::{random_points, random_polygon, PointCloudCfg, PolygonCfg, ReplayToken};
use planevd::VoronoiDiagram;

fn build_cloud(pts: &[Point], bins: usize) -> VoronoiDiagram {
    let mut vd = VoronoiDiagram::new(1.0, bins).unwrap();
    for &p in pts {
        vd.insert_point_site(p).unwrap();
    }
    vd
}

/// Insert the polygon's corners and close it with segments; returns the diagram and how
/// many segments went in.
fn build_polygon(pts: &[Point]) -> (VoronoiDiagram, usize) {
    let mut vd = VoronoiDiagram::new(1.0, 8).unwrap();
    let ids: Vec<_> = pts.iter().map(|&p| vd.insert_point_site(p).unwrap()).collect();
    let closed = (0..ids.len())
        .filter(|&i| vd.insert_line_site(ids[i], ids[(i + 1) % ids.len()]).is_ok())
        .count();
    (vd, closed)
}

fn bench_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_points");
    for &n in &[10usize, 100, 1000] {
        let cfg = PointCloudCfg {
            count: n,
            radius: 0.9,
            min_separation: 1e-4,
        };
        let bins = ((n as f64).sqrt().ceil() as usize).max(1);
        let tok = ReplayToken::new(42, n as u64);
        assert_eq!(build_cloud(&random_points(cfg, tok), bins).num_point_sites(), n);
        group.bench_with_input(BenchmarkId::new("random_cloud", n), &n, |b, _| {
            b.iter_batched(
                || random_points(cfg, tok),
                |pts| build_cloud(&pts, bins),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_polygons(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_polygon");
    for &n in &[8usize, 32] {
        let cfg = PolygonCfg {
            vertices: n,
            ..PolygonCfg::default()
        };
        let tok = ReplayToken::new(7, n as u64);
        let (_, closed) = build_polygon(&random_polygon(cfg, tok));
        assert_eq!(closed, n, "star polygon {n} did not close");
        group.bench_with_input(BenchmarkId::new("star_polygon", n), &n, |b, _| {
            b.iter_batched(
                || random_polygon(cfg, tok),
                |pts| build_polygon(&pts),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_points, bench_polygons);
criterion_main!(benches);
