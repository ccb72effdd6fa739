//! Criterion benchmarks for the three-site vertex solvers, in `f64` and double-double.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use planevd::numeric::Dd;
use planevd::point::Point;
use planevd::site::Site;
use planevd::solver::solve;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_point(rng: &mut StdRng) -> Point {
    Point::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
}

fn point_triples(seed: u64) -> Vec<[Site; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..256)
        .map(|_| {
            [
                Site::point(random_point(&mut rng)),
                Site::point(random_point(&mut rng)),
                Site::point(random_point(&mut rng)),
            ]
        })
        .collect()
}

fn mixed_triples(seed: u64) -> Vec<[Site; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..256)
        .map(|_| {
            let a = random_point(&mut rng);
            let b = random_point(&mut rng);
            [
                Site::point(random_point(&mut rng)),
                Site::line(a, b, 1.0),
                Site::point(random_point(&mut rng)),
            ]
        })
        .collect()
}

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver");
    for (name, make) in [
        ("ppp", point_triples as fn(u64) -> Vec<[Site; 3]>),
        ("ppl", mixed_triples),
    ] {
        group.bench_function(format!("{name}_f64"), |b| {
            b.iter_batched(
                || make(3),
                |triples| {
                    for [s1, s2, s3] in &triples {
                        let _ = solve::<f64>(s1, s2, s3);
                    }
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("{name}_dd"), |b| {
            b.iter_batched(
                || make(3),
                |triples| {
                    for [s1, s2, s3] in &triples {
                        let _ = solve::<Dd>(s1, s2, s3);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
