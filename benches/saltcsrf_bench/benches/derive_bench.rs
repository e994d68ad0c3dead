//! Derivation and validation benchmarks
//!
//! Derivation is deliberately expensive; these benches track its cost and how
//! validation scales with the number of retired salts kept in the list.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use saltcsrf_core::{derive_hash, CsrfGuard, CsrfToken, Salt, SaltList};

/// Benchmark token generation
fn bench_token_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("token");

    group.bench_function("generate", |b| b.iter(CsrfToken::generate));

    group.finish();
}

/// Benchmark a single scrypt derivation
fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive");
    group.sample_size(10);

    group.bench_function("scrypt_n15_r8_p1", |b| {
        b.iter(|| derive_hash(black_box("thetoken"), black_box("thesalt")))
    });

    group.finish();
}

/// Benchmark validation when the match is at the end of the list
fn bench_validate_rotation_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_rotation_depth");
    group.sample_size(10);

    let issued = CsrfGuard::new(SaltList::parse("oldest"))
        .generate()
        .expect("bench setup");

    for depth in [1usize, 2, 4].iter() {
        let mut salts = SaltList::parse("oldest");
        for idx in 1..*depth {
            salts = salts
                .rotate(Salt::new(format!("salt-{}", idx)), *depth)
                .expect("bench setup");
        }
        let guard = CsrfGuard::new(salts);

        group.bench_with_input(BenchmarkId::new("salts", depth), depth, |b, _| {
            b.iter(|| {
                guard.validate(
                    black_box(issued.token().as_str()),
                    black_box(issued.hash().as_str()),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_token_generate,
    bench_derive,
    bench_validate_rotation_depth,
);

criterion_main!(benches);
