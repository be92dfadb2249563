use crate::common::{configure_criterion, scattered_errors};
use criterion::{criterion_group, BenchmarkId, Criterion};
use form_rail::prelude::*;
use std::hint::black_box;

pub fn bench_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_set/replace");

    for count in [4, 32, 256] {
        let base = scattered_errors(8, count);
        let incoming = scattered_errors(1, 4);
        let path = path!("field3").unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(base.replace(&path, incoming.clone())))
        });
    }

    group.finish();
}

pub fn bench_union_and_matches(c: &mut Criterion) {
    let left = scattered_errors(8, 64);
    let right = scattered_errors(16, 64);

    let mut group = c.benchmark_group("error_set");

    group.bench_function("union", |b| b.iter(|| black_box(left.union(&right))));
    group.bench_function("matches_reordered", |b| {
        let reversed: ErrorSet = left.iter().rev().cloned().collect();
        b.iter(|| black_box(left.matches(&reversed)))
    });
    group.bench_function("at_path", |b| {
        let path = path!("field5").unwrap();
        b.iter(|| black_box(left.at(&path)))
    });

    group.finish();
}

criterion_group! {
    name = error_set_benches;
    config = configure_criterion();
    targets = bench_replace, bench_union_and_matches
}
