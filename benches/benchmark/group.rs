use crate::common::{configure_criterion, deep_form, flat_form, runtime};
use criterion::{criterion_group, BenchmarkId, Criterion};
use form_rail::prelude::*;
use std::hint::black_box;

pub fn bench_aggregation(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("group/child_write");

    for width in [4, 16, 64] {
        let form = flat_form(width);
        let field = form.field::<String>("field1").unwrap();
        let mut counter = 0_u64;

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| {
                counter += 1;
                let text = counter.to_string();
                rt.block_on(field.set_value(move |_| text)).unwrap();
                black_box(form.state())
            })
        });
    }

    group.finish();
}

pub fn bench_validate_tree(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("group/validate");

    for width in [4, 16, 64] {
        let form = flat_form(width);
        group.bench_with_input(BenchmarkId::new("flat", width), &width, |b, _| {
            b.iter(|| black_box(rt.block_on(form.validate()).unwrap()))
        });
    }

    for depth in [1, 4, 8] {
        let (form, _) = deep_form(depth);
        group.bench_with_input(BenchmarkId::new("deep", depth), &depth, |b, _| {
            b.iter(|| black_box(rt.block_on(form.validate()).unwrap()))
        });
    }

    group.finish();
}

pub fn bench_deep_propagation(c: &mut Criterion) {
    let rt = runtime();
    let (form, leaf) = deep_form(8);
    let mut toggle = false;

    c.bench_function("group/deep_leaf_write", |b| {
        b.iter(|| {
            toggle = !toggle;
            let text = if toggle { "x" } else { "" }.to_string();
            rt.block_on(leaf.set_value(move |_| text)).unwrap();
            black_box(form.state().errors().len())
        })
    });
}

criterion_group! {
    name = group_benches;
    config = configure_criterion();
    targets = bench_aggregation, bench_validate_tree, bench_deep_propagation
}
