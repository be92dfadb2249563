use crate::common::{configure_criterion, runtime};
use criterion::{criterion_group, Criterion};
use form_rail::prelude::*;
use std::hint::black_box;

pub fn bench_builtin_validators(c: &mut Criterion) {
    let rt = runtime();
    let email = Pattern::new(r"[^@\s]+@[^@\s]+").unwrap();
    let required = Required::new();
    let state = FormState::new("user@example.org".to_string());

    let mut group = c.benchmark_group("validation/builtin");

    group.bench_function("required", |b| {
        b.iter(|| black_box(rt.block_on(required.validate(&state)).unwrap()))
    });
    group.bench_function("pattern", |b| {
        b.iter(|| black_box(rt.block_on(email.validate(&state)).unwrap()))
    });

    group.finish();
}

pub fn bench_field_validate(c: &mut Criterion) {
    let rt = runtime();
    let control = text_control("")
        .validator(Required::new())
        .validator(Pattern::new(r"\d+").unwrap())
        .validator(validator_fn(|state: FormState<String>| async move {
            let mut errors = ErrorSet::new();
            if state.value().len() > 10 {
                errors.push(ValidationError::new("length", "too long"));
            }
            Ok::<_, ValidatorFailure>(errors)
        }))
        .build();

    c.bench_function("validation/field_three_validators", |b| {
        b.iter(|| black_box(rt.block_on(control.validate()).unwrap()))
    });
}

criterion_group! {
    name = validation_benches;
    config = configure_criterion();
    targets = bench_builtin_validators, bench_field_validate
}
