use criterion::criterion_main;

mod common;
mod error_set;
mod group;
mod validation;

criterion_main!(
    error_set::error_set_benches,
    group::group_benches,
    validation::validation_benches,
);
