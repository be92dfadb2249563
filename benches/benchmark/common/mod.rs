use criterion::Criterion;
use form_rail::prelude::*;
use std::time::Duration;

// ============================================================================
// Test Data
// ============================================================================

/// Error set with `count` errors spread over `fields` child paths.
pub fn scattered_errors(fields: usize, count: usize) -> ErrorSet {
    (0..count)
        .map(|index| {
            let field = format!("field{}", index % fields);
            let path = Path::new([field]).unwrap_or_else(|_| Path::root());
            ValidationError::new(format!("kind{}", index), "invalid").at(path)
        })
        .collect()
}

/// Flat group of `width` text fields, every other one required.
pub fn flat_form(width: usize) -> GroupControl {
    let mut builder = GroupControl::builder();
    for index in 0..width {
        let mut field = text_control("");
        if index % 2 == 0 {
            field = field.validator(Required::new());
        }
        builder = builder.control(format!("field{}", index), field.build());
    }
    builder.build().unwrap()
}

/// Group nested `depth` levels deep with one text field at the bottom.
pub fn deep_form(depth: usize) -> (GroupControl, FieldControl<String>) {
    let leaf = text_control("").validator(Required::new()).build();
    let mut group = GroupControl::builder().control("leaf", leaf.clone()).build().unwrap();
    for level in 0..depth {
        group = GroupControl::builder().control(format!("level{}", level), group).build().unwrap();
    }
    (group, leaf)
}

pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap()
}

// ============================================================================
// Criterion Configuration
// ============================================================================

pub fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(100)
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(5))
        .noise_threshold(0.05)
}
