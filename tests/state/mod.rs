use form_rail::prelude::*;

fn required_error() -> ValidationError {
    ValidationError::new("required", "value required")
}

#[test]
fn new_state_has_default_flags() {
    let state = FormState::new(String::from("x"));

    assert_eq!(state.value(), "x");
    assert!(state.errors().is_empty());
    assert!(state.enabled());
    assert!(!state.dirty());
    assert!(!state.touched());
    assert!(!state.validating());
    assert!(!state.validation_requested());
}

#[test]
fn each_mark_changes_exactly_one_field() {
    let base = FormState::new(1_i32);

    let touched = base.clone().mark_touched(true);
    assert!(touched.touched());
    assert_eq!(touched.clone().mark_touched(false), base);

    let dirty = base.clone().mark_dirty(true);
    assert!(dirty.dirty() && !dirty.touched());

    let disabled = base.clone().enable(false);
    assert!(!disabled.enabled() && disabled.value() == &1);

    let validating = base.clone().mark_validating(true).request_validation(true);
    assert!(validating.validating() && validating.validation_requested());
    assert_eq!(validating.errors(), base.errors());
}

#[test]
fn matches_compares_errors_as_sets() {
    let other = ValidationError::new("custom", "bad");
    let a = FormState::new(String::new())
        .with_errors(vec![required_error(), other.clone()].into());
    let b = FormState::new(String::new()).with_errors(vec![other, required_error()].into());

    assert!(a.matches(&b));
    assert!(!a.matches(&b.clone().with_value("y".to_string())));
}

#[test]
fn map_value_keeps_flags() {
    let state = FormState::new(2_i64).mark_touched(true).with_errors(required_error().into());

    let doubled = state.map_value(|value| value * 2);
    assert_eq!(*doubled.value(), 4);
    assert!(doubled.touched());
    assert_eq!(doubled.errors().len(), 1);
}

#[test]
fn convert_carries_errors_and_flags() {
    let state = FormState::new("12".to_string()).mark_dirty(true).with_errors(required_error().into());

    let converted = state.convert(|text| text.parse::<i32>().ok());
    assert_eq!(*converted.value(), Some(12));
    assert!(converted.dirty());
    assert_eq!(converted.errors().len(), 1);
}

#[test]
fn display_lists_value_and_flags() {
    let state = FormState::new("a".to_string());
    assert_eq!(
        state.to_string(),
        "FormState{value=\"a\" errors=[] dirty=false touched=false enabled=true validating=false validation_requested=false}"
    );
}

#[test]
fn group_state_aggregates_children() {
    let form = GroupControl::builder()
        .control("first_name", text_control("Ada").build())
        .control("age", FieldControl::new(Some(36_i32)))
        .build()
        .unwrap();

    let state = form.state();
    assert_eq!(state.value()["first_name"], FormValue::from("Ada"));
    assert_eq!(state.value()["age"], FormValue::Int(36));
    assert!(state.enabled());
    assert!(!state.touched() && !state.dirty());
    assert_eq!(state.keys().collect::<Vec<_>>(), ["age", "first_name"]);
}

#[test]
fn group_instructions_do_not_change_aggregate() {
    let form = GroupControl::builder().control("name", text_control("").build()).build().unwrap();

    let instructed = form.state().mark_touched(true).mark_dirty(true).enable(false);

    assert_eq!(instructed.form_touched(), Some(true));
    assert_eq!(instructed.form_dirty(), Some(true));
    assert_eq!(instructed.form_enabled(), Some(false));
    assert!(!instructed.touched());
    assert!(instructed.enabled());
    assert!(instructed.matches(&form.state()));
}

#[test]
fn group_level_errors_join_child_errors() {
    let form = GroupControl::builder().control("name", text_control("").build()).build().unwrap();

    let state = form.state().with_errors(ValidationError::new("mismatch", "passwords differ").into());

    assert_eq!(state.form_errors().len(), 1);
    assert_eq!(state.errors().len(), 1);
    assert!(state.errors().iter().all(|error| error.path().is_root()));
}
