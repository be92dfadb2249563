use form_rail::prelude::*;
use form_rail::transform::{errors_when_touched, merge_errors, when, when_touched};

fn required() -> ErrorSet {
    ErrorSet::single(ValidationError::new("required", "value required"))
}

#[test]
fn when_applies_only_if_the_condition_holds() {
    let clear = |state: FormState<String>| state.with_value(String::new());

    assert_eq!(when(true, clear)(FormState::new("a".to_string())).value(), "");
    assert_eq!(when(false, clear)(FormState::new("a".to_string())).value(), "a");
}

#[test]
fn when_touched_checks_the_incoming_state() {
    let upper = || when_touched(|state: FormState<String>| state.map_value(|value| value.to_uppercase()));

    assert_eq!(upper()(FormState::new("ab".to_string())).value(), "ab");
    assert_eq!(upper()(FormState::new("ab".to_string()).mark_touched(true)).value(), "AB");
}

#[test]
fn merge_errors_moves_other_errors_to_root() {
    let other = FormState::new(0_i32).with_errors(ErrorSet::single(
        ValidationError::new("mismatch", "passwords differ").at(path!("confirm").unwrap()),
    ));
    let field = FormState::new(String::new()).with_errors(required());

    let merged = merge_errors(&other)(field);

    assert_eq!(merged.errors().len(), 2);
    assert!(merged.errors().iter().all(|error| error.path().is_root()));
}

#[test]
fn errors_are_hidden_until_touched() {
    let state = FormState::new(String::new()).with_errors(required());

    assert!(errors_when_touched(&state).is_empty());
    assert_eq!(errors_when_touched(&state.mark_touched(true)).len(), 1);
}

#[tokio::test]
async fn helpers_compose_with_transform() {
    let control = text_control("abc").build();

    let state = control.transform(when_touched(|state: FormState<String>| state.with_value(String::new()))).await.unwrap();
    assert_eq!(state.value(), "abc");

    control.mark_touched(true).await.unwrap();
    let state = control.transform(when_touched(|state: FormState<String>| state.with_value(String::new()))).await.unwrap();
    assert_eq!(state.value(), "");
}
