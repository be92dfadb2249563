use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use form_rail::prelude::*;

fn counting_validator(
    calls: Arc<AtomicUsize>,
) -> impl Validator<FormState<String>> + 'static {
    validator_fn(move |_state: FormState<String>| {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ValidatorFailure>(ErrorSet::new())
        }
    })
}

#[tokio::test]
async fn required_field_reports_error_until_filled() {
    let control = text_control("").validator(Required::new()).build();

    let state = control.validate().await.unwrap();
    let errors: Vec<_> = state.errors().iter().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "required");
    assert!(errors[0].path().is_root());

    control.transform(|state| state.with_value("x".to_string())).await.unwrap();
    let state = control.validate().await.unwrap();
    assert!(state.errors().is_empty());
}

#[tokio::test]
async fn transform_runs_live_validation() {
    let control = text_control("ok").validator(Required::new()).build();

    let state = control.set_value(|_| "   ".to_string()).await.unwrap();

    assert_eq!(state.value(), "   ");
    assert_eq!(state.errors().len(), 1);
    assert!(!state.validating());
    assert!(!state.validation_requested());
}

#[tokio::test]
async fn validate_is_idempotent() {
    let control = text_control("").validator(Required::new()).build();

    let first = control.validate().await.unwrap();
    let second = control.validate().await.unwrap();

    assert!(first.matches(&second));
}

#[tokio::test]
async fn validators_results_are_unioned() {
    let control = text_control("abc")
        .validator(Pattern::new(r"\d+").unwrap())
        .validator(validator_fn(|_state: FormState<String>| async {
            Ok::<_, ValidatorFailure>(ErrorSet::single(ValidationError::new("custom", "never valid")))
        }))
        .build();

    let state = control.validate().await.unwrap();

    let kinds: Vec<_> = state.errors().iter().map(|error| error.kind().to_string()).collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&"pattern".to_string()));
    assert!(kinds.contains(&"custom".to_string()));
}

#[tokio::test]
async fn disabling_clears_errors_without_running_validators() {
    let calls = Arc::new(AtomicUsize::new(0));
    let control = text_control("")
        .validator(Required::new())
        .validator(counting_validator(Arc::clone(&calls)))
        .build();

    control.validate().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let state = control.enable(false).await.unwrap();
    assert!(!state.enabled());
    assert!(state.errors().is_empty());

    let state = control.validate().await.unwrap();
    assert!(state.errors().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let state = control.enable(true).await.unwrap();
    assert_eq!(state.errors().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failing_validator_is_reported_after_commit() {
    let control = text_control("")
        .validator(Required::new())
        .validator(validator_fn(|_state: FormState<String>| async {
            Err::<ErrorSet, _>(ValidatorFailure::new("lookup unavailable"))
        }))
        .build();

    let result = control.validate().await;

    assert_eq!(result, Err(ControlError::Validator(ValidatorFailure::new("lookup unavailable"))));
    let state = control.state();
    assert!(!state.validating());
    assert_eq!(state.errors().len(), 1);
}

#[tokio::test]
async fn panicking_validator_leaves_control_usable() {
    let control = text_control("")
        .validator(validator_fn(|state: FormState<String>| async move {
            if state.value().is_empty() {
                panic!("validator bug");
            }
            Ok::<_, ValidatorFailure>(ErrorSet::new())
        }))
        .build();

    let result = control.validate().await;
    assert!(matches!(result, Err(ControlError::Validator(_))));
    assert!(!control.state().validating());

    let state = control.set_value(|_| "fine".to_string()).await.unwrap();
    assert!(state.errors().is_empty());
}

#[tokio::test]
async fn live_validation_can_be_turned_off() {
    let control = text_control("x")
        .validator(Required::new())
        .config(ControlConfig::new().with_live_validation(false))
        .build();

    let state = control.set_value(|_| String::new()).await.unwrap();
    assert!(state.errors().is_empty());

    let state = control.validate().await.unwrap();
    assert_eq!(state.errors().len(), 1);
}

#[tokio::test]
async fn validate_marks_state_requested_while_running() {
    let control = text_control("").validator(Required::new()).build();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    control.register_callback(move |state: &FormState<String>| {
        sink.lock().unwrap().push((state.validating(), state.validation_requested()));
    });

    control.validate().await.unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![(true, true), (false, false)]);
}

#[tokio::test]
async fn touch_and_dirty_helpers() {
    let control = FieldControl::new(Some(3_i32));

    control.mark_touched(true).await.unwrap();
    let state = control.mark_dirty(true).await.unwrap();

    assert!(state.touched());
    assert!(state.dirty());
    assert_eq!(*state.value(), Some(3));
}

#[tokio::test]
async fn builder_can_start_from_a_state() {
    let control = FieldControl::builder(0_i64).state(FormState::new(7_i64).mark_touched(true)).build();

    assert_eq!(*control.state().value(), 7);
    assert!(control.state().touched());
}

#[test]
fn binding_to_a_field_is_rejected() {
    let child = text_control("").build();
    let not_a_group = text_control("").build();

    assert_eq!(child.bind_to(&not_a_group), Err(BindingError::NotAGroup));
    assert!(!child.is_bound());
}

#[test]
fn binding_twice_is_rejected() {
    let child = text_control("").build();
    let first = GroupControl::builder().build().unwrap();
    let second = GroupControl::builder().build().unwrap();

    assert_eq!(child.bind_to(&first), Ok(()));
    assert_eq!(child.bind_to(&second), Err(BindingError::AlreadyBound));
}

#[test]
fn clones_share_the_control() {
    let control = text_control("a").build();
    let clone = control.clone();

    assert!(control.ptr_eq(&clone));
    assert!(!control.ptr_eq(&text_control("a").build()));
}
