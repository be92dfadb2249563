use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use form_rail::prelude::*;

fn counted_control(calls: Arc<AtomicUsize>) -> FieldControl<String> {
    text_control("")
        .validator(validator_fn(move |_state: FormState<String>| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ValidatorFailure>(ErrorSet::new())
            }
        }))
        .build()
}

#[tokio::test]
async fn last_write_wins() {
    let calls = Arc::new(AtomicUsize::new(0));
    let control = counted_control(Arc::clone(&calls));

    let (first, second) = tokio::join!(
        control.transform(|state| state.with_value("first".to_string())),
        control.transform(|state| state.with_value("second".to_string())),
    );

    assert_eq!(second.unwrap().value(), "second");
    assert_ne!(first.unwrap().value(), "first");
    assert_eq!(control.state().value(), "second");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn superseded_validation_does_not_commit() {
    let control = text_control("")
        .validator(validator_fn(|state: FormState<String>| async move {
            if state.value() == "slow" {
                tokio::time::sleep(Duration::from_millis(200)).await;
                return Ok::<_, ValidatorFailure>(ErrorSet::single(ValidationError::new("stale", "from the slow run")));
            }
            Ok::<_, ValidatorFailure>(ErrorSet::new())
        }))
        .build();

    let slow = {
        let control = control.clone();
        tokio::spawn(async move { control.set_value(|_| "slow".to_string()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(control.state().validating());

    let state = control.set_value(|_| "fast".to_string()).await.unwrap();
    slow.await.unwrap().unwrap();

    assert_eq!(state.value(), "fast");
    assert!(state.errors().is_empty());
    assert!(!control.state().validating());
    assert!(control.state().errors().is_empty());
}

#[tokio::test]
async fn validate_does_not_cancel_value_writes() {
    let control = text_control("").validator(Required::new()).build();

    let (written, validated) = tokio::join!(control.set_value(|_| "kept".to_string()), control.validate());

    written.unwrap();
    validated.unwrap();
    let state = control.state();
    assert_eq!(state.value(), "kept");
    assert!(state.errors().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_children_writes_converge() {
    let mut builder = GroupControl::builder();
    for index in 0..8 {
        builder = builder.control(format!("f{index}"), text_control("").validator(Required::new()).build());
    }
    let form = builder.build().unwrap();

    let mut tasks = Vec::new();
    for index in 0..8 {
        let field = form.field::<String>(&format!("f{index}")).unwrap();
        tasks.push(tokio::spawn(async move { field.set_value(move |_| format!("v{index}")).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let state = form.state();
    assert_eq!(state.value().len(), 8);
    assert_eq!(state.value()["f3"], FormValue::from("v3"));
    assert!(state.errors().is_empty());
}

#[tokio::test]
async fn dedicated_runtime_handle_is_used() {
    let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build().unwrap();
    let control = text_control("")
        .validator(Required::new())
        .config(ControlConfig::new().with_runtime(runtime.handle().clone()))
        .build();

    let state = control.validate().await.unwrap();
    assert_eq!(state.errors().len(), 1);

    runtime.shutdown_background();
}

#[tokio::test]
async fn child_change_during_group_validation_is_not_lost() {
    let a = text_control("").build();
    let b = text_control("").build();
    let form = GroupControl::builder()
        .control("a", a.clone())
        .control("b", b.clone())
        .validator(validator_fn(|state: FormGroupState| async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let mut errors = ErrorSet::new();
            if state.value().get("a") != state.value().get("b") {
                errors.push(ValidationError::new("mismatch", "fields differ"));
            }
            Ok::<_, ValidatorFailure>(errors)
        }))
        .build()
        .unwrap();

    let first = {
        let a = a.clone();
        tokio::spawn(async move { a.set_value(|_| "x".to_string()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(form.state().validating());
    b.set_value(|_| "x".to_string()).await.unwrap();
    first.await.unwrap().unwrap();

    let state = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let state = form.state();
            if !state.validating() && state.errors().is_empty() {
                break state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("group revalidates with the latest child values");

    assert_eq!(state.value()["a"], FormValue::from("x"));
    assert_eq!(state.value()["b"], FormValue::from("x"));
}
