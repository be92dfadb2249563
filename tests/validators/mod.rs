use form_rail::prelude::*;

fn kinds(errors: &ErrorSet) -> Vec<String> {
    errors.iter().map(|error| error.kind().to_string()).collect()
}

#[tokio::test]
async fn required_rejects_blank_text_and_none() {
    let required = Required::new();

    for blank in ["", "   ", "\t\n"] {
        let errors = required.validate(&FormState::new(blank.to_string())).await.unwrap();
        assert_eq!(kinds(&errors), ["required"], "{blank:?} is blank");
    }
    let errors = required.validate(&FormState::new(" x ".to_string())).await.unwrap();
    assert!(errors.is_empty());

    let errors = required.validate(&FormState::new(None::<i32>)).await.unwrap();
    assert_eq!(errors.iter().next().unwrap().message(), "value required");
    let errors = required.validate(&FormState::new(Some(0_i32))).await.unwrap();
    assert!(errors.is_empty());
}

#[tokio::test]
async fn required_message_can_be_replaced() {
    let required = Required::with_message("please fill in");

    let errors = required.validate(&FormState::new(String::new())).await.unwrap();

    assert_eq!(errors.iter().next().unwrap().message(), "please fill in");
}

#[tokio::test]
async fn pattern_matches_the_whole_value() {
    let digits = Pattern::new(r"\d+").unwrap();

    assert!(digits.is_match("123"));
    assert!(!digits.is_match("12a"));
    assert!(!digits.is_match("a12"));

    let errors = digits.validate(&FormState::new("x1".to_string())).await.unwrap();
    let error = errors.iter().next().unwrap();
    assert_eq!(error.kind(), "pattern");
    assert_eq!(error.message(), "wrong value");
    assert!(error.path().is_root());
}

#[test]
fn pattern_rejects_invalid_regex() {
    assert!(Pattern::new("(").is_err());
}

#[tokio::test]
async fn pattern_alternation_is_anchored_as_a_whole() {
    let pattern = Pattern::new("a|b").unwrap().message("a or b");

    assert!(pattern.is_match("a"));
    assert!(!pattern.is_match("ab"));
    let errors = pattern.validate(&FormState::new("ab".to_string())).await.unwrap();
    assert_eq!(errors.iter().next().unwrap().message(), "a or b");
}

#[tokio::test]
async fn min_and_max_bound_integers() {
    let min = Min::new(18);
    let max = Max::new(99);

    let errors = min.validate(&FormState::new(Some(17_i32))).await.unwrap();
    assert_eq!(kinds(&errors), ["min"]);
    assert_eq!(errors.iter().next().unwrap().message(), "must be greater than 18");
    assert!(min.validate(&FormState::new(Some(18_i32))).await.unwrap().is_empty());

    let errors = max.validate(&FormState::new(100_i64)).await.unwrap();
    assert_eq!(errors.iter().next().unwrap().message(), "must be lower than 99");
    assert!(max.validate(&FormState::new(99_i64)).await.unwrap().is_empty());
}

#[tokio::test]
async fn bounds_ignore_missing_values() {
    assert!(Min::new(1).validate(&FormState::new(None::<i32>)).await.unwrap().is_empty());
    assert!(Max::new(1).validate(&FormState::new(None::<i32>)).await.unwrap().is_empty());
}

#[tokio::test]
async fn apply_when_waits_for_interaction() {
    let dirty_only = Required::new().apply_when(true, false);
    let touched_only = Required::new().apply_when(false, true);
    let pristine = FormState::new(String::new());

    assert!(dirty_only.validate(&pristine).await.unwrap().is_empty());
    assert!(touched_only.validate(&pristine).await.unwrap().is_empty());

    let dirty = pristine.clone().mark_dirty(true);
    assert_eq!(dirty_only.validate(&dirty).await.unwrap().len(), 1);
    assert!(touched_only.validate(&dirty).await.unwrap().is_empty());

    let touched = pristine.mark_touched(true);
    assert!(dirty_only.validate(&touched).await.unwrap().is_empty());
    assert_eq!(touched_only.validate(&touched).await.unwrap().len(), 1);
}

#[tokio::test]
async fn apply_when_on_a_control_revalidates_after_touch() {
    let control = text_control("").validator(Required::new().apply_when(false, true)).build();

    assert!(control.validate().await.unwrap().errors().is_empty());

    let state = control.mark_touched(true).await.unwrap();
    assert_eq!(kinds(state.errors()), ["required"]);
}
