use core::any::Any;
use core::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tracing::{debug, debug_span};

use crate::control::base::ControlCore;
use crate::control::generation::Token;
use crate::control::run::{run_validators, SharedValidator};
use crate::control::{
    AnyControl, CallbackId, ChildPush, Control, ControlConfig, ParentLink, StateStream,
};
use crate::state::{ChildSnapshot, FormState};
use crate::traits::Validator;
use crate::types::{BindingError, ControlError, ControlResult, ErrorSet, FieldValue};

/// Leaf control holding a single value and its validators.
///
/// `FieldControl` is a cheap handle: clones share the same control.
///
/// # Examples
///
/// ```
/// use form_rail::prelude::*;
///
/// # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # runtime.block_on(async {
/// let name = FieldControl::builder(String::new()).validator(Required::new()).build();
///
/// let state = name.validate().await.unwrap();
/// assert_eq!(state.errors().iter().next().unwrap().kind(), "required");
///
/// let state = name.set_value(|_| "x".to_string()).await.unwrap();
/// assert!(state.errors().is_empty());
/// # });
/// ```
pub struct FieldControl<V: FieldValue> {
    inner: Arc<FieldInner<V>>,
}

struct FieldInner<V: FieldValue> {
    core: ControlCore<FormState<V>>,
    validators: Vec<SharedValidator<FormState<V>>>,
    config: ControlConfig,
}

impl<V: FieldValue> Clone for FieldControl<V> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<V: FieldValue> fmt::Debug for FieldControl<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldControl")
            .field("state", &self.inner.core.state())
            .field("validators", &self.inner.validators.len())
            .finish()
    }
}

/// Builder for [`FieldControl`].
pub struct FieldControlBuilder<V: FieldValue> {
    initial: FormState<V>,
    validators: Vec<SharedValidator<FormState<V>>>,
    config: ControlConfig,
}

impl<V: FieldValue> FieldControlBuilder<V> {
    /// Starts from `state` instead of a fresh state, keeping its flags.
    pub fn state(mut self, state: FormState<V>) -> Self {
        self.initial = state;
        self
    }

    pub fn validator<T>(mut self, validator: T) -> Self
    where
        T: Validator<FormState<V>> + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn config(mut self, config: ControlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> FieldControl<V> {
        FieldControl {
            inner: Arc::new(FieldInner {
                core: ControlCore::new(self.initial),
                validators: self.validators,
                config: self.config,
            }),
        }
    }
}

/// Builder of a text field starting with `initial`.
pub fn text_control(initial: impl Into<String>) -> FieldControlBuilder<String> {
    FieldControl::builder(initial.into())
}

impl<V: FieldValue> FieldControl<V> {
    pub fn new(initial: V) -> Self {
        Self::builder(initial).build()
    }

    pub fn builder(initial: V) -> FieldControlBuilder<V> {
        FieldControlBuilder {
            initial: FormState::new(initial),
            validators: Vec::new(),
            config: ControlConfig::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ControlConfig {
        &self.inner.config
    }

    /// Replaces the value with `f(current)`, see [`Control::transform`].
    pub async fn set_value<F>(&self, f: F) -> ControlResult<FormState<V>>
    where
        F: FnOnce(V) -> V + Send + 'static,
    {
        self.transform(move |state| state.map_value(f)).await
    }

    /// `true` if both handles point at the same control.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<V: FieldValue> FieldInner<V> {
    async fn transform_job<F>(self: Arc<Self>, write: Token, f: F) -> ControlResult<FormState<V>>
    where
        F: FnOnce(FormState<V>) -> FormState<V>,
    {
        let guard = self.core.jobs.lock().await;
        if !self.core.writes.is_current(write) {
            debug!(write = write.get(), "value write superseded");
            return Ok(self.core.state());
        }

        let outcome = if self.config.live_validation() {
            self.core.update(f);
            let run = self.core.runs.advance();
            self.run_validation(run, false).await
        } else {
            // A run cancelled by this write will never commit.
            self.core.update(|state| f(state).mark_validating(false).request_validation(false));
            Ok(())
        };
        drop(guard);

        self.settle(outcome).await
    }

    async fn validate_job(self: Arc<Self>) -> ControlResult<FormState<V>> {
        let guard = self.core.jobs.lock().await;
        let run = self.core.runs.advance();
        let outcome = self.run_validation(run, true).await;
        drop(guard);

        self.settle(outcome).await
    }

    /// Reports the end of a job to the parent, then yields the final state.
    async fn settle(&self, outcome: ControlResult<()>) -> ControlResult<FormState<V>> {
        if let Some(parent) = self.core.parent() {
            let validating = self.core.read(|state| state.validating());
            parent.child_settled(validating).await;
        }
        outcome.map(|()| self.core.state())
    }

    async fn run_validation(&self, run: Token, requested: bool) -> ControlResult<()> {
        let runs = &self.core.runs;
        let Some(snapshot) =
            self.core.update_if(runs, run, |state| state.mark_validating(true).request_validation(requested))
        else {
            debug!(run = run.get(), "validation run superseded before start");
            return Ok(());
        };

        if !snapshot.enabled() {
            self.core.update_if(runs, run, |state| {
                state.with_errors(ErrorSet::new()).mark_validating(false).request_validation(false)
            });
            return Ok(());
        }

        let report = tokio::select! {
            biased;
            () = runs.superseded(run) => None,
            report = run_validators(&self.validators, snapshot, self.config.runtime()) => Some(report),
        };
        let Some(report) = report else {
            debug!(run = run.get(), "validation run superseded");
            return Ok(());
        };

        let (errors, failure) = report.into_parts();
        let committed = self.core.update_if(runs, run, |state| {
            state.with_errors(errors).mark_validating(false).request_validation(false)
        });

        match (committed, failure) {
            (Some(_), Some(failure)) => Err(ControlError::from(failure)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<V: FieldValue> Control for FieldControl<V> {
    type State = FormState<V>;

    fn state(&self) -> FormState<V> {
        self.inner.core.state()
    }

    fn register_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&FormState<V>) + Send + Sync + 'static,
    {
        self.inner.core.callbacks().register(callback)
    }

    fn unregister_callback(&self, id: CallbackId) -> bool {
        self.inner.core.callbacks().unregister(id)
    }

    fn subscribe(&self) -> StateStream<FormState<V>> {
        self.inner.core.callbacks().stream()
    }

    async fn transform<F>(&self, f: F) -> ControlResult<FormState<V>>
    where
        F: FnOnce(FormState<V>) -> FormState<V> + Send + 'static,
    {
        let write = self.inner.core.writes.advance();
        self.inner.core.runs.advance();

        let inner = Arc::clone(&self.inner);
        self.inner
            .config
            .run_job(debug_span!("field_job", op = "transform"), inner.transform_job(write, f))
            .await
    }

    async fn validate(&self) -> ControlResult<FormState<V>> {
        self.inner.core.runs.advance();

        let inner = Arc::clone(&self.inner);
        self.inner.config.run_job(debug_span!("field_job", op = "validate"), inner.validate_job()).await
    }
}

#[async_trait]
impl<V: FieldValue> AnyControl for FieldControl<V> {
    fn snapshot(&self) -> ChildSnapshot {
        self.inner.core.read(|state| ChildSnapshot {
            value: state.value().to_form_value(),
            errors: state.errors().clone(),
            dirty: state.dirty(),
            touched: state.touched(),
            enabled: state.enabled(),
            validating: state.validating(),
        })
    }

    async fn push(&self, push: ChildPush) -> ControlResult<()> {
        if push.is_empty() {
            return Ok(());
        }

        let ChildPush { value, touched, dirty, enabled } = push;
        let mut mismatch = None;
        let value = match value {
            Some(value) => match V::from_form_value(&value) {
                Some(value) => Some(value),
                None => {
                    mismatch = Some(ControlError::ValueMismatch {
                        key: String::new(),
                        expected: V::expected_kind(),
                        found: value.kind(),
                    });
                    None
                },
            },
            None => None,
        };

        self.transform(move |mut state| {
            if let Some(value) = value {
                state = state.with_value(value);
            }
            if let Some(touched) = touched {
                state = state.mark_touched(touched);
            }
            if let Some(dirty) = dirty {
                state = state.mark_dirty(dirty);
            }
            if let Some(enabled) = enabled {
                state = state.enable(enabled);
            }
            state
        })
        .await?;

        mismatch.map_or(Ok(()), Err)
    }

    async fn validate_erased(&self) -> ControlResult<()> {
        self.validate().await.map(|_| ())
    }

    fn is_bound(&self) -> bool {
        self.inner.core.is_bound()
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    fn attach(&self, parent: Weak<dyn ParentLink>) -> Result<(), BindingError> {
        self.inner.core.attach(parent)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
