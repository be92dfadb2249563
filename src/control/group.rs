use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, debug_span, warn};

use crate::control::base::ControlCore;
use crate::control::generation::Token;
use crate::control::run::{run_validators, SharedValidator};
use crate::control::{
    AnyControl, CallbackId, ChildPush, Control, ControlConfig, FieldControl, ParentLink,
    StateStream,
};
use crate::state::group::{ChildEntry, Controls};
use crate::state::{ChildSnapshot, FormGroupState};
use crate::traits::Validator;
use crate::types::{
    BindingError, ControlError, ControlResult, ErrorSet, FieldValue, FormValue, Path, ValueMap,
};

/// Composite control aggregating named children into a map value.
///
/// The group's state is derived from its children (see [`FormGroupState`]).
/// Writes to the group are pushed into the children, and every change of a
/// child is reflected in the group and reported further up.
///
/// # Examples
///
/// ```
/// use form_rail::prelude::*;
///
/// # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # runtime.block_on(async {
/// let form = GroupControl::builder()
///     .control("first_name", text_control("").build())
///     .control("last_name", text_control("").build())
///     .build()
///     .unwrap();
///
/// form.field::<String>("first_name").unwrap().set_value(|_| "a".to_string()).await.unwrap();
///
/// let value = form.state().value().clone();
/// assert_eq!(value["first_name"], FormValue::from("a"));
/// assert_eq!(value["last_name"], FormValue::from(""));
/// # });
/// ```
#[derive(Clone)]
pub struct GroupControl {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    core: ControlCore<FormGroupState>,
    validators: Vec<SharedValidator<FormGroupState>>,
    config: ControlConfig,
    /// Set when a child settled while the group could not revalidate.
    revalidate: AtomicBool,
}

impl fmt::Debug for GroupControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupControl")
            .field("state", &self.state())
            .field("validators", &self.inner.validators.len())
            .finish()
    }
}

/// Builder for [`GroupControl`].
#[derive(Default)]
pub struct GroupBuilder {
    controls: Vec<(String, Arc<dyn AnyControl>)>,
    validators: Vec<SharedValidator<FormGroupState>>,
    config: ControlConfig,
}

impl GroupBuilder {
    /// Adds a child under `key`. A later child with the same key replaces the
    /// earlier one.
    pub fn control<C: AnyControl>(mut self, key: impl Into<String>, control: C) -> Self {
        self.controls.push((key.into(), Arc::new(control)));
        self
    }

    pub fn validator<T>(mut self, validator: T) -> Self
    where
        T: Validator<FormGroupState> + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn config(mut self, config: ControlConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the group and binds every child to it.
    ///
    /// Fails if a key is not a valid path segment, a child already has a
    /// parent, or one control was added under several keys; no child is bound
    /// in that case.
    pub fn build(self) -> ControlResult<GroupControl> {
        let mut controls = BTreeMap::new();
        for (key, control) in self.controls {
            let path = Path::key(&key)?;
            controls.insert(key, ChildEntry { path, control });
        }
        let mut seen = HashSet::with_capacity(controls.len());
        for entry in controls.values() {
            if entry.control.is_bound() || !seen.insert(entry.control.identity()) {
                return Err(BindingError::AlreadyBound.into());
            }
        }

        let controls: Controls = Arc::new(controls);
        let inner = Arc::new(GroupInner {
            core: ControlCore::new(FormGroupState::new(Arc::clone(&controls))),
            validators: self.validators,
            config: self.config,
            revalidate: AtomicBool::new(false),
        });

        let link: Weak<dyn ParentLink> = Arc::downgrade(&inner) as Weak<GroupInner>;
        for entry in controls.values() {
            entry.control.attach(link.clone())?;
        }

        Ok(GroupControl { inner })
    }
}

impl GroupControl {
    pub fn builder() -> GroupBuilder {
        GroupBuilder::default()
    }

    #[inline]
    pub fn config(&self) -> &ControlConfig {
        &self.inner.config
    }

    /// Keys of the children, in order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.core.read(|state| state.keys().map(str::to_string).collect())
    }

    /// Child registered under `key`.
    pub fn control(&self, key: &str) -> Option<Arc<dyn AnyControl>> {
        self.inner.core.read(|state| state.control(key))
    }

    /// Field child registered under `key`, if it holds values of type `V`.
    pub fn field<V: FieldValue>(&self, key: &str) -> Option<FieldControl<V>> {
        self.control(key)?.as_any().downcast_ref::<FieldControl<V>>().cloned()
    }

    /// Group child registered under `key`.
    pub fn group(&self, key: &str) -> Option<GroupControl> {
        self.control(key)?.as_any().downcast_ref::<GroupControl>().cloned()
    }

    /// Replaces the value with `f(current)`, see [`Control::transform`].
    pub async fn set_value<F>(&self, f: F) -> ControlResult<FormGroupState>
    where
        F: FnOnce(ValueMap) -> ValueMap + Send + 'static,
    {
        self.transform(move |state| state.map_value(f)).await
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl GroupInner {
    fn state(&self) -> FormGroupState {
        self.core.read(|state| {
            state.refresh();
            state.clone()
        })
    }

    async fn transform_job<F>(self: Arc<Self>, write: Token, f: F) -> ControlResult<FormGroupState>
    where
        F: FnOnce(FormGroupState) -> FormGroupState,
    {
        let guard = self.core.jobs.lock().await;
        if !self.core.writes.is_current(write) {
            debug!(write = write.get(), "group write superseded");
            return Ok(self.state());
        }

        let desired = f(self.state());
        let pushes = plan_pushes(&desired);

        let pushed = tokio::select! {
            biased;
            () = self.core.writes.superseded(write) => None,
            result = self.push_all(pushes) => Some(result),
        };
        let Some(pushed) = pushed else {
            debug!(write = write.get(), "group write superseded while pushing");
            return Ok(self.state());
        };

        let outcome = if self.config.live_validation() {
            self.core.update(move |_| desired.settle_instructions().refreshed());
            let run = self.core.runs.advance();
            self.run_validation(run, false).await
        } else {
            self.core.update(move |_| {
                desired.settle_instructions().mark_validating(false).request_validation(false).refreshed()
            });
            Ok(())
        };
        drop(guard);
        self.run_deferred_validation().await;

        self.settle(pushed.and(outcome)).await
    }

    async fn validate_job(self: Arc<Self>) -> ControlResult<FormGroupState> {
        let guard = self.core.jobs.lock().await;
        let run = self.core.runs.advance();
        let outcome = self.run_validation(run, true).await;
        drop(guard);
        self.run_deferred_validation().await;

        self.settle(outcome).await
    }

    async fn settle(&self, outcome: ControlResult<()>) -> ControlResult<FormGroupState> {
        if let Some(parent) = self.core.parent() {
            let validating = self.core.read(|state| state.validating());
            parent.child_settled(validating).await;
        }
        outcome.map(|()| self.state())
    }

    /// Runs the live validations deferred while the job lock was held.
    ///
    /// Called after releasing the job lock. If another job grabs the lock
    /// first, that job runs them once it releases it.
    async fn run_deferred_validation(&self) {
        while self.revalidate.load(Ordering::Acquire) {
            let Ok(guard) = self.core.jobs.try_lock() else {
                return;
            };
            if !self.revalidate.load(Ordering::Acquire) {
                break;
            }
            debug!("child change triggered group validation");
            let run = self.core.runs.advance();
            if let Err(error) = self.run_validation(run, false).await {
                warn!(%error, "group validation failed");
            }
            drop(guard);
        }
    }

    /// Pushes writes into the children concurrently.
    ///
    /// Every push runs to completion; the first error is returned.
    async fn push_all(&self, pushes: Vec<(String, Arc<dyn AnyControl>, ChildPush)>) -> ControlResult<()> {
        let mut tasks = JoinSet::new();
        for (key, child, push) in pushes {
            let task = async move { child.push(push).await.map_err(|error| error.within(&key)) };
            match self.config.runtime() {
                Some(handle) => {
                    tasks.spawn_on(task, handle);
                },
                None => {
                    tasks.spawn(task);
                },
            }
        }
        collect_first_error(tasks).await
    }

    async fn validate_children(&self, controls: &Controls) -> ControlResult<()> {
        let mut tasks = JoinSet::new();
        for entry in controls.values() {
            let child = Arc::clone(&entry.control);
            let task = async move { child.validate_erased().await };
            match self.config.runtime() {
                Some(handle) => {
                    tasks.spawn_on(task, handle);
                },
                None => {
                    tasks.spawn(task);
                },
            }
        }
        collect_first_error(tasks).await
    }

    /// Runs the group validators and, when `requested`, every child's own
    /// validation, concurrently.
    async fn run_validation(&self, run: Token, requested: bool) -> ControlResult<()> {
        let runs = &self.core.runs;
        // This run observes every child change committed so far.
        self.revalidate.store(false, Ordering::Release);
        let Some(snapshot) = self.core.update_if(runs, run, |state| {
            state.mark_validating(true).request_validation(requested).refreshed()
        }) else {
            debug!(run = run.get(), "group validation superseded before start");
            return Ok(());
        };

        if !snapshot.self_enabled() {
            self.core.update_if(runs, run, |state| {
                state.with_errors(ErrorSet::new()).mark_validating(false).request_validation(false).refreshed()
            });
            return Ok(());
        }

        let controls = Arc::clone(snapshot.controls());
        let validators = run_validators(&self.validators, snapshot, self.config.runtime());
        let children = async {
            if requested {
                self.validate_children(&controls).await
            } else {
                Ok(())
            }
        };

        let outcome = tokio::select! {
            biased;
            () = runs.superseded(run) => None,
            outcome = async { tokio::join!(validators, children) } => Some(outcome),
        };
        let Some((report, children)) = outcome else {
            debug!(run = run.get(), "group validation superseded");
            return Ok(());
        };

        let (errors, failure) = report.into_parts();
        let committed = self.core.update_if(runs, run, |mut state| {
            state.controls_dirty = true;
            state.with_errors(errors).mark_validating(false).request_validation(false).refreshed()
        });
        if committed.is_none() {
            return Ok(());
        }

        match failure {
            Some(failure) => Err(ControlError::from(failure)),
            None => children,
        }
    }
}

/// Splits the desired state into one write per child.
///
/// A child receives the value under its key only when it differs from its
/// current value; the touched/dirty/enable instructions go to every child.
fn plan_pushes(desired: &FormGroupState) -> Vec<(String, Arc<dyn AnyControl>, ChildPush)> {
    let desired_value = desired.pending_value();
    desired
        .controls()
        .iter()
        .filter_map(|(key, entry)| {
            let value = desired_value
                .and_then(|map| map.get(key))
                .filter(|value| **value != entry.control.snapshot().value);
            let push = ChildPush {
                value: value.cloned(),
                touched: desired.form_touched(),
                dirty: desired.form_dirty(),
                enabled: desired.form_enabled(),
            };
            (!push.is_empty()).then(|| (key.clone(), Arc::clone(&entry.control), push))
        })
        .collect()
}

async fn collect_first_error(mut tasks: JoinSet<ControlResult<()>>) -> ControlResult<()> {
    let mut first = None;
    while let Some(joined) = tasks.join_next().await {
        let result = joined.map_err(ControlError::from).and_then(|result| result);
        if let Err(error) = result {
            warn!(%error, "child operation failed");
            first.get_or_insert(error);
        }
    }
    first.map_or(Ok(()), Err)
}

#[async_trait]
impl ParentLink for GroupInner {
    fn child_changed(&self) {
        if self.core.callbacks().is_empty() {
            self.core.read(|state| state.controls_dirty = true);
            self.core.notify_parent();
        } else {
            self.core.update(|mut state| {
                state.controls_dirty = true;
                state.refreshed()
            });
        }
    }

    async fn child_settled(&self, child_validating: bool) {
        if !self.config.live_validation() || child_validating {
            return;
        }

        if !self.validators.is_empty() {
            // Set before trying the lock: a job holding it checks the flag
            // after releasing it.
            self.revalidate.store(true, Ordering::Release);
            let busy = self.core.jobs.try_lock().map_or(true, |_| self.core.read(|state| state.validating()));
            if busy {
                debug!("group busy, deferring child-triggered validation");
                return;
            }
            self.run_deferred_validation().await;
        }

        if let Some(parent) = self.core.parent() {
            let validating = self.core.read(|state| state.validating());
            parent.child_settled(validating).await;
        }
    }
}

#[async_trait]
impl Control for GroupControl {
    type State = FormGroupState;

    fn state(&self) -> FormGroupState {
        self.inner.state()
    }

    fn register_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&FormGroupState) + Send + Sync + 'static,
    {
        self.inner.core.callbacks().register(callback)
    }

    fn unregister_callback(&self, id: CallbackId) -> bool {
        self.inner.core.callbacks().unregister(id)
    }

    fn subscribe(&self) -> StateStream<FormGroupState> {
        self.inner.core.callbacks().stream()
    }

    async fn transform<F>(&self, f: F) -> ControlResult<FormGroupState>
    where
        F: FnOnce(FormGroupState) -> FormGroupState + Send + 'static,
    {
        let write = self.inner.core.writes.advance();
        self.inner.core.runs.advance();

        let inner = Arc::clone(&self.inner);
        self.inner
            .config
            .run_job(debug_span!("group_job", op = "transform"), inner.transform_job(write, f))
            .await
    }

    async fn validate(&self) -> ControlResult<FormGroupState> {
        self.inner.core.runs.advance();

        let inner = Arc::clone(&self.inner);
        self.inner.config.run_job(debug_span!("group_job", op = "validate"), inner.validate_job()).await
    }
}

#[async_trait]
impl AnyControl for GroupControl {
    fn snapshot(&self) -> ChildSnapshot {
        self.inner.core.read(|state| {
            state.refresh();
            state.snapshot()
        })
    }

    async fn push(&self, push: ChildPush) -> ControlResult<()> {
        if push.is_empty() {
            return Ok(());
        }

        let ChildPush { value, touched, dirty, enabled } = push;
        let mut mismatch = None;
        let value = match value {
            Some(FormValue::Map(map)) => Some(map),
            Some(other) => {
                mismatch = Some(ControlError::ValueMismatch {
                    key: String::new(),
                    expected: "map",
                    found: other.kind(),
                });
                None
            },
            None => None,
        };

        let pushed = self
            .transform(move |mut state| {
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
            .await;

        match (pushed, mismatch) {
            (Err(error), _) | (Ok(_), Some(error)) => Err(error),
            (Ok(_), None) => Ok(()),
        }
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

    fn parent_link(&self) -> Option<Weak<dyn ParentLink>> {
        let link: Weak<dyn ParentLink> = Arc::downgrade(&self.inner) as Weak<GroupInner>;
        Some(link)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
