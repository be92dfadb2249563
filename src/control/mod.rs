//! Mutable, observable holders of form state.
//!
//! A control owns one immutable state snapshot at a time and replaces it
//! wholesale on every change. Two kinds exist:
//!
//! - [`FieldControl`]: a leaf holding a single value and its validators;
//! - [`GroupControl`]: a composite aggregating named children into a map.
//!
//! Every `transform`/`validate` call runs as a job spawned on the Tokio
//! runtime. Jobs of one control are serialized, and a newer call supersedes
//! the older ones: a value write that has not started yet is skipped and an
//! in-flight validation run is abandoned without committing. Dropping the
//! future returned by a call does not cancel its job.
//!
//! # Examples
//!
//! ```
//! use form_rail::prelude::*;
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let name = FieldControl::builder(String::new()).validator(Required::new()).build();
//! let form = GroupControl::builder().control("name", name.clone()).build().unwrap();
//!
//! let state = form.validate().await.unwrap();
//! assert_eq!(state.errors().iter().next().unwrap().path().to_string(), "/name");
//!
//! name.set_value(|_| "Ada".to_string()).await.unwrap();
//! assert!(form.state().errors().is_empty());
//! # });
//! ```

use core::any::Any;
use core::future::Future;
use std::sync::Weak;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tracing::{Instrument, Span};

use crate::state::{ChildSnapshot, ControlState};
use crate::types::{BindingError, ControlResult, FormValue};

pub(crate) mod base;
pub mod callbacks;
pub mod field;
pub mod generation;
pub mod group;
pub(crate) mod run;

pub use callbacks::{CallbackId, CallbackRegistry, StateStream};
pub use field::{text_control, FieldControl, FieldControlBuilder};
pub use generation::{Generation, Superseded, Token};
pub use group::{GroupBuilder, GroupControl};

/// Runtime options of a control.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    runtime: Option<Handle>,
    live_validation: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { runtime: None, live_validation: true }
    }
}

impl ControlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns jobs and validators on `handle` instead of the ambient runtime.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// When disabled, value changes commit without running validators; only
    /// an explicit `validate()` runs them.
    pub fn with_live_validation(mut self, enabled: bool) -> Self {
        self.live_validation = enabled;
        self
    }

    #[inline]
    pub fn runtime(&self) -> Option<&Handle> {
        self.runtime.as_ref()
    }

    #[inline]
    pub fn live_validation(&self) -> bool {
        self.live_validation
    }

    /// Spawns `job` and waits for its outcome.
    pub(crate) async fn run_job<F, T>(&self, span: Span, job: F) -> ControlResult<T>
    where
        F: Future<Output = ControlResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let job = job.instrument(span);
        let handle = match &self.runtime {
            Some(runtime) => runtime.spawn(job),
            None => tokio::spawn(job),
        };
        handle.await?
    }
}

/// Writes a parent group pushes into one of its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPush {
    pub value: Option<FormValue>,
    pub touched: Option<bool>,
    pub dirty: Option<bool>,
    pub enabled: Option<bool>,
}

impl ChildPush {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.touched.is_none() && self.dirty.is_none() && self.enabled.is_none()
    }
}

/// Non-owning channel from a child to its parent group.
#[async_trait]
pub trait ParentLink: Send + Sync {
    /// A child committed a new state.
    fn child_changed(&self);

    /// A job of a child finished; the parent may revalidate itself.
    async fn child_settled(&self, child_validating: bool);
}

/// Type-erased view of a control, as held by its parent group.
#[async_trait]
pub trait AnyControl: Send + Sync + 'static {
    fn snapshot(&self) -> ChildSnapshot;

    /// Applies a parent write. A value of the wrong kind is rejected with
    /// [`ControlError::ValueMismatch`](crate::types::ControlError::ValueMismatch);
    /// the flags of the push are applied regardless.
    async fn push(&self, push: ChildPush) -> ControlResult<()>;

    async fn validate_erased(&self) -> ControlResult<()>;

    fn is_bound(&self) -> bool;

    /// Address of the shared control; clones of one control report the same
    /// identity.
    fn identity(&self) -> usize;

    fn attach(&self, parent: Weak<dyn ParentLink>) -> Result<(), BindingError>;

    /// Link children of this control report to; `None` unless it is a group.
    fn parent_link(&self) -> Option<Weak<dyn ParentLink>> {
        None
    }

    /// Binds this control to `parent`, at most once.
    fn bind_to(&self, parent: &dyn AnyControl) -> Result<(), BindingError> {
        let link = parent.parent_link().ok_or(BindingError::NotAGroup)?;
        self.attach(link)
    }

    fn as_any(&self) -> &dyn Any;
}

/// Capability set shared by field and group controls.
#[async_trait]
pub trait Control: Send + Sync {
    type State: ControlState;

    /// Current committed state.
    fn state(&self) -> Self::State;

    /// Calls `callback` with every committed state, in registration order.
    fn register_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&Self::State) + Send + Sync + 'static;

    fn unregister_callback(&self, id: CallbackId) -> bool;

    /// Stream of every committed state from now on.
    fn subscribe(&self) -> StateStream<Self::State>;

    /// Replaces the state with `f(current)` and runs a live validation.
    ///
    /// Resolves with the state once the resulting validation has settled. If
    /// a newer call superseded this one, resolves with the current state.
    async fn transform<F>(&self, f: F) -> ControlResult<Self::State>
    where
        F: FnOnce(Self::State) -> Self::State + Send + 'static;

    /// Runs every validator (recursively for groups) and resolves with the
    /// settled state.
    async fn validate(&self) -> ControlResult<Self::State>;

    async fn enable(&self, enabled: bool) -> ControlResult<Self::State> {
        self.transform(move |state| state.enable(enabled)).await
    }

    async fn mark_touched(&self, touched: bool) -> ControlResult<Self::State> {
        self.transform(move |state| state.mark_touched(touched)).await
    }

    async fn mark_dirty(&self, dirty: bool) -> ControlResult<Self::State> {
        self.transform(move |state| state.mark_dirty(dirty)).await
    }
}
