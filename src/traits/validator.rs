//! Asynchronous validators.
//!
//! A [`Validator`] inspects a snapshot of a control's state and reports the
//! errors it finds. Validators of one control run concurrently and their
//! results are unioned; an empty [`ErrorSet`] means "no opinion", never
//! "clear the errors of the other validators".
//!
//! `Err` is reserved for validators that could not reach a verdict (a remote
//! lookup failed, for instance). The errors of the other validators are still
//! committed and the failure is returned to the caller of the operation that
//! triggered the run.
//!
//! # Examples
//!
//! ```
//! use form_rail::prelude::*;
//!
//! let not_admin = validator_fn(|state: FormState<String>| async move {
//!     let mut errors = ErrorSet::new();
//!     if state.value() == "admin" {
//!         errors.push(ValidationError::new("reserved", "name is reserved"));
//!     }
//!     Ok::<_, ValidatorFailure>(errors)
//! });
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let errors = not_admin.validate(&FormState::new("admin".to_string())).await.unwrap();
//! assert_eq!(errors.len(), 1);
//! # });
//! ```

use core::future::Future;
use core::marker::PhantomData;

use async_trait::async_trait;

use crate::state::ControlState;
use crate::types::{ErrorSet, ValidatorFailure};

/// Produces the errors of a state snapshot.
#[async_trait]
pub trait Validator<S: Sync>: Send + Sync {
    async fn validate(&self, state: &S) -> Result<ErrorSet, ValidatorFailure>;
}

#[async_trait]
impl<S, V> Validator<S> for std::sync::Arc<V>
where
    S: Sync,
    V: Validator<S> + ?Sized,
{
    async fn validate(&self, state: &S) -> Result<ErrorSet, ValidatorFailure> {
        (**self).validate(state).await
    }
}

/// Validator backed by an async closure, see [`validator_fn`].
pub struct FnValidator<S, F> {
    f: F,
    _state: PhantomData<fn(S)>,
}

/// Wraps an async closure into a [`Validator`].
///
/// The closure receives its own clone of the snapshot, so the returned future
/// may hold it across await points.
pub fn validator_fn<S, F, Fut>(f: F) -> FnValidator<S, F>
where
    S: Clone + Send + Sync,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ErrorSet, ValidatorFailure>> + Send,
{
    FnValidator { f, _state: PhantomData }
}

#[async_trait]
impl<S, F, Fut> Validator<S> for FnValidator<S, F>
where
    S: Clone + Send + Sync,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ErrorSet, ValidatorFailure>> + Send,
{
    async fn validate(&self, state: &S) -> Result<ErrorSet, ValidatorFailure> {
        (self.f)(state.clone()).await
    }
}

/// Runs the inner validator only for states the user interacted with.
pub struct ApplyWhen<V> {
    inner: V,
    dirty: bool,
    touched: bool,
}

#[async_trait]
impl<S, V> Validator<S> for ApplyWhen<V>
where
    S: ControlState,
    V: Validator<S>,
{
    async fn validate(&self, state: &S) -> Result<ErrorSet, ValidatorFailure> {
        if (self.dirty && state.dirty()) || (self.touched && state.touched()) {
            self.inner.validate(state).await
        } else {
            Ok(ErrorSet::new())
        }
    }
}

/// Combinators available on every validator.
pub trait ValidatorExt: Sized {
    /// Runs the validator only when the state is dirty (if `dirty`) or
    /// touched (if `touched`); otherwise it reports no errors.
    fn apply_when(self, dirty: bool, touched: bool) -> ApplyWhen<Self> {
        ApplyWhen { inner: self, dirty, touched }
    }
}

impl<T: Sized> ValidatorExt for T {}
