use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tracing::trace;

use crate::control::callbacks::CallbackRegistry;
use crate::control::generation::{Generation, Token};
use crate::control::ParentLink;
use crate::types::BindingError;

struct Slot<S> {
    state: S,
    seq: u64,
}

/// Shared machinery of every control.
///
/// - `slot` holds the current state; it is only locked for the duration of a
///   read-modify-write, never across an await point.
/// - `jobs` serializes transform/validate jobs of this control.
/// - `writes` supersedes pending value writes, `runs` supersedes validation
///   runs.
pub(crate) struct ControlCore<S> {
    slot: Mutex<Slot<S>>,
    callbacks: Arc<CallbackRegistry<S>>,
    parent: OnceLock<Weak<dyn ParentLink>>,
    pub(crate) writes: Generation,
    pub(crate) runs: Generation,
    pub(crate) jobs: tokio::sync::Mutex<()>,
}

impl<S: Clone> ControlCore<S> {
    pub(crate) fn new(state: S) -> Self {
        Self {
            slot: Mutex::new(Slot { state, seq: 0 }),
            callbacks: Arc::new(CallbackRegistry::new()),
            parent: OnceLock::new(),
            writes: Generation::new(),
            runs: Generation::new(),
            jobs: tokio::sync::Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<S>> {
        // States are replaced wholesale, so a poisoned slot still holds a
        // consistent snapshot.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on the current state without publishing.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.lock().state)
    }

    pub(crate) fn state(&self) -> S {
        self.lock().state.clone()
    }

    /// Replaces the state with `f(current)` and publishes it.
    pub(crate) fn update<F>(&self, f: F) -> S
    where
        F: FnOnce(S) -> S,
    {
        let (seq, state) = {
            let mut slot = self.lock();
            let next = f(slot.state.clone());
            slot.state = next.clone();
            slot.seq += 1;
            (slot.seq, next)
        };
        self.publish(seq, &state);
        state
    }

    /// Like [`update`](Self::update), but only while `token` is current.
    pub(crate) fn update_if<F>(&self, generation: &Generation, token: Token, f: F) -> Option<S>
    where
        F: FnOnce(S) -> S,
    {
        let (seq, state) = {
            let mut slot = self.lock();
            if !generation.is_current(token) {
                return None;
            }
            let next = f(slot.state.clone());
            slot.state = next.clone();
            slot.seq += 1;
            (slot.seq, next)
        };
        self.publish(seq, &state);
        Some(state)
    }

    fn publish(&self, seq: u64, state: &S) {
        trace!(seq, "state committed");
        self.callbacks.broadcast(seq, state);
        self.notify_parent();
    }

    pub(crate) fn notify_parent(&self) {
        if let Some(parent) = self.parent() {
            parent.child_changed();
        }
    }

    #[inline]
    pub(crate) fn callbacks(&self) -> &Arc<CallbackRegistry<S>> {
        &self.callbacks
    }

    pub(crate) fn parent(&self) -> Option<Arc<dyn ParentLink>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.parent.get().is_some()
    }

    pub(crate) fn attach(&self, parent: Weak<dyn ParentLink>) -> Result<(), BindingError> {
        self.parent.set(parent).map_err(|_| BindingError::AlreadyBound)
    }
}
