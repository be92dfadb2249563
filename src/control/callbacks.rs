//! Observers of committed states.

use core::pin::Pin;
use core::sync::atomic::{AtomicU64, Ordering};
use core::task::{Context, Poll};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use futures_core::Stream;
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Handle returned by `register_callback`, used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(u64);

type Callback<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Ordered list of callbacks fed with every committed state.
///
/// Each broadcast works on a snapshot of the list taken when it starts, so a
/// callback may register or unregister callbacks (including itself) while
/// being invoked. A panicking callback is logged and skipped; the remaining
/// callbacks still run.
pub struct CallbackRegistry<S> {
    next_id: AtomicU64,
    last_seq: AtomicU64,
    entries: Mutex<Vec<(CallbackId, Callback<S>)>>,
}

impl<S> Default for CallbackRegistry<S> {
    fn default() -> Self {
        Self { next_id: AtomicU64::new(0), last_seq: AtomicU64::new(0), entries: Mutex::new(Vec::new()) }
    }
}

impl<S> CallbackRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push((id, Arc::new(callback)));
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn unregister(&self, id: CallbackId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `state`, committed with sequence number `seq`.
    ///
    /// A state older than one already delivered is dropped, so observers
    /// never see the control go back in time.
    pub fn broadcast(&self, seq: u64, state: &S) {
        let previous = self.last_seq.fetch_max(seq, Ordering::AcqRel);
        if previous > seq {
            trace!(seq, previous, "skipping stale broadcast");
            return;
        }

        let snapshot: Vec<Callback<S>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(state))).is_err() {
                warn!(seq, "state callback panicked");
            }
        }
    }
}

impl<S: Clone + Send + 'static> CallbackRegistry<S> {
    /// Registers a callback forwarding every state into a [`StateStream`].
    pub fn stream(self: &Arc<Self>) -> StateStream<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.register(move |state: &S| {
            // The receiver unregisters on drop; a send racing with it is harmless.
            let _ = tx.send(state.clone());
        });
        StateStream { receiver: rx, registry: Arc::downgrade(self), id }
    }
}

/// Stream of committed states, created by `Control::subscribe`.
///
/// Dropping the stream unregisters its callback.
pub struct StateStream<S> {
    receiver: mpsc::UnboundedReceiver<S>,
    registry: Weak<CallbackRegistry<S>>,
    id: CallbackId,
}

impl<S> StateStream<S> {
    #[inline]
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Waits for the next committed state.
    pub async fn next(&mut self) -> Option<S> {
        self.receiver.recv().await
    }
}

impl<S> Stream for StateStream<S> {
    type Item = S;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S>> {
        self.receiver.poll_recv(cx)
    }
}

impl<S> Drop for StateStream<S> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
    }
}
