//! Generation counters used to supersede in-flight jobs.
//!
//! Every `transform`/`validate` call captures a [`Token`] from a
//! [`Generation`]. Starting a newer call advances the generation, and a job
//! only commits its result while its token is still current. The
//! [`Superseded`] future resolves as soon as a token goes stale, which lets a
//! run drop its validators early instead of waiting for them to finish.

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicU64, Ordering};
use core::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// Value of a [`Generation`] captured by one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(u64);

impl Token {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic counter whose advances wake every [`Superseded`] waiter.
#[derive(Debug, Default)]
pub struct Generation {
    counter: AtomicU64,
    notify: Notify,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every token issued so far and returns a fresh one.
    pub fn advance(&self) -> Token {
        let token = Token(self.counter.fetch_add(1, Ordering::AcqRel) + 1);
        self.notify.notify_waiters();
        token
    }

    #[inline]
    pub fn current(&self) -> Token {
        Token(self.counter.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_current(&self, token: Token) -> bool {
        self.current() == token
    }

    /// Future resolving once `token` is no longer current.
    pub fn superseded(&self, token: Token) -> Superseded<'_> {
        // The `Notified` is created before the first counter check, so an
        // advance racing with the first poll is never missed.
        Superseded { generation: self, token, notified: self.notify.notified() }
    }
}

pin_project! {
    /// Resolves when the generation moves past the captured token.
    ///
    /// # Cancel Safety
    ///
    /// Dropping the future has no side effect on the generation.
    #[must_use = "futures do nothing unless polled"]
    pub struct Superseded<'a> {
        generation: &'a Generation,
        token: Token,
        #[pin]
        notified: Notified<'a>,
    }
}

impl<'a> Future for Superseded<'a> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut this = self.project();

        loop {
            if !this.generation.is_current(*this.token) {
                return Poll::Ready(());
            }

            match this.notified.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(()) => {
                    let generation: &'a Generation = *this.generation;
                    this.notified.set(generation.notify.notified());
                },
            }
        }
    }
}
