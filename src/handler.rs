//! Iteration callbacks and cooperative cancellation.
//!
//! Every `iterate` in the crate drives a [`Handler`]: it receives each
//! visited entry and returns `true` to keep going or `false` to stop.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-entry callback; returning `false` stops the iteration.
pub type Handler<'a, K, V> = dyn FnMut(&K, &V) -> bool + 'a;

/// A signal an iteration can poll to learn that the caller gave up.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<C: Cancellation + ?Sized> Cancellation for &C {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<C: Cancellation + ?Sized> Cancellation for Arc<C> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Cloneable cancellation flag. All clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Cancellation for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }
}

/// Wrap `handler` so that it stops the iteration once `signal` fires.
///
/// The signal is checked before every call; once it has fired the wrapped
/// handler is no longer invoked and `false` is returned. A call that is
/// already running is not interrupted.
pub fn with_interruption<K, V, C, F>(signal: C, mut handler: F) -> impl FnMut(&K, &V) -> bool
where
    C: Cancellation,
    F: FnMut(&K, &V) -> bool,
{
    move |key, value| {
        if signal.is_cancelled() {
            return false;
        }
        handler(key, value)
    }
}
