//! Batched Auto-refill Subscriber
//!
//! Adapts plain callbacks into a credit-managed consumer. The subscriber
//! requests `batch` values on subscribe and tops the producer back up
//! whenever outstanding credit drops below half the batch:
//!
//! ```text
//!   pending = batch                       on subscribe, request(batch)
//!   pending -= 1                          after each next(value)
//!   if pending < batch / 2:
//!       request(batch - pending)          pending = batch
//! ```
//!
//! Each refill is therefore at least half a batch, and at least half a
//! batch stays in flight so the producer never idles waiting for credit.
//! With an unbounded batch the subscriber requests
//! [`NO_FLOW_CONTROL`](crate::credits::NO_FLOW_CONTROL) once and does no
//! accounting at all.
//!
//! # Re-entrant Signals
//!
//! `next` may call back into its own subscriber, for example to request
//! more credit from a producer that emits synchronously from inside
//! `request`. Signals that arrive while `next` is running are queued and
//! delivered in order by the frame already inside `next`, after it
//! returns. A terminal signal that arrives that way is held until the
//! queued values have been delivered.
//!
//! # Panicking Callbacks
//!
//! Callbacks are not supposed to panic. If `next` does, the subscriber
//! cancels itself, drops anything still queued and reports the panic
//! through the error callback. If `error` or `complete` does, the panic
//! is logged; debug builds resume unwinding, release builds swallow it.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::Mutex;
use tracing::{error, trace};

use super::base::{BaseSubscriber, SubscriberHooks};
use crate::batch::BatchSize;
use crate::error::FlowError;

pub(crate) type NextFn<T> = Box<dyn FnMut(T) + Send>;
pub(crate) type ErrorFn = Box<dyn FnMut(FlowError) + Send>;
pub(crate) type CompleteFn = Box<dyn FnMut() + Send>;

/// A subscriber driven by user callbacks with half-batch refill.
pub type CallbackSubscriber<T> = BaseSubscriber<T, Batched<T>>;

/// Hooks for [`CallbackSubscriber`].
pub struct Batched<T> {
    next: Mutex<NextFn<T>>,
    error: Option<Mutex<ErrorFn>>,
    complete: Option<Mutex<CompleteFn>>,
    batch: BatchSize,

    /// Credit outstanding at the producer. Only touched while `next` is
    /// held.
    pending: AtomicI64,

    /// Values waiting for the frame that holds `next`.
    backlog: Mutex<VecDeque<T>>,
    terminal: Mutex<Option<Terminal>>,
}

enum Terminal {
    Complete,
    Error(FlowError),
}

impl<T> Batched<T> {
    pub(crate) fn new(
        next: NextFn<T>,
        error: Option<ErrorFn>,
        complete: Option<CompleteFn>,
        batch: BatchSize,
    ) -> Self {
        Self {
            next: Mutex::new(next),
            error: error.map(Mutex::new),
            complete: complete.map(Mutex::new),
            batch,
            pending: AtomicI64::new(0),
            backlog: Mutex::new(VecDeque::new()),
            terminal: Mutex::new(None),
        }
    }

    /// The configured credit window.
    pub fn batch(&self) -> BatchSize {
        self.batch
    }

    /// Credit currently believed to be outstanding at the producer.
    pub fn pending(&self) -> i64 {
        self.pending.load(Ordering::Relaxed)
    }

    fn signal_complete(&self) {
        if let Some(complete) = &self.complete {
            let outcome = {
                let mut complete = complete.lock();
                panic::catch_unwind(AssertUnwindSafe(|| (**complete)()))
            };
            if let Err(payload) = outcome {
                terminal_callback_panicked("complete", payload);
            }
        }
    }

    fn signal_error(&self, failure: FlowError) {
        if let Some(on_error) = &self.error {
            let outcome = {
                let mut on_error = on_error.lock();
                panic::catch_unwind(AssertUnwindSafe(|| (**on_error)(failure)))
            };
            if let Err(payload) = outcome {
                terminal_callback_panicked("error", payload);
            }
        }
    }
}

impl<T: Send + 'static> Batched<T> {
    fn refill(&self, subscriber: &CallbackSubscriber<T>) {
        let Some(batch) = self.batch.limit() else {
            return;
        };

        let pending = self.pending.fetch_sub(1, Ordering::Relaxed) - 1;
        if pending < batch / 2 {
            let delta = batch - pending;
            self.pending.store(batch, Ordering::Relaxed);
            subscriber.request(delta);
        }
    }

    /// Deliver queued signals if no other frame is inside `next`.
    ///
    /// Callers store their signal before calling this, and the holder
    /// re-checks the queues after releasing `next`, so nothing is
    /// stranded between the two.
    fn drain(&self, subscriber: &CallbackSubscriber<T>) {
        while let Some(mut next) = self.next.try_lock() {
            while let Some(value) = self.pop(subscriber) {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| (**next)(value)));
                if let Err(payload) = outcome {
                    drop(next);
                    self.backlog.lock().clear();
                    self.terminal.lock().take();
                    subscriber.cancel();
                    let error = FlowError::from_panic("next", payload.as_ref());
                    error!(%error, "'next' method should not panic");
                    self.signal_error(error);
                    return;
                }
                self.refill(subscriber);
            }

            let terminal = self.terminal.lock().take();
            drop(next);
            match terminal {
                Some(Terminal::Complete) => self.signal_complete(),
                Some(Terminal::Error(failure)) => self.signal_error(failure),
                None => {}
            }

            if self.backlog.lock().is_empty() && self.terminal.lock().is_none() {
                return;
            }
        }
        trace!("signal queued behind a running 'next'");
    }

    fn pop(&self, subscriber: &CallbackSubscriber<T>) -> Option<T> {
        let mut backlog = self.backlog.lock();
        // Cancelled from inside `next`: nothing queued may be delivered.
        if !subscriber.is_subscribed() && self.terminal.lock().is_none() {
            backlog.clear();
            return None;
        }
        backlog.pop_front()
    }
}

impl<T: Send + 'static> SubscriberHooks<T> for Batched<T> {
    fn on_subscribe_impl(&self, subscriber: &CallbackSubscriber<T>) {
        let batch = self.batch.as_credits();
        self.pending.store(batch, Ordering::Relaxed);
        subscriber.request(batch);
    }

    fn on_next_impl(&self, subscriber: &CallbackSubscriber<T>, value: T) {
        self.backlog.lock().push_back(value);
        self.drain(subscriber);
    }

    fn on_complete_impl(&self, subscriber: &CallbackSubscriber<T>) {
        *self.terminal.lock() = Some(Terminal::Complete);
        self.drain(subscriber);
    }

    fn on_error_impl(&self, subscriber: &CallbackSubscriber<T>, failure: FlowError) {
        *self.terminal.lock() = Some(Terminal::Error(failure));
        self.drain(subscriber);
    }
}

fn terminal_callback_panicked(callback: &'static str, payload: Box<dyn Any + Send>) {
    let failure = FlowError::from_panic(callback, payload.as_ref());
    error!(error = %failure, callback, "terminal callback should not panic");
    if cfg!(debug_assertions) {
        panic::resume_unwind(payload);
    }
}

impl<T> std::fmt::Debug for Batched<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batched")
            .field("batch", &self.batch)
            .field("pending", &self.pending())
            .field("queued", &self.backlog.lock().len())
            .field("has_error", &self.error.is_some())
            .field("has_complete", &self.complete.is_some())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
