//! Subscription Capability
//!
//! A subscription is the handle a producer gives to exactly one subscriber.
//! Through it the subscriber grants credit (`request`) or gives up on the
//! stream (`cancel`). Both calls may arrive from any thread and must not
//! block for longer than the producer needs to record them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// The producer side of a subscriber/producer pair.
pub trait Subscription: Send + Sync {
    /// Grant `n` more values of credit.
    ///
    /// `n` equal to [`NO_FLOW_CONTROL`](crate::credits::NO_FLOW_CONTROL)
    /// disables flow control for the rest of the stream.
    fn request(&self, n: i64);

    /// Stop the stream. The producer should release its resources and
    /// stop signalling as soon as possible.
    fn cancel(&self);
}

/// A subscription shared between a producer and its subscriber.
pub type SharedSubscription = Arc<dyn Subscription>;

/// Create a subscription that ignores every call.
pub fn empty() -> SharedSubscription {
    Arc::new(EmptySubscription)
}

struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _n: i64) {}

    fn cancel(&self) {}
}

type RequestFn = Box<dyn Fn(i64) + Send + Sync>;
type CancelFn = Box<dyn FnOnce() + Send>;

/// A subscription built from a pair of closures.
///
/// The request handler may be re-entered if it synchronously signals the
/// subscriber. The cancel closure runs at most once; requests after
/// cancellation are dropped.
pub struct CallbackSubscription {
    on_request: RequestFn,
    on_cancel: Mutex<Option<CancelFn>>,
    cancelled: AtomicBool,
}

impl CallbackSubscription {
    /// Create a subscription from request and cancel handlers.
    pub fn new<R, C>(on_request: R, on_cancel: C) -> Arc<Self>
    where
        R: Fn(i64) + Send + Sync + 'static,
        C: FnOnce() + Send + 'static,
    {
        Arc::new(Self {
            on_request: Box::new(on_request),
            on_cancel: Mutex::new(Some(Box::new(on_cancel))),
            cancelled: AtomicBool::new(false),
        })
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Subscription for CallbackSubscription {
    fn request(&self, n: i64) {
        if self.is_cancelled() {
            return;
        }
        (self.on_request)(n);
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let on_cancel = self.on_cancel.lock().take();
        if let Some(on_cancel) = on_cancel {
            on_cancel();
        }
    }
}

impl std::fmt::Debug for CallbackSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSubscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
