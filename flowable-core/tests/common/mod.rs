//! Test producers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use flowable_core::credits::Credits;
use flowable_core::{FlowError, Subscriber, Subscription};

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Subscription that records every call and tracks credit.
#[derive(Debug, Default)]
pub struct RecordingSubscription {
    requests: Mutex<Vec<i64>>,
    cancels: AtomicUsize,
    credits: Credits,
}

impl RecordingSubscription {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<i64> {
        self.requests.lock().clone()
    }

    pub fn total_requested(&self) -> i64 {
        self.requests().iter().sum()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn credits(&self) -> &Credits {
        &self.credits
    }
}

impl Subscription for RecordingSubscription {
    fn request(&self, n: i64) {
        self.requests.lock().push(n);
        self.credits.add(n);
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.credits.cancel();
    }
}

/// A producer driven step by step from the test body.
pub struct ManualProducer<T> {
    subscriber: Arc<dyn Subscriber<T>>,
    subscription: Arc<RecordingSubscription>,
    delivered: usize,
}

impl<T: 'static> ManualProducer<T> {
    /// Subscribe `subscriber` and hand it a recording subscription.
    pub fn subscribe<S>(subscriber: Arc<S>) -> Self
    where
        S: Subscriber<T> + 'static,
    {
        let subscriber: Arc<dyn Subscriber<T>> = subscriber;
        let subscription = RecordingSubscription::new();
        subscriber.on_subscribe(subscription.clone());
        Self {
            subscriber,
            subscription,
            delivered: 0,
        }
    }

    pub fn subscription(&self) -> &RecordingSubscription {
        &self.subscription
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Deliver `value` if credit allows. Returns false otherwise.
    pub fn emit(&mut self, value: T) -> bool {
        if !self.subscription.credits().try_consume(1) {
            return false;
        }
        self.delivered += 1;
        self.subscriber.on_next(value);
        true
    }

    /// Deliver `value` regardless of credit, as a misbehaving producer would.
    pub fn force_emit(&mut self, value: T) {
        self.delivered += 1;
        self.subscriber.on_next(value);
    }

    pub fn complete(&self) {
        self.subscriber.on_complete();
    }

    pub fn error(&self, error: FlowError) {
        self.subscriber.on_error(error);
    }
}

/// A producer that emits `0..end` synchronously from inside `request`.
///
/// Re-entrant requests are trampolined onto the outermost emit loop.
pub struct RangeSubscription {
    subscriber: Mutex<Option<Weak<dyn Subscriber<u64>>>>,
    credits: Credits,
    next: AtomicUsize,
    end: u64,
    emitting: AtomicBool,
    grants: Mutex<Vec<i64>>,
}

impl RangeSubscription {
    pub fn subscribe(end: u64, subscriber: &Arc<dyn Subscriber<u64>>) -> Arc<Self> {
        let subscription = Arc::new(Self {
            subscriber: Mutex::new(Some(Arc::downgrade(subscriber))),
            credits: Credits::new(),
            next: AtomicUsize::new(0),
            end,
            emitting: AtomicBool::new(false),
            grants: Mutex::new(Vec::new()),
        });
        subscriber.on_subscribe(subscription.clone());
        subscription
    }

    pub fn grants(&self) -> Vec<i64> {
        self.grants.lock().clone()
    }

    fn target(&self) -> Option<Arc<dyn Subscriber<u64>>> {
        self.subscriber.lock().as_ref().and_then(Weak::upgrade)
    }

    fn drain(&self) {
        loop {
            let Some(subscriber) = self.target() else {
                return;
            };
            let index = self.next.load(Ordering::SeqCst) as u64;
            if index == self.end {
                self.subscriber.lock().take();
                subscriber.on_complete();
                return;
            }
            if !self.credits.try_consume(1) {
                return;
            }
            self.next.fetch_add(1, Ordering::SeqCst);
            subscriber.on_next(index);
        }
    }
}

impl Subscription for RangeSubscription {
    fn request(&self, n: i64) {
        self.grants.lock().push(n);
        self.credits.add(n);
        if self.emitting.swap(true, Ordering::SeqCst) {
            return;
        }
        self.drain();
        self.emitting.store(false, Ordering::SeqCst);
    }

    fn cancel(&self) {
        self.credits.cancel();
        self.subscriber.lock().take();
    }
}

/// A producer that emits `0..end` from inside `request` with no trampoline.
///
/// Every granted value is delivered before `request` returns, even when
/// `request` is itself called from inside the subscriber. Completes right
/// after the last value.
pub struct EagerSubscription {
    subscriber: Mutex<Option<Weak<dyn Subscriber<u64>>>>,
    next: AtomicU64,
    end: u64,
    grants: Mutex<Vec<i64>>,
}

impl EagerSubscription {
    pub fn subscribe(end: u64, subscriber: &Arc<dyn Subscriber<u64>>) -> Arc<Self> {
        let subscription = Arc::new(Self {
            subscriber: Mutex::new(Some(Arc::downgrade(subscriber))),
            next: AtomicU64::new(0),
            end,
            grants: Mutex::new(Vec::new()),
        });
        subscriber.on_subscribe(subscription.clone());
        subscription
    }

    pub fn grants(&self) -> Vec<i64> {
        self.grants.lock().clone()
    }

    fn target(&self) -> Option<Arc<dyn Subscriber<u64>>> {
        self.subscriber.lock().as_ref().and_then(Weak::upgrade)
    }
}

impl Subscription for EagerSubscription {
    fn request(&self, n: i64) {
        self.grants.lock().push(n);
        for _ in 0..n {
            let Some(subscriber) = self.target() else {
                return;
            };
            let index = self.next.fetch_add(1, Ordering::SeqCst);
            subscriber.on_next(index);
            if index + 1 == self.end {
                self.subscriber.lock().take();
                subscriber.on_complete();
                return;
            }
        }
    }

    fn cancel(&self) {
        self.subscriber.lock().take();
    }
}
