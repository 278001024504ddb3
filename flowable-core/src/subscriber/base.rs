//! BaseSubscriber
//!
//! `BaseSubscriber` implements the receiving half of the protocol once, so
//! operators only supply business logic through [`SubscriberHooks`].
//!
//! # State Machine
//!
//! ```text
//!   INITIAL --on_subscribe--> ACTIVE --on_next--> ACTIVE
//!                               |
//!                               +-- on_complete --> TERMINATED
//!                               +-- on_error    --> TERMINATED
//!                               +-- cancel()    --> TERMINATED
//! ```
//!
//! The state lives entirely in the subscription slot: empty before
//! `on_subscribe`, occupied while active, empty again once terminated.
//! Terminal paths swap the slot with `None`; whichever side observes the
//! occupied value wins and runs the terminal hooks. A producer-driven
//! `on_complete` racing a subscriber-driven `cancel` therefore terminates
//! exactly once.
//!
//! Illegal transitions (a second `on_subscribe`, a duplicate terminal
//! signal) trip debug assertions. Release builds ignore them.
//!
//! # Self-pinning
//!
//! While dispatching into a hook or the held subscription, the subscriber
//! keeps a strong reference to itself on the stack when
//! [`SubscriberHooks::KEEP_REFERENCE_TO_THIS`] is true. A hook may then drop
//! every other handle to the subscriber without the allocation going away
//! before the dispatch returns.

use std::marker::PhantomData;
use std::sync::{Arc, Weak};

#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use tracing::{trace, warn};

use super::Subscriber;
use crate::error::FlowError;
use crate::subscription::SharedSubscription;

/// Business-logic hooks plugged into a [`BaseSubscriber`].
///
/// Every hook receives the owning subscriber so it can `request` more
/// credit or `cancel` the stream.
pub trait SubscriberHooks<T>: Send + Sync + Sized + 'static {
    /// Pin the subscriber for the duration of each dispatch.
    ///
    /// Hooks that can guarantee an outside reference outlives every signal
    /// may set this to false to skip an atomic increment/decrement pair.
    const KEEP_REFERENCE_TO_THIS: bool = true;

    /// Called once the subscription is stored. Expected to request credit.
    fn on_subscribe_impl(&self, subscriber: &BaseSubscriber<T, Self>);

    /// Called for every value delivered while the subscription is live.
    fn on_next_impl(&self, subscriber: &BaseSubscriber<T, Self>, value: T);

    /// Called when the producer completes the stream.
    fn on_complete_impl(&self, subscriber: &BaseSubscriber<T, Self>);

    /// Called when the producer fails the stream.
    fn on_error_impl(&self, subscriber: &BaseSubscriber<T, Self>, error: FlowError);

    /// Called exactly once at the end of whichever terminal path wins.
    fn on_terminate_impl(&self, _subscriber: &BaseSubscriber<T, Self>) {}
}

/// A subscriber that enforces the signalling protocol around a set of hooks.
pub struct BaseSubscriber<T, H> {
    /// Occupied between `on_subscribe` and the terminal transition.
    subscription: ArcSwapOption<SharedSubscription>,

    /// Handle used to pin `self` during dispatch.
    this: Weak<Self>,

    hooks: H,

    #[cfg(debug_assertions)]
    got_on_subscribe: AtomicBool,

    #[cfg(debug_assertions)]
    got_terminating: AtomicBool,

    _marker: PhantomData<fn(T)>,
}

impl<T, H> BaseSubscriber<T, H>
where
    H: SubscriberHooks<T>,
{
    /// Create a subscriber around the given hooks.
    ///
    /// Subscribers are always shared: the producer holds one reference and
    /// the caller may keep another.
    pub fn new(hooks: H) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            subscription: ArcSwapOption::empty(),
            this: this.clone(),
            hooks,
            #[cfg(debug_assertions)]
            got_on_subscribe: AtomicBool::new(false),
            #[cfg(debug_assertions)]
            got_terminating: AtomicBool::new(false),
            _marker: PhantomData,
        })
    }

    /// The hooks this subscriber dispatches to.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Returns true while a subscription is held (after `on_subscribe`
    /// and before termination).
    pub fn is_subscribed(&self) -> bool {
        self.subscription.load().is_some()
    }

    /// Grant `n` more values of credit to the producer.
    ///
    /// Dropped if there is no live subscription.
    pub fn request(&self, n: i64) {
        if let Some(subscription) = self.subscription.load_full() {
            let _pin = self.pin();
            subscription.request(n);
        } else if cfg!(debug_assertions) {
            trace!(n, "request() on BaseSubscriber with no subscription");
        }
    }

    /// Cancel the stream.
    ///
    /// The first call that finds a live subscription cancels it and runs
    /// `on_terminate_impl`; every other call is a no-op.
    pub fn cancel(&self) {
        if let Some(subscription) = self.subscription.swap(None) {
            let _pin = self.pin();
            subscription.cancel();
            self.hooks.on_terminate_impl(self);
        } else if cfg!(debug_assertions) {
            trace!("cancel() on BaseSubscriber with no subscription");
        }
    }

    fn pin(&self) -> Option<Arc<Self>> {
        if H::KEEP_REFERENCE_TO_THIS {
            self.this.upgrade()
        } else {
            None
        }
    }

    #[cfg(debug_assertions)]
    fn check_terminating(&self) {
        debug_assert!(
            self.got_on_subscribe.load(Ordering::SeqCst),
            "Not subscribed to BaseSubscriber"
        );
        let already = self.got_terminating.swap(true, Ordering::SeqCst);
        debug_assert!(!already, "Already got terminating signal method");
    }
}

impl<T, H> Subscriber<T> for BaseSubscriber<T, H>
where
    H: SubscriberHooks<T>,
{
    fn on_subscribe(&self, subscription: SharedSubscription) {
        #[cfg(debug_assertions)]
        {
            let already = self.got_on_subscribe.swap(true, Ordering::SeqCst);
            debug_assert!(!already, "Already subscribed to BaseSubscriber");
        }

        // Only an empty slot accepts a subscription.
        let previous = self.subscription.compare_and_swap(
            &None::<Arc<SharedSubscription>>,
            Some(Arc::new(subscription.clone())),
        );
        if previous.is_some() {
            warn!("on_subscribe() on BaseSubscriber that already holds a subscription");
            subscription.cancel();
            return;
        }

        let _pin = self.pin();
        self.hooks.on_subscribe_impl(self);
    }

    fn on_next(&self, value: T) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(
                self.got_on_subscribe.load(Ordering::SeqCst),
                "Not subscribed to BaseSubscriber"
            );
            if self.got_terminating.load(Ordering::SeqCst) {
                trace!("BaseSubscriber already got terminating signal method");
            }
        }

        if self.is_subscribed() {
            let _pin = self.pin();
            self.hooks.on_next_impl(self, value);
        }
    }

    fn on_complete(&self) {
        #[cfg(debug_assertions)]
        self.check_terminating();

        if let Some(_subscription) = self.subscription.swap(None) {
            let _pin = self.pin();
            self.hooks.on_complete_impl(self);
            self.hooks.on_terminate_impl(self);
        }
    }

    fn on_error(&self, error: FlowError) {
        #[cfg(debug_assertions)]
        self.check_terminating();

        if let Some(_subscription) = self.subscription.swap(None) {
            let _pin = self.pin();
            self.hooks.on_error_impl(self, error);
            self.hooks.on_terminate_impl(self);
        }
    }
}

impl<T, H> std::fmt::Debug for BaseSubscriber<T, H>
where
    H: SubscriberHooks<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseSubscriber")
            .field("subscribed", &self.is_subscribed())
            .field("keep_reference_to_this", &H::KEEP_REFERENCE_TO_THIS)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
