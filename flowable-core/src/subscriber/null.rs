//! Null Subscriber
//!
//! Requests unbounded credit and discards every signal. Useful to run a
//! producer purely for its side effects.

use super::base::{BaseSubscriber, SubscriberHooks};
use crate::credits::NO_FLOW_CONTROL;
use crate::error::FlowError;

/// A subscriber that drains its producer and ignores everything it sees.
pub type NullSubscriber<T> = BaseSubscriber<T, Null>;

/// Hooks for [`NullSubscriber`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Null;

impl<T> SubscriberHooks<T> for Null {
    fn on_subscribe_impl(&self, subscriber: &BaseSubscriber<T, Self>) {
        subscriber.request(NO_FLOW_CONTROL);
    }

    fn on_next_impl(&self, _subscriber: &BaseSubscriber<T, Self>, _value: T) {}

    fn on_complete_impl(&self, _subscriber: &BaseSubscriber<T, Self>) {}

    fn on_error_impl(&self, _subscriber: &BaseSubscriber<T, Self>, _error: FlowError) {}
}
