//! Subscribers
//!
//! The receiving half of a flowable stream. A producer that has been
//! subscribed to signals its subscriber in a strict order:
//!
//! ```text
//!   on_subscribe (on_next)* (on_complete | on_error)?
//! ```
//!
//! The subscriber drives flow control: it grants credit through the
//! subscription handed to `on_subscribe`, and the producer may never emit
//! more values than the credit outstanding.
//!
//! # Rules
//!
//! - `on_subscribe` is called exactly once and before anything else.
//! - Signals to one subscriber are serialized by the producer; they may
//!   arrive on any thread, but never concurrently.
//! - At most one terminal signal is delivered. Nothing follows it.
//! - A subscriber may cancel at any point, after which further signals are
//!   ignored.
//!
//! [`BaseSubscriber`] enforces these rules around a set of
//! [`SubscriberHooks`]; the [`factory`] functions build ready-made
//! subscribers from plain callbacks.

mod base;
mod batched;
pub mod factory;
mod null;

pub use base::{BaseSubscriber, SubscriberHooks};
pub use batched::{Batched, CallbackSubscriber};
pub use null::{Null, NullSubscriber};

use crate::error::FlowError;
use crate::subscription::SharedSubscription;

/// The receiving end of a flowable stream.
pub trait Subscriber<T>: Send + Sync {
    /// Receive the subscription. Called exactly once, before any other
    /// signal.
    fn on_subscribe(&self, subscription: SharedSubscription);

    /// Receive one value. Never called beyond the credit requested.
    fn on_next(&self, value: T);

    /// The stream finished successfully.
    fn on_complete(&self);

    /// The stream failed.
    fn on_error(&self, error: FlowError);
}
