//! Subscriber Factories
//!
//! Named constructors for the callback-driven subscribers:
//!
//! | Callbacks               | Constructor                  |
//! |-------------------------|------------------------------|
//! | none                    | [`null`]                     |
//! | next                    | [`with_next`]                |
//! | next, error             | [`with_next_error`]          |
//! | next, error, complete   | [`with_next_error_complete`] |
//!
//! Every constructor returns a shared handle; pass a clone to the producer
//! and keep one if the stream may need to be cancelled.

use std::sync::Arc;

use super::base::BaseSubscriber;
use super::batched::{Batched, CallbackSubscriber};
use super::null::{Null, NullSubscriber};
use crate::batch::BatchSize;
use crate::error::FlowError;

/// A subscriber that requests unbounded credit and discards every signal.
pub fn null<T>() -> Arc<NullSubscriber<T>> {
    BaseSubscriber::new(Null)
}

/// A subscriber that hands every value to `next`.
pub fn with_next<T, N>(next: N, batch: BatchSize) -> Arc<CallbackSubscriber<T>>
where
    T: Send + 'static,
    N: FnMut(T) + Send + 'static,
{
    BaseSubscriber::new(Batched::new(Box::new(next), None, None, batch))
}

/// A subscriber with value and error callbacks.
pub fn with_next_error<T, N, E>(next: N, error: E, batch: BatchSize) -> Arc<CallbackSubscriber<T>>
where
    T: Send + 'static,
    N: FnMut(T) + Send + 'static,
    E: FnMut(FlowError) + Send + 'static,
{
    BaseSubscriber::new(Batched::new(
        Box::new(next),
        Some(Box::new(error)),
        None,
        batch,
    ))
}

/// A subscriber with value, error and completion callbacks.
pub fn with_next_error_complete<T, N, E, C>(
    next: N,
    error: E,
    complete: C,
    batch: BatchSize,
) -> Arc<CallbackSubscriber<T>>
where
    T: Send + 'static,
    N: FnMut(T) + Send + 'static,
    E: FnMut(FlowError) + Send + 'static,
    C: FnMut() + Send + 'static,
{
    BaseSubscriber::new(Batched::new(
        Box::new(next),
        Some(Box::new(error)),
        Some(Box::new(complete)),
        batch,
    ))
}
