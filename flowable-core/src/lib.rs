//! Flowable Core
//!
//! This crate provides the subscriber side of a flow-controlled stream
//! ("flowable"). It implements:
//!
//! - Credit arithmetic with an unbounded sentinel
//! - The `Subscriber`/`Subscription` signalling protocol
//! - `BaseSubscriber`, a reusable state machine that enforces that protocol
//! - A callback-driven subscriber that keeps its producer fed in half-batch
//!   refills
//!
//! Producers, operators and executors live elsewhere; they depend on the
//! traits defined here.
//!
//! # Architecture
//!
//! - `credits`: saturating credit arithmetic and a producer-side counter
//! - `subscription`: the handle a producer gives its subscriber
//! - `subscriber`: the receiving protocol, `BaseSubscriber` and factories
//! - `batch`: the batch-size configuration value
//! - `error`: the error carried by `on_error`
//!
//! Nothing here owns a thread. Every signal runs synchronously on whatever
//! thread the producer calls from.
//!
//! # Example
//!
//! ```rust
//! use flowable_core::subscriber::{factory, Subscriber};
//! use flowable_core::{subscription, BatchSize};
//!
//! let subscriber = factory::with_next_error_complete(
//!     |value: u32| println!("got {value}"),
//!     |error| eprintln!("failed: {error}"),
//!     || println!("done"),
//!     BatchSize::new(8)?,
//! );
//!
//! // A producer would normally drive these signals.
//! subscriber.on_subscribe(subscription::empty());
//! subscriber.on_next(1);
//! subscriber.on_complete();
//! assert!(!subscriber.is_subscribed());
//! # Ok::<(), flowable_core::FlowError>(())
//! ```

pub mod batch;
pub mod credits;
pub mod error;
pub mod subscriber;
pub mod subscription;

pub use batch::BatchSize;
pub use error::{FlowError, FlowResult};
pub use subscriber::{BaseSubscriber, Subscriber, SubscriberHooks};
pub use subscription::{SharedSubscription, Subscription};
