//! Credit Arithmetic
//!
//! Credit is the number of values a producer may still deliver to its
//! subscriber. Subscribers grant credit through `Subscription::request`;
//! producers consume one unit for every `on_next` they emit.
//!
//! # Sentinels
//!
//! Two values of the `i64` range are reserved:
//!
//! - [`NO_FLOW_CONTROL`] (`i64::MAX`) means "unbounded": the producer may
//!   emit freely and no accounting takes place.
//! - [`CANCELED`] (`i64::MIN`) marks a stream whose subscriber has
//!   cancelled. Once cancelled, credit never becomes positive again.
//!
//! All additions saturate at [`NO_FLOW_CONTROL`], so a stream that has been
//! granted unbounded credit stays unbounded.

use std::sync::atomic::{AtomicI64, Ordering};

/// Credit value that disables flow control.
pub const NO_FLOW_CONTROL: i64 = i64::MAX;

/// Credit value recording that the stream was cancelled.
pub const CANCELED: i64 = i64::MIN;

/// Combine two credit values, saturating at [`NO_FLOW_CONTROL`].
///
/// Non-positive grants are ignored and a cancelled balance stays cancelled.
pub fn add(current: i64, grant: i64) -> i64 {
    if current == CANCELED {
        return CANCELED;
    }
    if grant <= 0 {
        return current;
    }
    match current.checked_add(grant) {
        Some(sum) => sum,
        None => NO_FLOW_CONTROL,
    }
}

/// Returns true if `credits` is the unbounded sentinel.
pub fn is_unbounded(credits: i64) -> bool {
    credits == NO_FLOW_CONTROL
}

/// Returns true if `credits` is the cancelled sentinel.
pub fn is_cancelled(credits: i64) -> bool {
    credits == CANCELED
}

/// Producer-side credit counter.
///
/// A producer keeps one of these per subscriber: `request` handlers call
/// [`Credits::add`], the emit loop calls [`Credits::try_consume`] before each
/// `on_next`.
#[derive(Debug)]
pub struct Credits {
    value: AtomicI64,
}

impl Default for Credits {
    fn default() -> Self {
        Self::new()
    }
}

impl Credits {
    /// Create a counter with no outstanding credit.
    pub fn new() -> Self {
        Self {
            value: AtomicI64::new(0),
        }
    }

    /// Add a grant to the balance.
    ///
    /// Returns the new balance.
    pub fn add(&self, grant: i64) -> i64 {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            let next = add(current, grant);
            match self.value.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Try to consume `n` units.
    ///
    /// Returns false, consuming nothing, if fewer than `n` units are
    /// available or the stream was cancelled. Unbounded credit is never
    /// decremented.
    pub fn try_consume(&self, n: i64) -> bool {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            if is_unbounded(current) {
                return true;
            }
            if current < n || is_cancelled(current) {
                return false;
            }
            match self.value.compare_exchange_weak(
                current,
                current - n,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Consume up to `n` units.
    ///
    /// Returns the number of units actually consumed.
    pub fn consume(&self, n: i64) -> i64 {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            if is_unbounded(current) {
                return n;
            }
            if current <= 0 {
                return 0;
            }
            let taken = current.min(n);
            match self.value.compare_exchange_weak(
                current,
                current - taken,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return taken,
                Err(actual) => current = actual,
            }
        }
    }

    /// Mark the stream as cancelled.
    ///
    /// Returns true if this call performed the transition.
    pub fn cancel(&self) -> bool {
        self.value.swap(CANCELED, Ordering::AcqRel) != CANCELED
    }

    /// Current balance, which may be one of the sentinels.
    pub fn available(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Returns true once [`Credits::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        is_cancelled(self.available())
    }
}
