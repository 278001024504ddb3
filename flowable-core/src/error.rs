//! Error types carried through the `on_error` channel.

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;

/// Result alias for fallible flowable operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// A wrapped failure delivered to a subscriber's `on_error`.
///
/// Producers use this to report their own failures; the batched subscriber
/// uses it to report a panic raised by a user callback. The type is cheap
/// to clone so operators can fan an error out without re-wrapping it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FlowError {
    /// A textual error reported by a producer.
    #[error("{0}")]
    Message(String),

    /// A user callback panicked while handling a signal.
    #[error("'{callback}' callback panicked: {message}")]
    CallbackPanicked {
        /// Which callback unwound (`next`, `error` or `complete`).
        callback: &'static str,
        /// The printable panic payload.
        message: String,
    },

    /// Any other error, displayed as-is.
    #[error(transparent)]
    Source(Arc<dyn StdError + Send + Sync + 'static>),
}

impl FlowError {
    /// Create an error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap an arbitrary error.
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Source(Arc::new(error))
    }

    /// Wrap the payload of a caught panic.
    pub fn from_panic(callback: &'static str, payload: &(dyn Any + Send)) -> Self {
        Self::CallbackPanicked {
            callback,
            message: panic_message(payload),
        }
    }

    /// Returns true if this error was synthesized from a callback panic.
    pub fn is_callback_panic(&self) -> bool {
        matches!(self, Self::CallbackPanicked { .. })
    }
}

/// Render a panic payload the way the default panic hook does.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
