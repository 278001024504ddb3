//! Batch Size Configuration
//!
//! The credit window used by the batched subscriber. In configuration
//! files it is written either as a positive integer or as the string
//! `"unbounded"`:
//!
//! ```json
//! { "batch": 64 }
//! { "batch": "unbounded" }
//! ```

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::credits::NO_FLOW_CONTROL;
use crate::error::{FlowError, FlowResult};

const UNBOUNDED_KEYWORD: &str = "unbounded";

/// How much credit a batched subscriber keeps outstanding.
///
/// Always positive: either a finite window built through
/// [`BatchSize::new`], or [`BatchSize::UNBOUNDED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BatchSizeRepr", into = "BatchSizeRepr")]
pub struct BatchSize(i64);

impl BatchSize {
    /// Request [`NO_FLOW_CONTROL`] once and never account for credit.
    pub const UNBOUNDED: Self = Self(NO_FLOW_CONTROL);

    /// Validate a raw credit count.
    ///
    /// [`NO_FLOW_CONTROL`] maps to [`BatchSize::UNBOUNDED`]; zero and
    /// negative values are rejected.
    pub fn new(credits: i64) -> FlowResult<Self> {
        if credits > 0 {
            Ok(Self(credits))
        } else {
            Err(FlowError::msg(format!(
                "batch size must be positive, got {credits}"
            )))
        }
    }

    /// The credit count used on the wire.
    pub fn as_credits(self) -> i64 {
        self.0
    }

    /// The finite window, or `None` when unbounded.
    pub fn limit(self) -> Option<i64> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.0)
        }
    }

    /// Returns true for [`BatchSize::UNBOUNDED`].
    pub fn is_unbounded(self) -> bool {
        self.0 == NO_FLOW_CONTROL
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl From<NonZeroU32> for BatchSize {
    fn from(credits: NonZeroU32) -> Self {
        Self(i64::from(credits.get()))
    }
}

impl From<BatchSize> for i64 {
    fn from(batch: BatchSize) -> Self {
        batch.as_credits()
    }
}

impl TryFrom<i64> for BatchSize {
    type Error = FlowError;

    fn try_from(credits: i64) -> Result<Self, Self::Error> {
        Self::new(credits)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BatchSizeRepr {
    Credits(i64),
    Keyword(String),
}

impl TryFrom<BatchSizeRepr> for BatchSize {
    type Error = FlowError;

    fn try_from(repr: BatchSizeRepr) -> Result<Self, Self::Error> {
        match repr {
            BatchSizeRepr::Credits(n) => Self::new(n),
            BatchSizeRepr::Keyword(word) if word == UNBOUNDED_KEYWORD => Ok(Self::UNBOUNDED),
            BatchSizeRepr::Keyword(word) => Err(FlowError::msg(format!(
                "unknown batch size {word:?}, expected a positive integer or \"{UNBOUNDED_KEYWORD}\""
            ))),
        }
    }
}

impl From<BatchSize> for BatchSizeRepr {
    fn from(batch: BatchSize) -> Self {
        match batch.limit() {
            None => Self::Keyword(UNBOUNDED_KEYWORD.to_string()),
            Some(n) => Self::Credits(n),
        }
    }
}
