/// Amount validation: turns whatever the user typed into a positive number.
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Result, WidgetError};

pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid positive amount.";

/// Largest integer an f64 represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A positive, finite token amount. The only way to get one is through
/// [`validate`] or [`ValidatedAmount::new`], so anything holding a
/// `ValidatedAmount` can skip re-checking.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ValidatedAmount(f64);

impl ValidatedAmount {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(WidgetError::Validation(INVALID_AMOUNT_MESSAGE.to_string()))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ValidatedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Whole amounts go on the wire as JSON integers (`50`, not `50.0`).
impl Serialize for ValidatedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0 <= MAX_EXACT_INTEGER {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// Parse raw amount text. Empty, malformed, NaN, infinite, zero and negative
/// input all fail with the same [`INVALID_AMOUNT_MESSAGE`].
#[must_use = "validation result should be checked"]
pub fn validate(raw: &str) -> Result<ValidatedAmount> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| WidgetError::Validation(INVALID_AMOUNT_MESSAGE.to_string()))?;
    ValidatedAmount::new(parsed)
}
