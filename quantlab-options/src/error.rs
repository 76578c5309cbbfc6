//! Option-engine errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the pricing engine and implied-volatility solver.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum OptionError {
    /// An input value is outside its valid range.
    #[error("invalid option input: {field} = {value}, {reason}")]
    InvalidInput {
        /// The offending input.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

impl OptionError {
    /// Shorthand for a value that must be strictly positive.
    #[must_use]
    pub fn not_positive(field: &'static str, value: f64) -> Self {
        Self::InvalidInput {
            field,
            value,
            reason: "must be strictly positive",
        }
    }
}
