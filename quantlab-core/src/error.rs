//! Configuration validation errors.
//!
//! Every engine configuration exposes a `validate()` method returning
//! `Result<(), ConfigError>`. Engines assume caller-validated inputs, so
//! validation happens once at the boundary rather than inside hot loops.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when an engine configuration fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// A field holds a value outside its permitted range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two fields are individually valid but mutually inconsistent.
    #[error("inconsistent configuration: {reason}")]
    Inconsistent {
        /// Description of the conflict.
        reason: String,
    },
}

impl ConfigError {
    /// Convenience constructor for a field that must be strictly positive.
    #[must_use]
    pub fn not_positive(field: &'static str, value: f64) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: format!("must be positive, got {value}"),
        }
    }

    /// Convenience constructor for a count field that must be non-zero.
    #[must_use]
    pub fn zero_count(field: &'static str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: "must be greater than 0".to_string(),
        }
    }
}
