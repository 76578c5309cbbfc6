//! Risk-engine errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantlab_core::ConfigError;

/// Errors raised by the Monte Carlo engine.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum RiskError {
    /// The simulation configuration failed validation.
    #[error("invalid simulation configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
