//! Portfolio-crate errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantlab_core::ConfigError;

/// Errors raised by the optimizer and Kelly calculator.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PortfolioError {
    /// Configuration failed validation.
    #[error("invalid portfolio configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The optimizer needs at least one asset.
    #[error("asset universe is empty")]
    EmptyUniverse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            PortfolioError::EmptyUniverse.to_string(),
            "asset universe is empty"
        );
    }
}
