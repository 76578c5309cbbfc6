//! Backtest error types.

use quantlab_core::ConfigError;
use thiserror::Error;

/// Errors raised by the backtest engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BacktestError {
    /// The configuration failed validation.
    #[error("invalid backtest configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The price path is too short to evaluate a single bar.
    #[error("insufficient price history: need more than {lookback} bars, got {bars}")]
    InsufficientData {
        /// Configured lookback period.
        lookback: usize,
        /// Bars actually available.
        bars: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: BacktestError = ConfigError::zero_count("lookback").into();
        assert!(matches!(err, BacktestError::InvalidConfig(_)));
        assert!(err.to_string().contains("lookback"));
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = BacktestError::InsufficientData {
            lookback: 20,
            bars: 10,
        };
        assert!(err.to_string().contains("20"));
        assert!(err.to_string().contains("10"));
    }
}
