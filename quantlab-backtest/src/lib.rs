//! # QuantLab Backtest
//!
//! Backtesting engine for the QuantLab analytics toolkit.
//!
//! This crate provides:
//! - Signal generation for five strategy variants (mean reversion,
//!   momentum, RSI, Bollinger, breakout)
//! - Single-position backtest execution with commission, slippage and
//!   stop-loss/take-profit handling
//! - Risk and performance statistics derived from the equity curve and
//!   trade ledger
//! - Deterministic execution given a fixed price path

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![cfg_attr(test, allow(clippy::float_cmp))]

/// Backtest execution engine.
pub mod engine;
mod error;
/// Risk and performance statistics.
pub mod metrics;
/// Strategy signal generation.
pub mod strategy;

pub use engine::{BacktestConfig, BacktestEngine, BacktestReport, Side, Trade};
pub use error::BacktestError;
pub use metrics::{RiskMetrics, RiskMetricsCalculator};
pub use strategy::{Signal, SignalEngine, SignalParams, StrategyKind};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{BacktestConfig, BacktestEngine, BacktestReport, Side, Trade};
    pub use crate::error::BacktestError;
    pub use crate::metrics::{RiskMetrics, RiskMetricsCalculator};
    pub use crate::strategy::{Signal, SignalEngine, SignalParams, StrategyKind};
}
