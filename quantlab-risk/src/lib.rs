//! Monte Carlo Value-at-Risk engine.
//!
//! Simulates independent Geometric Brownian Motion paths of a portfolio
//! value and derives VaR, Conditional VaR, and the empirical terminal
//! distribution. Deterministic for a seeded random source.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod error;
pub mod monte_carlo;

pub use error::RiskError;
pub use monte_carlo::{HistogramBin, MonteCarloEngine, SimulationConfig, SimulationResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::error::RiskError;
    pub use crate::monte_carlo::{
        HistogramBin, MonteCarloEngine, SimulationConfig, SimulationResult,
    };
}
