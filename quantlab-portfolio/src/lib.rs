//! Portfolio construction tools.
//!
//! A random-search mean-variance optimizer over a fixed asset set with a
//! symmetric correlation table, and a closed-form Kelly-criterion bet
//! sizer.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod correlation;
pub mod error;
pub mod kelly;
pub mod optimizer;

pub use correlation::CorrelationTable;
pub use error::PortfolioError;
pub use kelly::{KellyCalculator, KellyInputs, KellyResult};
pub use optimizer::{
    Asset, FrontierPoint, Objective, OptimizationReport, OptimizerConfig, PortfolioOptimizer,
    PortfolioResult,
};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::correlation::CorrelationTable;
    pub use crate::error::PortfolioError;
    pub use crate::kelly::{KellyCalculator, KellyInputs, KellyResult};
    pub use crate::optimizer::{
        Asset, FrontierPoint, Objective, OptimizationReport, OptimizerConfig, PortfolioOptimizer,
        PortfolioResult,
    };
}
