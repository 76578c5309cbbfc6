//! Closed-form European option analytics.
//!
//! Prices and Greeks under the lognormal constant-volatility model, plus a
//! Newton-Raphson implied-volatility solver. All math is `f64`; the normal
//! CDF uses the Abramowitz-Stegun polynomial approximation so results are
//! reproducible across platforms without a special-functions dependency.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod pricing;
pub mod volatility;

pub use error::OptionError;
pub use pricing::{norm_cdf, norm_pdf, OptionGreeks, OptionInputs, OptionType, PricingEngine};
pub use volatility::ImpliedVolSolver;

/// Convenience re-exports.
pub mod prelude {
    pub use crate::error::OptionError;
    pub use crate::pricing::{OptionGreeks, OptionInputs, OptionType, PricingEngine};
    pub use crate::volatility::ImpliedVolSolver;
}
