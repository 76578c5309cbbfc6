//! Newton-Raphson implied-volatility solver.

use tracing::{debug, warn};

use crate::error::OptionError;
use crate::pricing::{d1_d2, norm_pdf, OptionInputs, PricingEngine};

/// Solver parameters. Defaults match common desk practice: seed at 30%
/// vol, bound the estimate to [1%, 500%], and stop once the repriced value
/// is within a tenth of a basis point of the target.
#[derive(Debug, Clone, Copy)]
pub struct ImpliedVolSolver {
    /// Starting volatility estimate.
    pub initial_guess: f64,
    /// Lower bound on the estimate.
    pub min_vol: f64,
    /// Upper bound on the estimate.
    pub max_vol: f64,
    /// Acceptable absolute price error.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for ImpliedVolSolver {
    fn default() -> Self {
        Self {
            initial_guess: 0.3,
            min_vol: 0.01,
            max_vol: 5.0,
            tolerance: 1e-4,
            max_iterations: 100,
        }
    }
}

/// Raw (undivided) Black-Scholes vega below this is treated as flat and
/// stops the iteration instead of dividing by it.
const VEGA_FLOOR: f64 = 1e-4;

impl ImpliedVolSolver {
    /// Solves for the volatility that reprices `inputs` (ignoring its
    /// `volatility` field) to `market_price`.
    ///
    /// Returns the best estimate found. Convergence inside the iteration
    /// cap is the normal case for any arbitrage-free price; a flat vega or
    /// an exhausted cap returns the latest bounded estimate with a warning
    /// rather than an error.
    pub fn solve(&self, market_price: f64, inputs: &OptionInputs) -> Result<f64, OptionError> {
        inputs.validate()?;
        if market_price <= 0.0 {
            return Err(OptionError::not_positive("market_price", market_price));
        }
        if inputs.time_to_expiry <= 0.0 {
            return Err(OptionError::InvalidInput {
                field: "time_to_expiry",
                value: inputs.time_to_expiry,
                reason: "implied volatility requires positive time to expiry",
            });
        }

        let engine = PricingEngine;
        let mut sigma = self.initial_guess;

        for iteration in 0..self.max_iterations {
            let trial = OptionInputs {
                volatility: sigma,
                ..*inputs
            };
            let diff = engine.price_unchecked(&trial) - market_price;
            if diff.abs() < self.tolerance {
                debug!(sigma, iteration, "implied volatility converged");
                return Ok(sigma);
            }

            let (d1, _) = d1_d2(&trial);
            let vega = trial.spot * norm_pdf(d1) * trial.time_to_expiry.sqrt();
            if vega < VEGA_FLOOR {
                warn!(sigma, iteration, vega, "vega underflow, stopping solver");
                return Ok(sigma);
            }

            sigma = (sigma - diff / vega).clamp(self.min_vol, self.max_vol);
        }

        warn!(sigma, "implied volatility did not converge within cap");
        Ok(sigma)
    }
}
