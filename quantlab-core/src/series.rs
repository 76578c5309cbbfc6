//! Synthetic price path generation.
//!
//! Produces the biased random walk that the backtest engine trades
//! against. The walk carries a deliberate small upward drift: per-bar
//! returns are drawn as `(U - 0.48) * 2 * daily_vol / 100` with
//! `daily_vol = volatility / sqrt(252)`, so a uniform draw above 0.48
//! moves the price up. The drift constant is part of the documented
//! contract and must not be re-centered.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rng::RandomVariate;

/// Trading days per year used for volatility de-annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Configuration for a synthetic price path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeriesConfig {
    /// Price of the first bar.
    pub start_price: f64,
    /// Number of bars to generate.
    pub periods: usize,
    /// Annualized volatility in percent (e.g. 20.0 for 20%).
    pub volatility: f64,
}

impl PriceSeriesConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_price <= 0.0 {
            return Err(ConfigError::not_positive("start_price", self.start_price));
        }
        if self.periods == 0 {
            return Err(ConfigError::zero_count("periods"));
        }
        if self.volatility <= 0.0 {
            return Err(ConfigError::not_positive("volatility", self.volatility));
        }
        Ok(())
    }
}

/// Generator for biased random-walk price paths.
///
/// Each call to [`generate`](Self::generate) consumes variates from the
/// supplied source and produces a fresh path; the generator is not
/// restartable mid-path.
#[derive(Debug, Clone)]
pub struct PriceSeriesGenerator {
    config: PriceSeriesConfig,
}

impl PriceSeriesGenerator {
    /// Creates a generator for the given configuration.
    #[must_use]
    pub const fn new(config: PriceSeriesConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PriceSeriesConfig {
        &self.config
    }

    /// Generates a price path of `periods` bars.
    ///
    /// Prices are floored at 1.0 so the path can never reach a
    /// non-positive value.
    pub fn generate(&self, rv: &mut RandomVariate) -> Vec<f64> {
        let daily_vol = self.config.volatility / TRADING_DAYS_PER_YEAR.sqrt();

        let mut prices = Vec::with_capacity(self.config.periods);
        let mut price = self.config.start_price;
        prices.push(price);

        for _ in 1..self.config.periods {
            let change = (rv.next_uniform() - 0.48) * 2.0 * daily_vol / 100.0;
            price = (price * (1.0 + change)).max(1.0);
            prices.push(price);
        }

        prices
    }
}
