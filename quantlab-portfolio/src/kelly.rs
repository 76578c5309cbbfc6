//! Kelly-criterion bet sizing.

use serde::{Deserialize, Serialize};

use quantlab_core::ConfigError;

use crate::error::PortfolioError;

/// Inputs for one Kelly evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyInputs {
    /// Probability of winning, percent.
    pub win_probability: f64,
    /// Amount won per winning bet.
    pub win_amount: f64,
    /// Amount lost per losing bet.
    pub loss_amount: f64,
    /// Total bankroll available.
    pub bankroll: f64,
    /// Scale on the full Kelly fraction, e.g. 0.5 for half-Kelly.
    #[serde(default = "default_multiplier")]
    pub kelly_multiplier: f64,
}

fn default_multiplier() -> f64 {
    0.5
}

impl KellyInputs {
    /// Validates ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.win_probability <= 0.0 || self.win_probability >= 100.0 {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "win_probability ({}) must lie strictly between 0 and 100",
                    self.win_probability
                ),
            });
        }
        if self.win_amount <= 0.0 {
            return Err(ConfigError::not_positive("win_amount", self.win_amount));
        }
        if self.loss_amount <= 0.0 {
            return Err(ConfigError::not_positive("loss_amount", self.loss_amount));
        }
        if self.bankroll <= 0.0 {
            return Err(ConfigError::not_positive("bankroll", self.bankroll));
        }
        if self.kelly_multiplier <= 0.0 {
            return Err(ConfigError::not_positive(
                "kelly_multiplier",
                self.kelly_multiplier,
            ));
        }
        Ok(())
    }
}

/// Derived Kelly statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyResult {
    /// Growth-optimal bankroll fraction, floored at 0.
    pub full_kelly: f64,
    /// Full Kelly scaled by the configured multiplier.
    pub fractional_kelly: f64,
    /// Fractional Kelly applied to the bankroll, in currency.
    pub optimal_bet: f64,
    /// Arithmetic expected value per bet, in currency.
    pub expected_value: f64,
    /// Expected log-growth per bet at the fractional Kelly stake.
    pub log_growth: f64,
    /// Expected number of bets to double the bankroll; `None` when growth
    /// is non-positive.
    pub bets_to_double: Option<f64>,
    /// Approximate probability of ruin, percent in `[0, 100]`. Reported as
    /// 100 when there is no edge.
    pub ruin_probability: f64,
}

/// Closed-form Kelly calculator. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct KellyCalculator;

impl KellyCalculator {
    /// Evaluates the Kelly statistics for `inputs`.
    pub fn evaluate(&self, inputs: &KellyInputs) -> Result<KellyResult, PortfolioError> {
        inputs.validate()?;

        let p = inputs.win_probability / 100.0;
        let q = 1.0 - p;
        let b = inputs.win_amount / inputs.loss_amount;

        let full_kelly = ((p * b - q) / b).max(0.0);
        let fractional_kelly = full_kelly * inputs.kelly_multiplier;
        let optimal_bet = fractional_kelly * inputs.bankroll;
        let expected_value = p * inputs.win_amount - q * inputs.loss_amount;

        // Log-growth is only defined on (0, 1); outside that the stake is
        // either nothing or guaranteed ruin on the first loss.
        let log_growth = if fractional_kelly > 0.0 && fractional_kelly < 1.0 {
            p * (1.0 + fractional_kelly * b).ln() + q * (1.0 - fractional_kelly).ln()
        } else {
            0.0
        };

        let bets_to_double = if log_growth > 0.0 {
            Some(std::f64::consts::LN_2 / log_growth)
        } else {
            None
        };

        let ruin_probability = if full_kelly <= 0.0 {
            100.0
        } else {
            let units = inputs.bankroll / inputs.loss_amount / 10.0;
            ((q / p).powf(units) * 100.0).clamp(0.0, 100.0)
        };

        Ok(KellyResult {
            full_kelly,
            fractional_kelly,
            optimal_bet,
            expected_value,
            log_growth,
            bets_to_double,
            ruin_probability,
        })
    }
}
