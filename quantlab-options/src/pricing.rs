//! Black-Scholes pricing and Greeks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OptionError;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Right to buy at the strike.
    Call,
    /// Right to sell at the strike.
    Put,
}

/// Inputs for one pricing request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptionInputs {
    /// Spot price of the underlying.
    pub spot: f64,
    /// Strike price.
    pub strike: f64,
    /// Time to expiry in years. Non-positive values price at intrinsic.
    pub time_to_expiry: f64,
    /// Annualized risk-free rate as a decimal (0.05 = 5%).
    pub rate: f64,
    /// Annualized volatility as a decimal (0.2 = 20%).
    pub volatility: f64,
    /// Call or put.
    pub option_type: OptionType,
}

impl OptionInputs {
    /// Validates ranges. Expiry may be zero or negative (intrinsic-value
    /// degenerate case), but spot, strike, and volatility must be positive.
    pub fn validate(&self) -> Result<(), OptionError> {
        if self.spot <= 0.0 {
            return Err(OptionError::not_positive("spot", self.spot));
        }
        if self.strike <= 0.0 {
            return Err(OptionError::not_positive("strike", self.strike));
        }
        if self.volatility <= 0.0 {
            return Err(OptionError::not_positive("volatility", self.volatility));
        }
        Ok(())
    }

    fn intrinsic(&self) -> f64 {
        match self.option_type {
            OptionType::Call => (self.spot - self.strike).max(0.0),
            OptionType::Put => (self.strike - self.spot).max(0.0),
        }
    }
}

/// Option value and sensitivities.
///
/// Theta is per calendar day; vega and rho are per one percentage point of
/// volatility and rate respectively.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OptionGreeks {
    /// Present value of the option.
    pub price: f64,
    /// Sensitivity to spot.
    pub delta: f64,
    /// Sensitivity of delta to spot.
    pub gamma: f64,
    /// Value decay per day.
    pub theta: f64,
    /// Sensitivity per 1% volatility change.
    pub vega: f64,
    /// Sensitivity per 1% rate change.
    pub rho: f64,
}

/// Standard normal probability density.
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Standard normal CDF via the Abramowitz-Stegun five-term polynomial.
///
/// Absolute error is about 1.5e-7, which downstream Greeks tolerate.
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    if x < 0.0 {
        return 1.0 - norm_cdf(-x);
    }
    let k = 1.0 / (1.0 + 0.231_641_9 * x);
    let poly = k
        * (0.319_381_530
            + k * (-0.356_563_782
                + k * (1.781_477_937 + k * (-1.821_255_978 + k * 1.330_274_429))));
    1.0 - norm_pdf(x) * poly
}

/// Closed-form European pricing engine. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    /// Present value of the option.
    pub fn price(&self, inputs: &OptionInputs) -> Result<f64, OptionError> {
        inputs.validate()?;
        Ok(self.price_unchecked(inputs))
    }

    /// Full Greeks set, priced once.
    pub fn greeks(&self, inputs: &OptionInputs) -> Result<OptionGreeks, OptionError> {
        inputs.validate()?;

        if inputs.time_to_expiry <= 0.0 {
            return Ok(self.expired_greeks(inputs));
        }

        let (d1, d2) = d1_d2(inputs);
        let sqrt_t = inputs.time_to_expiry.sqrt();
        let discount = (-inputs.rate * inputs.time_to_expiry).exp();
        let pdf_d1 = norm_pdf(d1);

        let price = self.price_unchecked(inputs);
        let gamma = pdf_d1 / (inputs.spot * inputs.volatility * sqrt_t);
        let vega = inputs.spot * pdf_d1 * sqrt_t / 100.0;

        let decay = -inputs.spot * pdf_d1 * inputs.volatility / (2.0 * sqrt_t);
        let (delta, theta_annual, rho) = match inputs.option_type {
            OptionType::Call => (
                norm_cdf(d1),
                decay - inputs.rate * inputs.strike * discount * norm_cdf(d2),
                inputs.strike * inputs.time_to_expiry * discount * norm_cdf(d2) / 100.0,
            ),
            OptionType::Put => (
                norm_cdf(d1) - 1.0,
                decay + inputs.rate * inputs.strike * discount * norm_cdf(-d2),
                -inputs.strike * inputs.time_to_expiry * discount * norm_cdf(-d2) / 100.0,
            ),
        };

        debug!(price, delta, "priced option");
        Ok(OptionGreeks {
            price,
            delta,
            gamma,
            theta: theta_annual / 365.0,
            vega,
            rho,
        })
    }

    /// Price without input validation. Callers inside the crate validate
    /// once up front.
    pub(crate) fn price_unchecked(&self, inputs: &OptionInputs) -> f64 {
        if inputs.time_to_expiry <= 0.0 {
            return inputs.intrinsic();
        }

        let (d1, d2) = d1_d2(inputs);
        let discount = (-inputs.rate * inputs.time_to_expiry).exp();
        match inputs.option_type {
            OptionType::Call => {
                inputs.spot * norm_cdf(d1) - inputs.strike * discount * norm_cdf(d2)
            }
            OptionType::Put => {
                inputs.strike * discount * norm_cdf(-d2) - inputs.spot * norm_cdf(-d1)
            }
        }
    }

    /// Expired contracts carry intrinsic value, a boundary delta, and no
    /// other sensitivities.
    fn expired_greeks(&self, inputs: &OptionInputs) -> OptionGreeks {
        let delta = match inputs.option_type {
            OptionType::Call if inputs.spot > inputs.strike => 1.0,
            OptionType::Put if inputs.spot < inputs.strike => -1.0,
            _ => 0.0,
        };
        OptionGreeks {
            price: inputs.intrinsic(),
            delta,
            ..OptionGreeks::default()
        }
    }
}

pub(crate) fn d1_d2(inputs: &OptionInputs) -> (f64, f64) {
    let sqrt_t = inputs.time_to_expiry.sqrt();
    let d1 = ((inputs.spot / inputs.strike).ln()
        + (inputs.rate + inputs.volatility * inputs.volatility / 2.0) * inputs.time_to_expiry)
        / (inputs.volatility * sqrt_t);
    (d1, d1 - inputs.volatility * sqrt_t)
}
