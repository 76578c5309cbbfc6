//! Strategy signal generation.
//!
//! Maps indicator values and configuration to a trade signal for each of
//! the five strategy variants. Signal generation is pure: it looks only at
//! the price history up to the evaluated bar, never at engine state. The
//! backtest engine layers position gating on top.

use serde::{Deserialize, Serialize};

use quantlab_core::indicators;

/// Strategy variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Buy when price deviates below its SMA, sell above.
    #[default]
    MeanReversion,
    /// Inverse of mean reversion: trade with the deviation.
    Momentum,
    /// Buy oversold, sell overbought on RSI.
    Rsi,
    /// Buy below the lower Bollinger band, sell above the upper.
    Bollinger,
    /// Buy on new highs, sell on new lows of the trailing window.
    Breakout,
}

impl StrategyKind {
    /// Returns the variant keyword as used in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MeanReversion => "mean_reversion",
            Self::Momentum => "momentum",
            Self::Rsi => "rsi",
            Self::Bollinger => "bollinger",
            Self::Breakout => "breakout",
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean_reversion" => Ok(Self::MeanReversion),
            "momentum" => Ok(Self::Momentum),
            "rsi" => Ok(Self::Rsi),
            "bollinger" => Ok(Self::Bollinger),
            "breakout" => Ok(Self::Breakout),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// Trade signal emitted for a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Enter or add long exposure.
    Buy,
    /// Enter or add short exposure.
    Sell,
    /// No action.
    #[default]
    Hold,
}

/// Indicator parameters shared by the strategy variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalParams {
    /// Indicator lookback in bars.
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Deviation threshold in percent for mean reversion / momentum.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// RSI level above which the market counts as overbought.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    /// RSI level below which the market counts as oversold.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    /// Standard-deviation multiplier for the Bollinger bands.
    #[serde(default = "default_bollinger_k")]
    pub bollinger_k: f64,
}

fn default_lookback() -> usize {
    20
}

fn default_threshold() -> f64 {
    2.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_bollinger_k() -> f64 {
    2.0
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            threshold: default_threshold(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            bollinger_k: default_bollinger_k(),
        }
    }
}

/// Signal engine for one strategy variant.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    kind: StrategyKind,
    params: SignalParams,
}

impl SignalEngine {
    /// Creates a signal engine for the given variant and parameters.
    #[must_use]
    pub const fn new(kind: StrategyKind, params: SignalParams) -> Self {
        Self { kind, params }
    }

    /// Returns the strategy variant.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Evaluates the signal for the bar at `index`.
    ///
    /// `prices` must contain at least `index + 1` entries; the engine only
    /// reads history up to and including `index`.
    #[must_use]
    pub fn evaluate(&self, prices: &[f64], index: usize) -> Signal {
        let price = prices[index];
        let lookback = self.params.lookback;

        match self.kind {
            StrategyKind::MeanReversion => {
                match self.sma_deviation_pct(prices, index) {
                    Some(dev) if dev < -self.params.threshold => Signal::Buy,
                    Some(dev) if dev > self.params.threshold => Signal::Sell,
                    _ => Signal::Hold,
                }
            }
            StrategyKind::Momentum => {
                // Same deviation test as mean reversion, signals swapped.
                match self.sma_deviation_pct(prices, index) {
                    Some(dev) if dev < -self.params.threshold => Signal::Sell,
                    Some(dev) if dev > self.params.threshold => Signal::Buy,
                    _ => Signal::Hold,
                }
            }
            StrategyKind::Rsi => {
                let rsi = indicators::rsi(prices, index, lookback);
                if rsi < self.params.rsi_oversold {
                    Signal::Buy
                } else if rsi > self.params.rsi_overbought {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            }
            StrategyKind::Bollinger => {
                let (upper, _, lower) =
                    indicators::bollinger_bands(prices, index, lookback, self.params.bollinger_k);
                if price < lower {
                    Signal::Buy
                } else if price > upper {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            }
            StrategyKind::Breakout => {
                let high = indicators::rolling_high(prices, index, lookback);
                let low = indicators::rolling_low(prices, index, lookback);
                match (high, low) {
                    (Some(h), _) if price > h => Signal::Buy,
                    (_, Some(l)) if price < l => Signal::Sell,
                    _ => Signal::Hold,
                }
            }
        }
    }

    /// Percentage deviation of the current price from its SMA.
    fn sma_deviation_pct(&self, prices: &[f64], index: usize) -> Option<f64> {
        let sma = indicators::sma(prices, index, self.params.lookback);
        if sma == 0.0 {
            return None;
        }
        Some((prices[index] - sma) / sma * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(kind: StrategyKind) -> SignalEngine {
        SignalEngine::new(
            kind,
            SignalParams {
                lookback: 5,
                threshold: 2.0,
                rsi_overbought: 70.0,
                rsi_oversold: 30.0,
                bollinger_k: 2.0,
            },
        )
    }

    #[test]
    fn test_strategy_kind_serde() {
        let json = serde_json::to_string(&StrategyKind::MeanReversion).unwrap();
        assert_eq!(json, "\"mean_reversion\"");
        let parsed: StrategyKind = serde_json::from_str("\"breakout\"").unwrap();
        assert_eq!(parsed, StrategyKind::Breakout);
    }

    #[test]
    fn test_mean_reversion_buys_below_sma() {
        // SMA of window ≈ 101.6, price 90 is ~11% below.
        let prices = [102.0, 103.0, 101.0, 102.0, 104.0, 90.0];
        let signal = engine(StrategyKind::MeanReversion).evaluate(&prices, 5);
        assert_eq!(signal, Signal::Buy);
    }

    #[test]
    fn test_mean_reversion_sells_above_sma() {
        let prices = [102.0, 103.0, 101.0, 102.0, 104.0, 115.0];
        let signal = engine(StrategyKind::MeanReversion).evaluate(&prices, 5);
        assert_eq!(signal, Signal::Sell);
    }

    #[test]
    fn test_mean_reversion_holds_inside_threshold() {
        let prices = [100.0, 100.0, 100.0, 100.0, 100.0, 100.5];
        let signal = engine(StrategyKind::MeanReversion).evaluate(&prices, 5);
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn test_momentum_is_inverse_of_mean_reversion() {
        let below = [102.0, 103.0, 101.0, 102.0, 104.0, 90.0];
        let above = [102.0, 103.0, 101.0, 102.0, 104.0, 115.0];

        let momentum = engine(StrategyKind::Momentum);
        assert_eq!(momentum.evaluate(&below, 5), Signal::Sell);
        assert_eq!(momentum.evaluate(&above, 5), Signal::Buy);
    }

    #[test]
    fn test_rsi_buys_oversold() {
        // Monotonically falling prices drive RSI to 0.
        let prices: Vec<f64> = (0..10).map(|i| 100.0 - f64::from(i)).collect();
        let signal = engine(StrategyKind::Rsi).evaluate(&prices, 9);
        assert_eq!(signal, Signal::Buy);
    }

    #[test]
    fn test_rsi_sells_overbought() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 + f64::from(i)).collect();
        let signal = engine(StrategyKind::Rsi).evaluate(&prices, 9);
        assert_eq!(signal, Signal::Sell);
    }

    #[test]
    fn test_rsi_neutral_with_short_history() {
        // Fewer than lookback + 1 samples: RSI is the neutral 50, no signal.
        let prices = [100.0, 95.0];
        let signal = engine(StrategyKind::Rsi).evaluate(&prices, 1);
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn test_bollinger_band_breach() {
        // 20 quiet bars around 100, then a sharp move. The outlier sits in
        // its own window, so the breach has to be large relative to the
        // window's noise.
        let quiet: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.5 } else { 99.5 })
            .collect();
        let mut below = quiet.clone();
        below.push(95.0);
        let mut above = quiet.clone();
        above.push(105.0);

        let bollinger = SignalEngine::new(
            StrategyKind::Bollinger,
            SignalParams {
                lookback: 20,
                ..SignalParams::default()
            },
        );
        assert_eq!(bollinger.evaluate(&below, 20), Signal::Buy);
        assert_eq!(bollinger.evaluate(&above, 20), Signal::Sell);
    }

    #[test]
    fn test_bollinger_holds_inside_bands() {
        let quiet: Vec<f64> = (0..21)
            .map(|i| if i % 2 == 0 { 100.5 } else { 99.5 })
            .collect();
        let bollinger = SignalEngine::new(
            StrategyKind::Bollinger,
            SignalParams {
                lookback: 20,
                ..SignalParams::default()
            },
        );
        assert_eq!(bollinger.evaluate(&quiet, 20), Signal::Hold);
    }

    #[test]
    fn test_breakout_new_high_and_low() {
        let prices_up = [100.0, 102.0, 101.0, 103.0, 102.0, 105.0];
        let prices_down = [100.0, 102.0, 101.0, 103.0, 102.0, 99.0];

        let breakout = engine(StrategyKind::Breakout);
        assert_eq!(breakout.evaluate(&prices_up, 5), Signal::Buy);
        assert_eq!(breakout.evaluate(&prices_down, 5), Signal::Sell);
    }

    #[test]
    fn test_breakout_holds_inside_range() {
        let prices = [100.0, 102.0, 98.0, 103.0, 97.0, 100.0];
        let signal = engine(StrategyKind::Breakout).evaluate(&prices, 5);
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn test_breakout_no_history_holds() {
        let prices = [100.0];
        let signal = engine(StrategyKind::Breakout).evaluate(&prices, 0);
        assert_eq!(signal, Signal::Hold);
    }
}
