//! Backtest execution engine.
//!
//! Simulates a single-position strategy over a synthetic price path: at
//! most one net position (long or short) is open at any bar, sized at a
//! fixed order quantity per signal. Every open and close charges one
//! commission and one slippage adjustment. Execution is fully
//! deterministic for a fixed price path; the only randomness lives in the
//! path generator.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use quantlab_core::series::{PriceSeriesConfig, PriceSeriesGenerator};
use quantlab_core::{ConfigError, RandomVariate};

use crate::error::BacktestError;
use crate::metrics::{RiskMetrics, RiskMetricsCalculator};
use crate::strategy::{Signal, SignalEngine, SignalParams, StrategyKind};

/// Full configuration for one backtest run. Immutable per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Instrument label carried through to the report.
    pub symbol: String,
    /// Strategy variant to simulate.
    pub strategy: StrategyKind,
    /// Starting cash.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    /// Units bought or sold per signal.
    #[serde(default = "default_order_size")]
    pub order_size: f64,
    /// Number of bars in the synthetic path.
    #[serde(default = "default_periods")]
    pub periods: usize,
    /// Annualized volatility in percent for path generation.
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    /// Indicator lookback in bars.
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Deviation threshold in percent (mean reversion / momentum).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// RSI overbought bound.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    /// RSI oversold bound.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    /// Bollinger standard-deviation multiplier.
    #[serde(default = "default_bollinger_k")]
    pub bollinger_k: f64,
    /// Fixed commission charged per fill.
    #[serde(default)]
    pub commission: f64,
    /// Slippage in basis points applied against each fill.
    #[serde(default)]
    pub slippage_bps: f64,
    /// Stop-loss in percent of entry; a breach forces a close.
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,
    /// Take-profit in percent of entry; a breach forces a close.
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_order_size() -> f64 {
    100.0
}

fn default_periods() -> usize {
    252
}

fn default_volatility() -> f64 {
    20.0
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

fn default_stop_loss_pct() -> f64 {
    5.0
}

fn default_take_profit_pct() -> f64 {
    10.0
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: "SYN".to_string(),
            strategy: StrategyKind::default(),
            initial_capital: default_initial_capital(),
            order_size: default_order_size(),
            periods: default_periods(),
            volatility: default_volatility(),
            lookback: default_lookback(),
            threshold: default_threshold(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            bollinger_k: default_bollinger_k(),
            commission: 1.0,
            slippage_bps: 5.0,
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}

impl BacktestConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::not_positive(
                "initial_capital",
                self.initial_capital,
            ));
        }
        if self.order_size <= 0.0 {
            return Err(ConfigError::not_positive("order_size", self.order_size));
        }
        if self.periods == 0 {
            return Err(ConfigError::zero_count("periods"));
        }
        if self.volatility <= 0.0 {
            return Err(ConfigError::not_positive("volatility", self.volatility));
        }
        if self.lookback == 0 {
            return Err(ConfigError::zero_count("lookback"));
        }
        if self.periods <= self.lookback {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "periods ({}) must exceed lookback ({})",
                    self.periods, self.lookback
                ),
            });
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "rsi_oversold ({}) must be below rsi_overbought ({})",
                    self.rsi_oversold, self.rsi_overbought
                ),
            });
        }
        Ok(())
    }

    fn signal_params(&self) -> SignalParams {
        SignalParams {
            lookback: self.lookback,
            threshold: self.threshold,
            rsi_overbought: self.rsi_overbought,
            rsi_oversold: self.rsi_oversold,
            bollinger_k: self.bollinger_k,
        }
    }
}

/// Direction of a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Bought first, sold later.
    Long,
    /// Sold first, bought back later.
    Short,
}

/// One closed round trip. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Fill price at entry, slippage included.
    pub entry_price: f64,
    /// Fill price at exit, slippage included.
    pub exit_price: f64,
    /// Direction of the position.
    pub side: Side,
    /// Realized profit in currency (commissions excluded, slippage
    /// embedded in the fill prices).
    pub pnl: f64,
    /// Realized profit as a percent of the entry notional.
    pub pnl_pct: f64,
    /// Bars the position was held.
    pub holding_bars: usize,
}

/// Result of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Instrument label from the configuration.
    pub symbol: String,
    /// Strategy variant that was run.
    pub strategy: StrategyKind,
    /// Portfolio equity at each evaluated bar.
    pub equity_curve: Vec<f64>,
    /// Closed trades in chronological order.
    pub trades: Vec<Trade>,
    /// Buy-and-hold per-bar returns of the same path, for beta/alpha.
    pub benchmark_returns: Vec<f64>,
    /// Derived risk and performance statistics.
    pub metrics: RiskMetrics,
}

/// Open position state. Engine-internal.
#[derive(Debug, Clone, Copy)]
struct Position {
    /// Signed quantity: positive long, negative short.
    quantity: f64,
    entry_price: f64,
    entry_index: usize,
}

/// Single-position backtest engine.
pub struct BacktestEngine {
    config: BacktestConfig,
    signals: SignalEngine,
}

impl BacktestEngine {
    /// Creates an engine from a validated configuration.
    pub fn new(config: BacktestConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        let signals = SignalEngine::new(config.strategy, config.signal_params());
        Ok(Self { config, signals })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Generates a fresh price path and runs the backtest on it.
    pub fn run(&self, rv: &mut RandomVariate) -> Result<BacktestReport, BacktestError> {
        self.run_with_progress(rv, |_| {})
    }

    /// Like [`run`](Self::run), reporting fractional progress in `[0, 1]`
    /// to `observer` roughly every 10% of the bar range.
    pub fn run_with_progress(
        &self,
        rv: &mut RandomVariate,
        observer: impl FnMut(f64),
    ) -> Result<BacktestReport, BacktestError> {
        let generator = PriceSeriesGenerator::new(PriceSeriesConfig {
            start_price: 100.0,
            periods: self.config.periods,
            volatility: self.config.volatility,
        });
        let prices = generator.generate(rv);
        self.run_on_path(&prices, observer)
    }

    /// Runs the backtest on an externally supplied price path.
    ///
    /// Execution is deterministic: the same path always yields the same
    /// equity curve and trade ledger.
    pub fn run_on_path(
        &self,
        prices: &[f64],
        mut observer: impl FnMut(f64),
    ) -> Result<BacktestReport, BacktestError> {
        let lookback = self.config.lookback;
        if prices.len() <= lookback {
            return Err(BacktestError::InsufficientData {
                lookback,
                bars: prices.len(),
            });
        }

        info!(
            symbol = %self.config.symbol,
            strategy = self.config.strategy.as_str(),
            bars = prices.len(),
            "starting backtest run"
        );

        let mut state = RunState::new(&self.config);
        let total_bars = prices.len() - lookback;
        let report_every = (total_bars / 10).max(1);

        for (done, i) in (lookback..prices.len()).enumerate() {
            let price = prices[i];

            // Stop-loss / take-profit overrides the signal with a forced
            // close; no re-entry on the same bar.
            if state.breaches_exit_limits(price) {
                state.close_position(price, i);
            } else {
                match self.signals.evaluate(prices, i) {
                    Signal::Buy if state.quantity() <= 0.0 => {
                        if state.quantity() < 0.0 {
                            state.close_position(price, i);
                        }
                        state.open_long(price, i);
                    }
                    Signal::Sell if state.quantity() >= 0.0 => {
                        if state.quantity() > 0.0 {
                            state.close_position(price, i);
                        }
                        state.open_short(price, i);
                    }
                    _ => {}
                }
            }

            state.record_equity(price);

            if done % report_every == 0 {
                observer(done as f64 / total_bars as f64);
            }
        }

        // Force-close any open position at the final price.
        let last_index = prices.len() - 1;
        if state.quantity() != 0.0 {
            state.close_position(prices[last_index], last_index);
            state.replace_last_equity(prices[last_index]);
        }
        observer(1.0);

        let benchmark_returns: Vec<f64> = prices
            .windows(2)
            .skip(lookback)
            .map(|w| if w[0] == 0.0 { 0.0 } else { w[1] / w[0] - 1.0 })
            .collect();

        let metrics = RiskMetricsCalculator::new(self.config.initial_capital).calculate(
            &state.equity_curve,
            &state.trades,
            &benchmark_returns,
            state.total_commission,
            state.total_slippage,
        );

        info!(
            symbol = %self.config.symbol,
            trades = state.trades.len(),
            total_return_pct = metrics.total_return,
            "backtest run complete"
        );

        Ok(BacktestReport {
            symbol: self.config.symbol.clone(),
            strategy: self.config.strategy,
            equity_curve: state.equity_curve,
            trades: state.trades,
            benchmark_returns,
            metrics,
        })
    }
}

/// Mutable per-run accounting state.
struct RunState<'a> {
    config: &'a BacktestConfig,
    cash: f64,
    position: Option<Position>,
    equity_curve: Vec<f64>,
    trades: Vec<Trade>,
    total_commission: f64,
    total_slippage: f64,
}

impl<'a> RunState<'a> {
    fn new(config: &'a BacktestConfig) -> Self {
        Self {
            config,
            cash: config.initial_capital,
            position: None,
            equity_curve: Vec::new(),
            trades: Vec::new(),
            total_commission: 0.0,
            total_slippage: 0.0,
        }
    }

    fn quantity(&self) -> f64 {
        self.position.map_or(0.0, |p| p.quantity)
    }

    /// Fill price for a buy: slippage moves the price against us.
    fn buy_price(&self, price: f64) -> f64 {
        price * (1.0 + self.config.slippage_bps / 10_000.0)
    }

    /// Fill price for a sell.
    fn sell_price(&self, price: f64) -> f64 {
        price * (1.0 - self.config.slippage_bps / 10_000.0)
    }

    fn charge_fill_costs(&mut self, price: f64, quantity: f64) {
        self.cash -= self.config.commission;
        self.total_commission += self.config.commission;
        self.total_slippage += price * self.config.slippage_bps / 10_000.0 * quantity;
    }

    /// True when the open position's P&L breaches the stop or target.
    fn breaches_exit_limits(&self, price: f64) -> bool {
        let Some(pos) = self.position else {
            return false;
        };
        let pnl_pct = if pos.quantity > 0.0 {
            (price - pos.entry_price) / pos.entry_price * 100.0
        } else {
            (pos.entry_price - price) / pos.entry_price * 100.0
        };
        pnl_pct <= -self.config.stop_loss_pct || pnl_pct >= self.config.take_profit_pct
    }

    fn open_long(&mut self, price: f64, index: usize) {
        let fill = self.buy_price(price);
        let affordable = (self.cash / fill).floor();
        let quantity = self.config.order_size.min(affordable);
        // A truncated fill of zero is a no-op.
        if quantity <= 0.0 {
            return;
        }

        self.cash -= quantity * fill;
        self.charge_fill_costs(price, quantity);
        self.position = Some(Position {
            quantity,
            entry_price: fill,
            entry_index: index,
        });
        debug!(index, fill, quantity, "opened long");
    }

    fn open_short(&mut self, price: f64, index: usize) {
        let fill = self.sell_price(price);
        // Shorts are cash-collateralized at 1x: same truncation as longs.
        let affordable = (self.cash / fill).floor();
        let quantity = self.config.order_size.min(affordable);
        if quantity <= 0.0 {
            return;
        }

        self.cash += quantity * fill;
        self.charge_fill_costs(price, quantity);
        self.position = Some(Position {
            quantity: -quantity,
            entry_price: fill,
            entry_index: index,
        });
        debug!(index, fill, quantity, "opened short");
    }

    fn close_position(&mut self, price: f64, index: usize) {
        let Some(pos) = self.position.take() else {
            return;
        };

        let quantity = pos.quantity.abs();
        let (side, exit_fill) = if pos.quantity > 0.0 {
            (Side::Long, self.sell_price(price))
        } else {
            (Side::Short, self.buy_price(price))
        };

        match side {
            Side::Long => self.cash += quantity * exit_fill,
            Side::Short => self.cash -= quantity * exit_fill,
        }
        self.charge_fill_costs(price, quantity);

        let pnl = match side {
            Side::Long => (exit_fill - pos.entry_price) * quantity,
            Side::Short => (pos.entry_price - exit_fill) * quantity,
        };
        let notional = pos.entry_price * quantity;
        let pnl_pct = if notional == 0.0 {
            0.0
        } else {
            pnl / notional * 100.0
        };

        debug!(index, ?side, pnl, "closed position");
        self.trades.push(Trade {
            entry_price: pos.entry_price,
            exit_price: exit_fill,
            side,
            pnl,
            pnl_pct,
            holding_bars: index - pos.entry_index,
        });
    }

    fn record_equity(&mut self, price: f64) {
        self.equity_curve.push(self.cash + self.quantity() * price);
    }

    /// After the end-of-run forced close the position is flat, so the last
    /// equity point is pure cash.
    fn replace_last_equity(&mut self, _price: f64) {
        if let Some(last) = self.equity_curve.last_mut() {
            *last = self.cash;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(strategy: StrategyKind) -> BacktestConfig {
        BacktestConfig {
            strategy,
            periods: 300,
            lookback: 20,
            commission: 1.0,
            slippage_bps: 5.0,
            ..BacktestConfig::default()
        }
    }

    fn run_seeded(strategy: StrategyKind, seed: u64) -> BacktestReport {
        let engine = BacktestEngine::new(config(strategy)).unwrap();
        let mut rv = RandomVariate::with_seed(seed);
        engine.run(&mut rv).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(BacktestConfig::default().validate().is_ok());

        let zero_capital = BacktestConfig {
            initial_capital: 0.0,
            ..BacktestConfig::default()
        };
        assert!(zero_capital.validate().is_err());

        let zero_lookback = BacktestConfig {
            lookback: 0,
            ..BacktestConfig::default()
        };
        assert!(zero_lookback.validate().is_err());

        let short_path = BacktestConfig {
            periods: 10,
            lookback: 20,
            ..BacktestConfig::default()
        };
        assert!(short_path.validate().is_err());

        let inverted_rsi = BacktestConfig {
            rsi_oversold: 80.0,
            rsi_overbought: 70.0,
            ..BacktestConfig::default()
        };
        assert!(inverted_rsi.validate().is_err());
    }

    #[test]
    fn test_equity_curve_length() {
        let report = run_seeded(StrategyKind::MeanReversion, 42);
        // One equity point per evaluated bar.
        assert_eq!(report.equity_curve.len(), 300 - 20);
        assert_eq!(report.benchmark_returns.len(), 300 - 20 - 1);
    }

    #[test]
    fn test_deterministic_given_same_path() {
        let engine = BacktestEngine::new(config(StrategyKind::MeanReversion)).unwrap();
        let generator = PriceSeriesGenerator::new(PriceSeriesConfig {
            start_price: 100.0,
            periods: 300,
            volatility: 20.0,
        });
        let mut rv = RandomVariate::with_seed(7);
        let prices = generator.generate(&mut rv);

        let a = engine.run_on_path(&prices, |_| {}).unwrap();
        let b = engine.run_on_path(&prices, |_| {}).unwrap();

        assert_eq!(a.equity_curve, b.equity_curve);
        assert_eq!(a.trades.len(), b.trades.len());
        for (ta, tb) in a.trades.iter().zip(b.trades.iter()) {
            assert_eq!(ta.pnl, tb.pnl);
            assert_eq!(ta.entry_price, tb.entry_price);
        }
    }

    #[test]
    fn test_trades_have_consistent_fields() {
        for seed in [1u64, 2, 3, 4, 5] {
            for strategy in [
                StrategyKind::MeanReversion,
                StrategyKind::Momentum,
                StrategyKind::Rsi,
                StrategyKind::Bollinger,
                StrategyKind::Breakout,
            ] {
                let report = run_seeded(strategy, seed);
                for trade in &report.trades {
                    assert!(trade.entry_price > 0.0);
                    assert!(trade.exit_price > 0.0);
                    // holding_bars is usize, so non-negativity is by type;
                    // check it is bounded by the run length.
                    assert!(trade.holding_bars < 300);
                }
            }
        }
    }

    #[test]
    fn test_single_net_position_and_side_consistency() {
        let engine = BacktestEngine::new(BacktestConfig {
            lookback: 5,
            ..config(StrategyKind::MeanReversion)
        })
        .unwrap();
        let order = 100.0;

        // Flat history, then a stretch below the SMA that keeps signalling
        // buy while a long is already open, then a pop through the profit
        // target.
        let dip = [
            100.0, 100.0, 100.0, 100.0, 100.0, 93.0, 92.8, 93.2, 92.6, 93.0, 103.0,
        ];
        let report = engine.run_on_path(&dip, |_| {}).unwrap();
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].side, Side::Long);
        assert_eq!(report.trades[0].holding_bars, 5);
        // While the long is held, equity moves by exactly one order's
        // exposure per bar, so the repeated buy signals opened nothing on
        // top of the existing position.
        for k in 0..4 {
            let expected = order * (dip[6 + k] - dip[5 + k]);
            let actual = report.equity_curve[k + 1] - report.equity_curve[k];
            assert!(
                (actual - expected).abs() < 1e-6,
                "bar {k}: equity moved {actual}, one-order exposure implies {expected}"
            );
        }

        // Mirror image: a stretch above the SMA keeps signalling sell
        // while a short is open.
        let spike = [
            100.0, 100.0, 100.0, 100.0, 100.0, 107.0, 107.2, 106.8, 107.1, 107.0, 96.0,
        ];
        let report = engine.run_on_path(&spike, |_| {}).unwrap();
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].side, Side::Short);
        assert_eq!(report.trades[0].holding_bars, 5);
        for k in 0..4 {
            let expected = -order * (spike[6 + k] - spike[5 + k]);
            let actual = report.equity_curve[k + 1] - report.equity_curve[k];
            assert!(
                (actual - expected).abs() < 1e-6,
                "bar {k}: equity moved {actual}, one-order short exposure implies {expected}"
            );
        }
    }

    #[test]
    fn test_no_position_left_open() {
        // Forced close at the end of the run leaves the last equity point
        // as pure cash; re-running the ledger confirms totals reconcile.
        let report = run_seeded(StrategyKind::Breakout, 11);
        let last_equity = *report.equity_curve.last().unwrap();
        let gross: f64 = report.trades.iter().map(|t| t.pnl).sum();
        let costs = report.metrics.total_commission;
        let expected = 100_000.0 + gross - costs;
        assert!(
            (last_equity - expected).abs() < 1e-6,
            "equity {last_equity} vs reconstructed {expected}"
        );
    }

    #[test]
    fn test_insufficient_cash_truncates_fill() {
        let cfg = BacktestConfig {
            initial_capital: 150.0,
            order_size: 1000.0,
            ..config(StrategyKind::MeanReversion)
        };
        let engine = BacktestEngine::new(cfg).unwrap();
        let mut rv = RandomVariate::with_seed(3);
        let report = engine.run(&mut rv).unwrap();

        // With ~$150 of capital, fills truncate to what cash affords and
        // zero-size fills are skipped, so equity never goes negative.
        for eq in &report.equity_curve {
            assert!(*eq > 0.0);
        }
    }

    #[test]
    fn test_run_reports_progress() {
        let engine = BacktestEngine::new(config(StrategyKind::Rsi)).unwrap();
        let mut rv = RandomVariate::with_seed(21);
        let mut updates = Vec::new();
        engine
            .run_with_progress(&mut rv, |p| updates.push(p))
            .unwrap();

        assert!(updates.len() >= 10);
        assert_eq!(*updates.last().unwrap(), 1.0);
        assert!(updates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_report_serde_roundtrip() {
        let report = run_seeded(StrategyKind::Bollinger, 5);
        let json = serde_json::to_string(&report).unwrap();
        let parsed: BacktestReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.equity_curve, report.equity_curve);
        assert_eq!(parsed.trades.len(), report.trades.len());
    }
}
