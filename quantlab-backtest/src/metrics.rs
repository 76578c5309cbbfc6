//! Performance and risk statistics derived from a completed run.
//!
//! Computed once per run from the full equity curve and trade ledger.
//! Degenerate inputs (no trades, flat equity, zero-variance benchmark)
//! yield zeroed ratios rather than NaN or infinity.

use serde::{Deserialize, Serialize};

use quantlab_core::series::TRADING_DAYS_PER_YEAR;

use crate::engine::{Side, Trade};

/// Risk and performance statistics for one backtest run.
///
/// Returns and drawdown are expressed in percent; ratios are unitless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Total return over the run, percent of starting capital.
    pub total_return: f64,
    /// Return annualized to 252 trading days, percent.
    pub annualized_return: f64,
    /// Annualized volatility of per-bar returns, percent.
    pub annualized_volatility: f64,
    /// Mean return over total volatility, annualized.
    pub sharpe_ratio: f64,
    /// Mean return over downside-only volatility, annualized.
    pub sortino_ratio: f64,
    /// Annualized return over maximum drawdown.
    pub calmar_ratio: f64,
    /// Largest peak-to-trough equity decline, percent.
    pub max_drawdown: f64,
    /// Longest stretch of consecutive bars below a running peak.
    pub max_drawdown_duration: usize,
    /// Share of closed trades with positive P&L, percent in `[0, 100]`.
    pub win_rate: f64,
    /// Gross profit over gross loss; 0 when either side is empty.
    pub profit_factor: f64,
    /// Mean P&L of winning trades.
    pub avg_win: f64,
    /// Mean P&L of losing trades (reported positive).
    pub avg_loss: f64,
    /// `avg_win / avg_loss`; 0 when there are no losing trades.
    pub payoff_ratio: f64,
    /// Closed trades in the ledger.
    pub total_trades: usize,
    /// Closed long trades.
    pub long_trades: usize,
    /// Closed short trades.
    pub short_trades: usize,
    /// Empirical 95% Value-at-Risk of per-bar returns, percent loss.
    pub var_95: f64,
    /// Mean loss in the tail below the VaR cutoff, percent.
    pub cvar_95: f64,
    /// Covariance with the benchmark over benchmark variance; 1 when the
    /// benchmark has zero variance.
    pub beta: f64,
    /// Annualized excess return over the beta-scaled benchmark, percent.
    pub alpha: f64,
    /// Annualized active return over tracking error.
    pub information_ratio: f64,
    /// Annualized return over beta.
    pub treynor_ratio: f64,
    /// Commissions charged across all fills.
    pub total_commission: f64,
    /// Slippage cost embedded in fills across the run.
    pub total_slippage: f64,
}

/// Derives [`RiskMetrics`] from run output.
pub struct RiskMetricsCalculator {
    initial_capital: f64,
}

impl RiskMetricsCalculator {
    /// Creates a calculator for a run that started with `initial_capital`.
    #[must_use]
    pub const fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    /// Computes the full statistics set. Always returns a complete object;
    /// metrics that would divide by zero come back as 0.
    #[must_use]
    pub fn calculate(
        &self,
        equity_curve: &[f64],
        trades: &[Trade],
        benchmark_returns: &[f64],
        total_commission: f64,
        total_slippage: f64,
    ) -> RiskMetrics {
        let returns = per_bar_returns(equity_curve);
        let mut metrics = RiskMetrics {
            total_commission,
            total_slippage,
            ..RiskMetrics::default()
        };

        self.fill_return_metrics(&mut metrics, equity_curve, &returns);
        fill_drawdown_metrics(&mut metrics, equity_curve);
        fill_trade_metrics(&mut metrics, trades);
        fill_tail_metrics(&mut metrics, &returns);
        fill_benchmark_metrics(&mut metrics, &returns, benchmark_returns);
        metrics
    }

    fn fill_return_metrics(&self, metrics: &mut RiskMetrics, equity: &[f64], returns: &[f64]) {
        let Some(last) = equity.last() else {
            return;
        };
        if self.initial_capital <= 0.0 {
            return;
        }

        let total = last / self.initial_capital - 1.0;
        metrics.total_return = total * 100.0;
        if !returns.is_empty() {
            let years_exponent = TRADING_DAYS_PER_YEAR / returns.len() as f64;
            metrics.annualized_return = ((1.0 + total).powf(years_exponent) - 1.0) * 100.0;
        }

        let mu = mean(returns);
        let sigma = std_dev(returns);
        metrics.annualized_volatility = sigma * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;
        if sigma > 0.0 {
            metrics.sharpe_ratio = mu / sigma * TRADING_DAYS_PER_YEAR.sqrt();
        }

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_dev = std_dev(&downside);
        if downside_dev > 0.0 {
            metrics.sortino_ratio = mu / downside_dev * TRADING_DAYS_PER_YEAR.sqrt();
        }
    }
}

fn per_bar_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { w[1] / w[0] - 1.0 })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for fewer than two samples.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let mu_a = mean(&a[..n]);
    let mu_b = mean(&b[..n]);
    a[..n]
        .iter()
        .zip(&b[..n])
        .map(|(x, y)| (x - mu_a) * (y - mu_b))
        .sum::<f64>()
        / n as f64
}

fn fill_drawdown_metrics(metrics: &mut RiskMetrics, equity: &[f64]) {
    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0_f64;
    let mut duration = 0usize;
    let mut max_duration = 0usize;

    for &value in equity {
        if value >= peak {
            peak = value;
            duration = 0;
        } else {
            duration += 1;
            max_duration = max_duration.max(duration);
            if peak > 0.0 {
                max_drawdown = max_drawdown.max((peak - value) / peak * 100.0);
            }
        }
    }

    metrics.max_drawdown = max_drawdown;
    metrics.max_drawdown_duration = max_duration;
    if max_drawdown > 0.0 {
        metrics.calmar_ratio = metrics.annualized_return / max_drawdown;
    }
}

fn fill_trade_metrics(metrics: &mut RiskMetrics, trades: &[Trade]) {
    metrics.total_trades = trades.len();
    metrics.long_trades = trades.iter().filter(|t| t.side == Side::Long).count();
    metrics.short_trades = trades.iter().filter(|t| t.side == Side::Short).count();
    if trades.is_empty() {
        return;
    }

    let wins: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|p| *p > 0.0).collect();
    let losses: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|p| *p < 0.0).collect();

    metrics.win_rate = wins.len() as f64 / trades.len() as f64 * 100.0;
    metrics.avg_win = mean(&wins);
    metrics.avg_loss = mean(&losses).abs();

    let gross_profit: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    if gross_loss > 0.0 && gross_profit > 0.0 {
        metrics.profit_factor = gross_profit / gross_loss;
    }
    if metrics.avg_loss > 0.0 {
        metrics.payoff_ratio = metrics.avg_win / metrics.avg_loss;
    }
}

/// Empirical VaR/CVaR at 95% from the sorted per-bar return distribution,
/// reported as positive loss percentages.
fn fill_tail_metrics(metrics: &mut RiskMetrics, returns: &[f64]) {
    if returns.is_empty() {
        return;
    }

    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let var_index = (0.05 * sorted.len() as f64).floor() as usize;
    let var_index = var_index.min(sorted.len() - 1);
    metrics.var_95 = -sorted[var_index] * 100.0;

    let tail = &sorted[..var_index];
    metrics.cvar_95 = if tail.is_empty() {
        metrics.var_95
    } else {
        -mean(tail) * 100.0
    };
}

fn fill_benchmark_metrics(metrics: &mut RiskMetrics, returns: &[f64], benchmark: &[f64]) {
    let n = returns.len().min(benchmark.len());
    if n == 0 {
        return;
    }
    let returns = &returns[..n];
    let benchmark = &benchmark[..n];

    let bench_var = std_dev(benchmark).powi(2);
    metrics.beta = if bench_var > 0.0 {
        covariance(returns, benchmark) / bench_var
    } else {
        1.0
    };

    metrics.alpha =
        (mean(returns) - metrics.beta * mean(benchmark)) * TRADING_DAYS_PER_YEAR * 100.0;

    let bench_total: f64 = benchmark.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;
    let annualized_bench =
        ((1.0 + bench_total).powf(TRADING_DAYS_PER_YEAR / n as f64) - 1.0) * 100.0;

    let active: Vec<f64> = returns
        .iter()
        .zip(benchmark)
        .map(|(r, b)| r - b)
        .collect();
    let tracking_error = std_dev(&active) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;
    if tracking_error > 0.0 {
        metrics.information_ratio = (metrics.annualized_return - annualized_bench) / tracking_error;
    }

    if metrics.beta.abs() > f64::EPSILON {
        metrics.treynor_ratio = metrics.annualized_return / metrics.beta;
    }
}
