//! Backtest command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use quantlab_backtest::{BacktestConfig, BacktestReport, StrategyKind};
use quantlab_worker::spawn_backtest;

/// Arguments for the backtest command
#[derive(Parser)]
pub struct BacktestArgs {
    /// Instrument label for the report
    #[arg(short, long, default_value = "SYN")]
    symbol: String,

    /// Strategy: mean_reversion, momentum, rsi, bollinger, breakout
    #[arg(short = 't', long, default_value = "mean_reversion")]
    strategy: String,

    /// Initial capital
    #[arg(long, default_value_t = 100_000.0)]
    capital: f64,

    /// Units per order
    #[arg(long, default_value_t = 100.0)]
    order_size: f64,

    /// Bars in the synthetic path
    #[arg(short, long, default_value_t = 252)]
    periods: usize,

    /// Annualized volatility in percent
    #[arg(long, default_value_t = 20.0)]
    volatility: f64,

    /// Indicator lookback in bars
    #[arg(short, long, default_value_t = 20)]
    lookback: usize,

    /// Commission per fill
    #[arg(long, default_value_t = 1.0)]
    commission: f64,

    /// Slippage in basis points
    #[arg(long, default_value_t = 5.0)]
    slippage_bps: f64,

    /// Stop-loss percent
    #[arg(long, default_value_t = 5.0)]
    stop_loss: f64,

    /// Take-profit percent
    #[arg(long, default_value_t = 10.0)]
    take_profit: f64,

    /// Random seed for a reproducible path
    #[arg(long)]
    seed: Option<u64>,
}

/// Runs a backtest off-thread and prints the report.
///
/// # Errors
///
/// Returns an error on invalid configuration or a failed run.
pub async fn run(args: BacktestArgs, json: bool) -> Result<()> {
    let strategy: StrategyKind = args
        .strategy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("failed to parse --strategy")?;

    let config = BacktestConfig {
        symbol: args.symbol,
        strategy,
        initial_capital: args.capital,
        order_size: args.order_size,
        periods: args.periods,
        volatility: args.volatility,
        lookback: args.lookback,
        commission: args.commission,
        slippage_bps: args.slippage_bps,
        stop_loss_pct: args.stop_loss,
        take_profit_pct: args.take_profit,
        ..BacktestConfig::default()
    };

    info!(strategy = strategy.as_str(), "starting backtest");
    let report = spawn_backtest(config, args.seed)
        .join()
        .await
        .context("backtest run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let m = &report.metrics;
    println!("Backtest: {} ({})", report.symbol, report.strategy.as_str());
    println!("  Total return:      {:>10.2}%", m.total_return);
    println!("  Annualized return: {:>10.2}%", m.annualized_return);
    println!("  Sharpe ratio:      {:>10.2}", m.sharpe_ratio);
    println!("  Sortino ratio:     {:>10.2}", m.sortino_ratio);
    println!("  Max drawdown:      {:>10.2}%", m.max_drawdown);
    println!(
        "  Trades:            {:>10} ({} long / {} short)",
        m.total_trades, m.long_trades, m.short_trades
    );
    println!("  Win rate:          {:>10.1}%", m.win_rate);
    println!("  Profit factor:     {:>10.2}", m.profit_factor);
    println!("  Commissions:       {:>10.2}", m.total_commission);
    println!("  Slippage:          {:>10.2}", m.total_slippage);
}
