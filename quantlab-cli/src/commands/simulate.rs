//! Monte Carlo simulation command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use quantlab_risk::{SimulationConfig, SimulationResult};
use quantlab_worker::spawn_simulation;

/// Arguments for the simulate command
#[derive(Parser)]
pub struct SimulateArgs {
    /// Starting portfolio value
    #[arg(short, long, default_value_t = 1_000_000.0)]
    portfolio: f64,

    /// Expected daily return, decimal
    #[arg(long, default_value_t = 0.0004)]
    daily_return: f64,

    /// Daily volatility, decimal
    #[arg(long, default_value_t = 0.012)]
    daily_vol: f64,

    /// Horizon in days
    #[arg(short = 'd', long, default_value_t = 10)]
    horizon: usize,

    /// Number of trials
    #[arg(short, long, default_value_t = 10_000)]
    num_simulations: usize,

    /// Confidence level in percent
    #[arg(short, long, default_value_t = 95.0)]
    confidence: f64,

    /// Random seed for reproducible trials
    #[arg(long)]
    seed: Option<u64>,
}

/// Runs the simulation off-thread and prints the result.
///
/// # Errors
///
/// Returns an error on invalid configuration or a failed run.
pub async fn run(args: SimulateArgs, json: bool) -> Result<()> {
    let config = SimulationConfig {
        portfolio_value: args.portfolio,
        expected_return: args.daily_return,
        volatility: args.daily_vol,
        time_horizon: args.horizon,
        num_simulations: args.num_simulations,
        confidence_level: args.confidence,
    };

    info!(trials = args.num_simulations, "starting simulation");
    let result = spawn_simulation(config, args.seed)
        .join()
        .await
        .context("simulation run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, args.confidence);
    }
    Ok(())
}

fn print_summary(result: &SimulationResult, confidence: f64) {
    println!("Monte Carlo VaR ({confidence}% confidence)");
    println!("  VaR:            {:>14.2}", result.var);
    println!("  CVaR:           {:>14.2}", result.cvar);
    println!("  Expected value: {:>14.2}", result.expected_value);
    println!("  Min terminal:   {:>14.2}", result.min_value);
    println!("  Max terminal:   {:>14.2}", result.max_value);
    println!("  Percentiles:");
    for (rank, value) in &result.percentiles {
        println!("    p{rank:<3} {value:>14.2}");
    }
}
