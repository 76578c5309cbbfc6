//! Portfolio optimization command implementation.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use quantlab_core::RandomVariate;
use quantlab_portfolio::{
    Asset, CorrelationTable, Objective, OptimizerConfig, PortfolioOptimizer,
};

/// Arguments for the optimize command
#[derive(Parser)]
pub struct OptimizeArgs {
    /// Asset as SYMBOL:expected_return:volatility (repeatable), decimals
    #[arg(short, long = "asset", required = true)]
    assets: Vec<String>,

    /// Correlation override as SYM_A:SYM_B:rho (repeatable)
    #[arg(short = 'r', long = "correlation")]
    correlations: Vec<String>,

    /// Objective: max_sharpe, min_volatility, or target_return
    #[arg(short, long, default_value = "max_sharpe")]
    objective: String,

    /// Target annualized return for the target_return objective, decimal
    #[arg(long)]
    target: Option<f64>,

    /// Random weight draws to evaluate
    #[arg(short, long, default_value_t = 10_000)]
    iterations: usize,

    /// Random seed for reproducible draws
    #[arg(long)]
    seed: Option<u64>,
}

/// Runs the optimizer and prints the selected optimum.
///
/// # Errors
///
/// Returns an error on malformed asset/correlation arguments or an
/// invalid configuration.
pub fn run(args: &OptimizeArgs, json: bool) -> Result<()> {
    let assets = args
        .assets
        .iter()
        .map(|spec| parse_asset(spec))
        .collect::<Result<Vec<_>>>()?;

    let mut table = CorrelationTable::new();
    for spec in &args.correlations {
        let (a, b, rho) = parse_correlation(spec)?;
        table.set(a, b, rho);
    }

    let objective = match args.objective.as_str() {
        "max_sharpe" => Objective::MaxSharpe,
        "min_volatility" => Objective::MinVolatility,
        "target_return" => Objective::TargetReturn {
            target: args
                .target
                .ok_or_else(|| anyhow!("target_return objective requires --target"))?,
        },
        other => return Err(anyhow!("unknown objective: {other}")),
    };

    let optimizer = PortfolioOptimizer::new(
        assets,
        table,
        OptimizerConfig {
            iterations: args.iterations,
            objective,
        },
    )?;

    info!(iterations = args.iterations, "starting optimizer");
    let mut rv = args
        .seed
        .map_or_else(RandomVariate::new, RandomVariate::with_seed);
    let report = optimizer.optimize(&mut rv);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let best = &report.best;
        println!("Optimal portfolio ({})", args.objective);
        println!(
            "  Expected return: {:>8.2}%",
            best.expected_return * 100.0
        );
        println!("  Volatility:      {:>8.2}%", best.volatility * 100.0);
        println!("  Sharpe ratio:    {:>8.2}", best.sharpe_ratio);
        println!("  Weights:");
        let mut weights: Vec<_> = best.weights.iter().collect();
        weights.sort_by(|a, b| a.0.cmp(b.0));
        for (symbol, weight) in weights {
            println!("    {symbol:<8} {weight:>6.1}%");
        }
    }
    Ok(())
}

fn parse_asset(spec: &str) -> Result<Asset> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        return Err(anyhow!(
            "asset must be SYMBOL:expected_return:volatility, got: {spec}"
        ));
    }
    Ok(Asset {
        symbol: parts[0].to_string(),
        expected_return: parts[1]
            .parse()
            .with_context(|| format!("bad expected return in: {spec}"))?,
        volatility: parts[2]
            .parse()
            .with_context(|| format!("bad volatility in: {spec}"))?,
        current_weight: 0.0,
    })
}

fn parse_correlation(spec: &str) -> Result<(String, String, f64)> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        return Err(anyhow!("correlation must be SYM_A:SYM_B:rho, got: {spec}"));
    }
    let rho: f64 = parts[2]
        .parse()
        .with_context(|| format!("bad correlation in: {spec}"))?;
    if !(-1.0..=1.0).contains(&rho) {
        return Err(anyhow!("correlation must lie in [-1, 1], got: {rho}"));
    }
    Ok((parts[0].to_string(), parts[1].to_string(), rho))
}
