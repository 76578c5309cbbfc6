//! # Quantlab CLI
//!
//! Command-line front end for the analytics engines:
//! - Strategy backtesting with risk metrics
//! - Monte Carlo Value-at-Risk simulation
//! - Option pricing, Greeks, and implied volatility
//! - Portfolio optimization
//! - Kelly-criterion bet sizing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use commands::{backtest, kelly, option, optimize, simulate};

/// Quantlab - quantitative-finance analytics toolkit
#[derive(Parser)]
#[command(name = "quantlab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit results as JSON instead of a summary table
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a strategy backtest on a synthetic price path
    Backtest(backtest::BacktestArgs),

    /// Run a Monte Carlo Value-at-Risk simulation
    Simulate(simulate::SimulateArgs),

    /// Price an option and report Greeks or implied volatility
    Option(option::OptionArgs),

    /// Optimize portfolio weights by random search
    Optimize(optimize::OptimizeArgs),

    /// Compute Kelly-criterion bet sizing
    Kelly(kelly::KellyArgs),
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Backtest(args) => backtest::run(args, cli.json).await?,
        Commands::Simulate(args) => simulate::run(args, cli.json).await?,
        Commands::Option(args) => option::run(&args, cli.json)?,
        Commands::Optimize(args) => optimize::run(&args, cli.json)?,
        Commands::Kelly(args) => kelly::run(&args, cli.json)?,
    }

    Ok(())
}
