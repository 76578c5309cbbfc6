//! Kelly-criterion command implementation.

use anyhow::Result;
use clap::Parser;

use quantlab_portfolio::{KellyCalculator, KellyInputs};

/// Arguments for the kelly command
#[derive(Parser)]
pub struct KellyArgs {
    /// Win probability in percent
    #[arg(short = 'p', long)]
    win_probability: f64,

    /// Amount won per winning bet
    #[arg(short, long)]
    win_amount: f64,

    /// Amount lost per losing bet
    #[arg(short, long)]
    loss_amount: f64,

    /// Total bankroll
    #[arg(short, long)]
    bankroll: f64,

    /// Fraction of full Kelly to stake, e.g. 0.5 for half-Kelly
    #[arg(short = 'm', long, default_value_t = 0.5)]
    multiplier: f64,
}

/// Computes and prints the Kelly statistics.
///
/// # Errors
///
/// Returns an error on out-of-range inputs.
pub fn run(args: &KellyArgs, json: bool) -> Result<()> {
    let result = KellyCalculator.evaluate(&KellyInputs {
        win_probability: args.win_probability,
        win_amount: args.win_amount,
        loss_amount: args.loss_amount,
        bankroll: args.bankroll,
        kelly_multiplier: args.multiplier,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Kelly sizing");
        println!("  Full Kelly:       {:>8.2}%", result.full_kelly * 100.0);
        println!(
            "  Fractional Kelly: {:>8.2}%",
            result.fractional_kelly * 100.0
        );
        println!("  Optimal bet:      {:>10.2}", result.optimal_bet);
        println!("  EV per bet:       {:>10.2}", result.expected_value);
        println!("  Log growth:       {:>10.5}", result.log_growth);
        match result.bets_to_double {
            Some(bets) => println!("  Bets to double:   {bets:>10.1}"),
            None => println!("  Bets to double:          n/a"),
        }
        println!("  Ruin probability: {:>8.2}%", result.ruin_probability);
    }
    Ok(())
}
