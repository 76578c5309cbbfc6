//! Option pricing command implementation.

use anyhow::{anyhow, Result};
use clap::Parser;

use quantlab_options::{ImpliedVolSolver, OptionInputs, OptionType, PricingEngine};

/// Arguments for the option command
#[derive(Parser)]
pub struct OptionArgs {
    /// Spot price of the underlying
    #[arg(short, long)]
    spot: f64,

    /// Strike price
    #[arg(short = 'k', long)]
    strike: f64,

    /// Time to expiry in years
    #[arg(short = 'e', long)]
    expiry: f64,

    /// Annualized risk-free rate, decimal
    #[arg(short, long, default_value_t = 0.05)]
    rate: f64,

    /// Annualized volatility, decimal
    #[arg(long, default_value_t = 0.2)]
    volatility: f64,

    /// Option type: call or put
    #[arg(short = 't', long, default_value = "call")]
    option_type: String,

    /// Solve for the volatility implied by this market price instead of
    /// pricing at --volatility
    #[arg(long)]
    implied_from: Option<f64>,
}

/// Prices the option, or solves implied volatility when requested.
///
/// # Errors
///
/// Returns an error on invalid inputs.
pub fn run(args: &OptionArgs, json: bool) -> Result<()> {
    let option_type = match args.option_type.as_str() {
        "call" => OptionType::Call,
        "put" => OptionType::Put,
        other => return Err(anyhow!("unknown option type: {other}")),
    };

    let inputs = OptionInputs {
        spot: args.spot,
        strike: args.strike,
        time_to_expiry: args.expiry,
        rate: args.rate,
        volatility: args.volatility,
        option_type,
    };

    if let Some(market_price) = args.implied_from {
        let iv = ImpliedVolSolver::default().solve(market_price, &inputs)?;
        if json {
            println!("{}", serde_json::json!({ "implied_volatility": iv }));
        } else {
            println!("Implied volatility: {:.4} ({:.2}%)", iv, iv * 100.0);
        }
        return Ok(());
    }

    let greeks = PricingEngine.greeks(&inputs)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&greeks)?);
    } else {
        println!("Option: {} S={} K={}", args.option_type, args.spot, args.strike);
        println!("  Price: {:>10.4}", greeks.price);
        println!("  Delta: {:>10.4}", greeks.delta);
        println!("  Gamma: {:>10.4}", greeks.gamma);
        println!("  Theta: {:>10.4} /day", greeks.theta);
        println!("  Vega:  {:>10.4} /1% vol", greeks.vega);
        println!("  Rho:   {:>10.4} /1% rate", greeks.rho);
    }
    Ok(())
}
