//! Geometric Brownian Motion portfolio simulation.

use serde::{Deserialize, Serialize};
use tracing::info;

use quantlab_core::{ConfigError, RandomVariate};

use crate::error::RiskError;

/// Percentiles reported in every simulation result.
const REPORTED_PERCENTILES: [u8; 9] = [1, 5, 10, 25, 50, 75, 90, 95, 99];

/// Number of equal-width histogram bins over the terminal distribution.
const HISTOGRAM_BINS: usize = 50;

/// Number of full paths retained for diagnostics.
const SAMPLE_PATHS: usize = 5;

/// Monte Carlo simulation parameters.
///
/// Return and volatility are per-step (daily) rates; the engine applies
/// them directly without further annualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Starting portfolio value.
    pub portfolio_value: f64,
    /// Expected return per step, decimal.
    pub expected_return: f64,
    /// Volatility per step, decimal.
    pub volatility: f64,
    /// Steps per trial.
    #[serde(default = "default_time_horizon")]
    pub time_horizon: usize,
    /// Independent trials.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    /// Confidence level in percent, e.g. 95.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

fn default_time_horizon() -> usize {
    10
}

fn default_num_simulations() -> usize {
    10_000
}

fn default_confidence_level() -> f64 {
    95.0
}

impl SimulationConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portfolio_value <= 0.0 {
            return Err(ConfigError::not_positive(
                "portfolio_value",
                self.portfolio_value,
            ));
        }
        if self.volatility <= 0.0 {
            return Err(ConfigError::not_positive("volatility", self.volatility));
        }
        if self.time_horizon == 0 {
            return Err(ConfigError::zero_count("time_horizon"));
        }
        if self.num_simulations == 0 {
            return Err(ConfigError::zero_count("num_simulations"));
        }
        if self.confidence_level <= 0.0 || self.confidence_level >= 100.0 {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "confidence_level ({}) must lie strictly between 0 and 100",
                    self.confidence_level
                ),
            });
        }
        Ok(())
    }
}

/// One histogram bin over the terminal-value distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Exclusive upper edge (inclusive for the last bin).
    pub upper: f64,
    /// Trials whose terminal value fell in this bin.
    pub count: usize,
}

/// Aggregated simulation output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Value-at-Risk at the configured confidence level, in currency.
    pub var: f64,
    /// Conditional VaR (expected shortfall beyond the VaR cutoff).
    pub cvar: f64,
    /// Mean terminal value.
    pub expected_value: f64,
    /// Smallest terminal value observed.
    pub min_value: f64,
    /// Largest terminal value observed.
    pub max_value: f64,
    /// Terminal-value percentiles, keyed by percentile rank.
    pub percentiles: Vec<(u8, f64)>,
    /// Equal-width histogram of terminal values.
    pub histogram: Vec<HistogramBin>,
    /// A handful of full paths for visualization.
    pub sample_paths: Vec<Vec<f64>>,
}

/// Monte Carlo VaR engine.
pub struct MonteCarloEngine {
    config: SimulationConfig,
}

impl MonteCarloEngine {
    /// Creates an engine from a validated configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, RiskError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs the full simulation.
    #[must_use]
    pub fn run(&self, rv: &mut RandomVariate) -> SimulationResult {
        self.run_with_progress(rv, |_| {})
    }

    /// Like [`run`](Self::run), reporting fractional progress in `[0, 1]`
    /// roughly every 10% of the trial count.
    pub fn run_with_progress(
        &self,
        rv: &mut RandomVariate,
        mut observer: impl FnMut(f64),
    ) -> SimulationResult {
        let cfg = &self.config;
        let drift = cfg.expected_return - cfg.volatility * cfg.volatility / 2.0;
        let report_every = (cfg.num_simulations / 10).max(1);

        info!(
            trials = cfg.num_simulations,
            horizon = cfg.time_horizon,
            "starting Monte Carlo run"
        );

        let mut terminals = Vec::with_capacity(cfg.num_simulations);
        let mut sample_paths = Vec::with_capacity(SAMPLE_PATHS);

        for trial in 0..cfg.num_simulations {
            let keep_path = trial < SAMPLE_PATHS;
            let mut path = if keep_path {
                Vec::with_capacity(cfg.time_horizon + 1)
            } else {
                Vec::new()
            };

            let mut value = cfg.portfolio_value;
            if keep_path {
                path.push(value);
            }
            for _ in 0..cfg.time_horizon {
                value *= (drift + cfg.volatility * rv.next_normal()).exp();
                if keep_path {
                    path.push(value);
                }
            }

            terminals.push(value);
            if keep_path {
                sample_paths.push(path);
            }
            if trial % report_every == 0 {
                observer(trial as f64 / cfg.num_simulations as f64);
            }
        }
        observer(1.0);

        terminals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let var_index = ((1.0 - cfg.confidence_level / 100.0) * terminals.len() as f64).floor()
            as usize;
        let var_index = var_index.min(terminals.len() - 1);
        let var = cfg.portfolio_value - terminals[var_index];

        // Expected shortfall over the tail strictly below the VaR cutoff;
        // an empty tail degenerates to VaR itself.
        let tail = &terminals[..var_index];
        let cvar = if tail.is_empty() {
            var
        } else {
            cfg.portfolio_value - tail.iter().sum::<f64>() / tail.len() as f64
        };

        let expected_value = terminals.iter().sum::<f64>() / terminals.len() as f64;
        let min_value = terminals[0];
        let max_value = terminals[terminals.len() - 1];

        let percentiles = REPORTED_PERCENTILES
            .iter()
            .map(|&p| {
                let idx = (f64::from(p) / 100.0 * terminals.len() as f64).floor() as usize;
                (p, terminals[idx.min(terminals.len() - 1)])
            })
            .collect();

        info!(var, cvar, expected_value, "Monte Carlo run complete");

        SimulationResult {
            var,
            cvar,
            expected_value,
            min_value,
            max_value,
            percentiles,
            histogram: build_histogram(&terminals, min_value, max_value),
            sample_paths,
        }
    }
}

fn build_histogram(sorted_terminals: &[f64], min: f64, max: f64) -> Vec<HistogramBin> {
    let width = (max - min) / HISTOGRAM_BINS as f64;
    let mut bins: Vec<HistogramBin> = (0..HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    // Degenerate distribution: every trial landed on one value.
    if width <= 0.0 {
        bins[0].count = sorted_terminals.len();
        return bins;
    }

    for &value in sorted_terminals {
        let idx = (((value - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        bins[idx].count += 1;
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            portfolio_value: 1_000_000.0,
            expected_return: 0.04,
            volatility: 1.2,
            time_horizon: 10,
            num_simulations: 10_000,
            confidence_level: 95.0,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());

        let zero_value = SimulationConfig {
            portfolio_value: 0.0,
            ..config()
        };
        assert!(zero_value.validate().is_err());

        let zero_trials = SimulationConfig {
            num_simulations: 0,
            ..config()
        };
        assert!(zero_trials.validate().is_err());

        let bad_confidence = SimulationConfig {
            confidence_level: 100.0,
            ..config()
        };
        assert!(bad_confidence.validate().is_err());
    }

    #[test]
    fn test_var_bounds_and_tail_ordering() {
        let engine = MonteCarloEngine::new(config()).unwrap();
        let mut rv = RandomVariate::with_seed(1234);
        let result = engine.run(&mut rv);

        // GBM keeps values strictly positive, so VaR cannot reach the full
        // portfolio value; the volatile configuration guarantees a loss at
        // the 5th percentile.
        assert!(result.var > 0.0);
        assert!(result.var < 1_000_000.0);
        assert!(result.cvar >= result.var);
    }

    #[test]
    fn test_seeded_run_is_deterministic() {
        let engine = MonteCarloEngine::new(config()).unwrap();
        let a = engine.run(&mut RandomVariate::with_seed(99));
        let b = engine.run(&mut RandomVariate::with_seed(99));
        assert_eq!(a.var, b.var);
        assert_eq!(a.cvar, b.cvar);
        assert_eq!(a.expected_value, b.expected_value);
        assert_eq!(a.sample_paths, b.sample_paths);
    }

    #[test]
    fn test_result_shape() {
        let cfg = SimulationConfig {
            num_simulations: 500,
            ..config()
        };
        let engine = MonteCarloEngine::new(cfg).unwrap();
        let result = engine.run(&mut RandomVariate::with_seed(7));

        assert_eq!(result.sample_paths.len(), 5);
        for path in &result.sample_paths {
            assert_eq!(path.len(), 11);
            assert_eq!(path[0], 1_000_000.0);
        }

        assert_eq!(result.histogram.len(), 50);
        let binned: usize = result.histogram.iter().map(|b| b.count).sum();
        assert_eq!(binned, 500);

        assert_eq!(result.percentiles.len(), 9);
        // Percentile table is non-decreasing in rank.
        for pair in result.percentiles.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
        assert!(result.min_value <= result.expected_value);
        assert!(result.expected_value <= result.max_value);
    }

    #[test]
    fn test_progress_reaches_terminal() {
        let cfg = SimulationConfig {
            num_simulations: 1_000,
            ..config()
        };
        let engine = MonteCarloEngine::new(cfg).unwrap();
        let mut updates = Vec::new();
        engine.run_with_progress(&mut RandomVariate::with_seed(3), |p| updates.push(p));

        assert!(updates.len() >= 10);
        assert_eq!(*updates.last().unwrap(), 1.0);
        assert!(updates.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_tiny_run_does_not_panic() {
        let cfg = SimulationConfig {
            num_simulations: 1,
            time_horizon: 1,
            ..config()
        };
        let engine = MonteCarloEngine::new(cfg).unwrap();
        let result = engine.run(&mut RandomVariate::with_seed(5));
        // varIndex floors to 0; CVaR degenerates to VaR.
        assert_eq!(result.cvar, result.var);
        assert!(result.var.is_finite());
    }
}
