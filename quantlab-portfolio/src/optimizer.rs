//! Random-search mean-variance optimizer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use quantlab_core::{ConfigError, RandomVariate};

use crate::correlation::CorrelationTable;
use crate::error::PortfolioError;

/// Short-term reference rate used in the Sharpe objective.
const RISK_FREE_RATE: f64 = 0.05;

/// Every Nth trial is kept as a frontier sample.
const FRONTIER_SAMPLE_EVERY: usize = 100;

/// One investable asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Ticker symbol, the correlation-table key.
    pub symbol: String,
    /// Annualized expected return, decimal.
    pub expected_return: f64,
    /// Annualized volatility, decimal.
    pub volatility: f64,
    /// Current portfolio weight in percent, informational only.
    #[serde(default)]
    pub current_weight: f64,
}

/// Which tracked optimum to report.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Maximize `(return − riskFree) / volatility`.
    #[default]
    MaxSharpe,
    /// Minimize portfolio volatility.
    MinVolatility,
    /// Minimize distance to a target annualized return.
    TargetReturn {
        /// Desired annualized return, decimal.
        target: f64,
    },
}

/// Optimizer parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Random weight draws to evaluate.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Optimum to report.
    #[serde(default)]
    pub objective: Objective,
}

fn default_iterations() -> usize {
    10_000
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            objective: Objective::default(),
        }
    }
}

impl OptimizerConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::zero_count("iterations"));
        }
        Ok(())
    }
}

/// One evaluated portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioResult {
    /// Annualized expected return, decimal.
    pub expected_return: f64,
    /// Annualized volatility, decimal.
    pub volatility: f64,
    /// `(return − riskFree) / volatility`.
    pub sharpe_ratio: f64,
    /// Weights in percent, keyed by symbol. Sums to 100 up to rounding.
    pub weights: HashMap<String, f64>,
}

/// A frontier sample for visualization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Annualized volatility, decimal.
    pub volatility: f64,
    /// Annualized expected return, decimal.
    pub expected_return: f64,
}

/// Output of one optimizer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// The optimum selected by the configured objective.
    pub best: PortfolioResult,
    /// Sampled trials sorted by volatility ascending.
    pub frontier: Vec<FrontierPoint>,
}

/// Random-search optimizer over a fixed asset universe.
pub struct PortfolioOptimizer {
    assets: Vec<Asset>,
    correlations: CorrelationTable,
    config: OptimizerConfig,
}

/// Best-seen state for one objective.
struct TrackedOptimum {
    score: f64,
    result: Option<PortfolioResult>,
}

impl TrackedOptimum {
    const fn new() -> Self {
        Self {
            score: f64::NEG_INFINITY,
            result: None,
        }
    }

    fn offer(&mut self, score: f64, candidate: &PortfolioResult) {
        if score > self.score {
            self.score = score;
            self.result = Some(candidate.clone());
        }
    }
}

impl PortfolioOptimizer {
    /// Creates an optimizer from an asset universe, correlation table, and
    /// configuration.
    pub fn new(
        assets: Vec<Asset>,
        correlations: CorrelationTable,
        config: OptimizerConfig,
    ) -> Result<Self, PortfolioError> {
        config.validate()?;
        if assets.is_empty() {
            return Err(PortfolioError::EmptyUniverse);
        }
        for asset in &assets {
            if asset.volatility <= 0.0 {
                return Err(PortfolioError::InvalidConfig(ConfigError::not_positive(
                    "volatility",
                    asset.volatility,
                )));
            }
        }
        Ok(Self {
            assets,
            correlations,
            config,
        })
    }

    /// Runs the random search and reports the optimum for the configured
    /// objective plus the sampled frontier.
    #[must_use]
    pub fn optimize(&self, rv: &mut RandomVariate) -> OptimizationReport {
        let n = self.assets.len();
        let mut max_sharpe = TrackedOptimum::new();
        let mut min_volatility = TrackedOptimum::new();
        let mut target_match = TrackedOptimum::new();
        let mut frontier = Vec::with_capacity(self.config.iterations / FRONTIER_SAMPLE_EVERY + 1);

        info!(
            assets = n,
            iterations = self.config.iterations,
            "starting optimizer run"
        );

        let mut weights = vec![0.0_f64; n];
        for trial in 0..self.config.iterations {
            draw_weights(rv, &mut weights);

            let expected_return: f64 = weights
                .iter()
                .zip(&self.assets)
                .map(|(w, a)| w * a.expected_return)
                .sum();
            let volatility = self.portfolio_volatility(&weights);
            let sharpe_ratio = if volatility > 0.0 {
                (expected_return - RISK_FREE_RATE) / volatility
            } else {
                0.0
            };

            let candidate = PortfolioResult {
                expected_return,
                volatility,
                sharpe_ratio,
                weights: self
                    .assets
                    .iter()
                    .zip(&weights)
                    .map(|(a, w)| (a.symbol.clone(), w * 100.0))
                    .collect(),
            };

            max_sharpe.offer(sharpe_ratio, &candidate);
            min_volatility.offer(-volatility, &candidate);
            if let Objective::TargetReturn { target } = self.config.objective {
                target_match.offer(-(expected_return - target).abs(), &candidate);
            }

            if trial % FRONTIER_SAMPLE_EVERY == 0 {
                frontier.push(FrontierPoint {
                    volatility,
                    expected_return,
                });
            }
        }

        frontier.sort_by(|a, b| {
            a.volatility
                .partial_cmp(&b.volatility)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let tracked = match self.config.objective {
            Objective::MaxSharpe => max_sharpe,
            Objective::MinVolatility => min_volatility,
            Objective::TargetReturn { .. } => target_match,
        };
        // iterations >= 1 guarantees at least one offered candidate.
        let best = tracked
            .result
            .unwrap_or_else(|| self.equal_weight_fallback());

        info!(
            expected_return = best.expected_return,
            volatility = best.volatility,
            "optimizer run complete"
        );

        OptimizationReport { best, frontier }
    }

    fn portfolio_volatility(&self, weights: &[f64]) -> f64 {
        let mut variance = 0.0;
        for (i, a) in self.assets.iter().enumerate() {
            for (j, b) in self.assets.iter().enumerate() {
                variance += weights[i]
                    * weights[j]
                    * a.volatility
                    * b.volatility
                    * self.correlations.get(&a.symbol, &b.symbol);
            }
        }
        variance.max(0.0).sqrt()
    }

    fn equal_weight_fallback(&self) -> PortfolioResult {
        let n = self.assets.len();
        let weights = vec![1.0 / n as f64; n];
        let expected_return: f64 = weights
            .iter()
            .zip(&self.assets)
            .map(|(w, a)| w * a.expected_return)
            .sum();
        let volatility = self.portfolio_volatility(&weights);
        PortfolioResult {
            expected_return,
            volatility,
            sharpe_ratio: if volatility > 0.0 {
                (expected_return - RISK_FREE_RATE) / volatility
            } else {
                0.0
            },
            weights: self
                .assets
                .iter()
                .map(|a| (a.symbol.clone(), 100.0 / n as f64))
                .collect(),
        }
    }
}

/// Fills `weights` with an i.i.d.-uniform draw normalized to sum to 1.
fn draw_weights(rv: &mut RandomVariate, weights: &mut [f64]) {
    let mut sum = 0.0;
    for w in weights.iter_mut() {
        // Shift away from zero so a degenerate all-zero draw is impossible.
        *w = rv.next_uniform() + 1e-12;
        sum += *w;
    }
    for w in weights.iter_mut() {
        *w /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Vec<Asset> {
        vec![
            Asset {
                symbol: "SPY".into(),
                expected_return: 0.10,
                volatility: 0.16,
                current_weight: 60.0,
            },
            Asset {
                symbol: "TLT".into(),
                expected_return: 0.04,
                volatility: 0.12,
                current_weight: 30.0,
            },
            Asset {
                symbol: "GLD".into(),
                expected_return: 0.06,
                volatility: 0.18,
                current_weight: 10.0,
            },
        ]
    }

    fn correlations() -> CorrelationTable {
        CorrelationTable::from_entries([
            ("SPY", "TLT", -0.3),
            ("SPY", "GLD", 0.1),
            ("TLT", "GLD", 0.2),
        ])
    }

    fn run(objective: Objective, seed: u64) -> OptimizationReport {
        let optimizer = PortfolioOptimizer::new(
            universe(),
            correlations(),
            OptimizerConfig {
                iterations: 10_000,
                objective,
            },
        )
        .unwrap();
        optimizer.optimize(&mut RandomVariate::with_seed(seed))
    }

    #[test]
    fn test_rejects_bad_universe() {
        assert!(matches!(
            PortfolioOptimizer::new(vec![], correlations(), OptimizerConfig::default()),
            Err(PortfolioError::EmptyUniverse)
        ));

        let mut assets = universe();
        assets[0].volatility = 0.0;
        assert!(PortfolioOptimizer::new(assets, correlations(), OptimizerConfig::default()).is_err());
    }

    #[test]
    fn test_weights_sum_to_one_hundred() {
        let report = run(Objective::MaxSharpe, 42);
        let sum: f64 = report.best.weights.values().sum();
        assert!((sum - 100.0).abs() < 0.5, "weights sum to {sum}");
        assert!(report.best.weights.values().all(|w| *w >= 0.0));
        assert_eq!(report.best.weights.len(), 3);
    }

    #[test]
    fn test_min_volatility_dominates_on_volatility() {
        // Same seed means both objectives score the identical trial set.
        let sharpe = run(Objective::MaxSharpe, 7);
        let min_vol = run(Objective::MinVolatility, 7);
        assert!(min_vol.best.volatility <= sharpe.best.volatility);
        assert!(min_vol.best.volatility > 0.0);
    }

    #[test]
    fn test_target_return_objective_tracks_target() {
        let target = 0.07;
        let report = run(Objective::TargetReturn { target }, 11);
        // Feasible target inside the asset return range gets close.
        assert!((report.best.expected_return - target).abs() < 0.01);
    }

    #[test]
    fn test_frontier_sampling() {
        let report = run(Objective::MaxSharpe, 3);
        assert_eq!(report.frontier.len(), 100);
        assert!(report
            .frontier
            .windows(2)
            .all(|w| w[0].volatility <= w[1].volatility));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = run(Objective::MaxSharpe, 5);
        let b = run(Objective::MaxSharpe, 5);
        assert_eq!(a.best.expected_return, b.best.expected_return);
        assert_eq!(a.best.volatility, b.best.volatility);
    }
}
