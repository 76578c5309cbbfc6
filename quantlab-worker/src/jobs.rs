//! Typed job launchers for the CPU-heavy engines.

use quantlab_backtest::{BacktestConfig, BacktestEngine, BacktestReport};
use quantlab_core::RandomVariate;
use quantlab_risk::{MonteCarloEngine, SimulationConfig, SimulationResult};

use crate::error::WorkerError;
use crate::handle::{spawn_job, WorkerHandle};

/// Runs a backtest off-thread, streaming progress.
///
/// An unset `seed` draws fresh entropy, so repeated runs differ; pass a
/// seed for reproducible output.
pub fn spawn_backtest(config: BacktestConfig, seed: Option<u64>) -> WorkerHandle<BacktestReport> {
    spawn_job(move |sink| {
        let engine =
            BacktestEngine::new(config).map_err(|e| WorkerError::JobFailed(e.to_string()))?;
        let mut rv = seed.map_or_else(RandomVariate::new, RandomVariate::with_seed);
        engine
            .run_with_progress(&mut rv, |p| sink.report(p))
            .map_err(|e| WorkerError::JobFailed(e.to_string()))
    })
}

/// Runs a Monte Carlo simulation off-thread, streaming progress.
pub fn spawn_simulation(
    config: SimulationConfig,
    seed: Option<u64>,
) -> WorkerHandle<SimulationResult> {
    spawn_job(move |sink| {
        let engine =
            MonteCarloEngine::new(config).map_err(|e| WorkerError::JobFailed(e.to_string()))?;
        let mut rv = seed.map_or_else(RandomVariate::new, RandomVariate::with_seed);
        Ok(engine.run_with_progress(&mut rv, |p| sink.report(p)))
    })
}
