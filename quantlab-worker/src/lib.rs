//! Off-thread execution for CPU-heavy analytics.
//!
//! Runs a long computation on the blocking thread pool, streaming
//! fractional progress through a watch channel (latest value wins, slow
//! consumers just miss intermediate updates) and delivering exactly one
//! terminal result through a oneshot. Panics inside the job are caught
//! and surfaced as a terminal error instead of poisoning the runtime.
//! Jobs are not cancellable mid-run; a worker's lifetime is one request.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod handle;
pub mod jobs;

pub use error::WorkerError;
pub use handle::{spawn_job, ProgressSink, WorkerHandle};
pub use jobs::{spawn_backtest, spawn_simulation};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::error::WorkerError;
    pub use crate::handle::{spawn_job, ProgressSink, WorkerHandle};
    pub use crate::jobs::{spawn_backtest, spawn_simulation};
}
