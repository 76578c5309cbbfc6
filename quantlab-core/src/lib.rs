//! # QuantLab Core
//!
//! Leaf numeric components shared by the QuantLab analytics engines.
//!
//! This crate provides:
//! - Deterministic random variate generation (uniform and standard normal)
//! - Synthetic price path generation via a biased random walk
//! - Stateless technical indicators (SMA, RSI, Bollinger Bands, rolling
//!   high/low, z-score)
//! - Configuration validation error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![cfg_attr(test, allow(clippy::float_cmp))]

/// Configuration validation errors.
pub mod error;

/// Stateless technical indicators.
pub mod indicators;

/// Random variate generation.
pub mod rng;

/// Synthetic price path generation.
pub mod series;

pub use error::ConfigError;
pub use rng::RandomVariate;
pub use series::{PriceSeriesConfig, PriceSeriesGenerator};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::ConfigError;
    pub use crate::indicators;
    pub use crate::rng::RandomVariate;
    pub use crate::series::{PriceSeriesConfig, PriceSeriesGenerator};
}
