//! Command implementations.

pub mod backtest;
pub mod kelly;
pub mod option;
pub mod optimize;
pub mod simulate;
