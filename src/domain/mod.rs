//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod analysis;
pub mod config_validation;
pub mod error;
