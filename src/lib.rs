//! EMA crossover trading bot for the Coinbase Exchange.

pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod sinks;

pub use error::{BotError, BotResult, FailureKind};
