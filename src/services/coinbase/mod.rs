//! Coinbase Exchange REST integration.

pub mod auth;
pub mod client;

pub use client::CoinbaseRestClient;
