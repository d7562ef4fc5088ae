//! Shared data models spanning the engine layers.

pub mod market;
pub mod order;
pub mod signal;

pub use market::{Account, Candle, Product, Ticker};
pub use order::{OrderAck, OrderRequest, OrderSide, TradeAction, TradeLogEntry};
pub use signal::{CrossState, Recommendation, SignalOutput, Transition};
