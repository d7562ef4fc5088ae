//! Signal pipeline: price series -> EMAs -> crossover -> recommendation.

pub mod crossover;
pub mod engine;
pub mod series;

pub use crossover::classify;
pub use engine::{SignalEngine, LONG_SPAN, MIN_PRICES, SHORT_SPAN};
pub use series::{build_price_series, PriceSeries};
