//! EMA crossover signal engine.

use crate::error::{BotError, BotResult};
use crate::indicators::trend::calculate_ema;
use crate::models::signal::SignalOutput;
use crate::signals::crossover::classify;

/// Slow trend span.
pub const LONG_SPAN: u32 = 100;
/// Fast trend span.
pub const SHORT_SPAN: u32 = 12;
/// Two points are needed to see a transition.
pub const MIN_PRICES: usize = 2;

pub struct SignalEngine;

impl SignalEngine {
    /// Compute both EMAs over the whole series and classify the transition
    /// between the last two points.
    pub fn recommend(prices: &[f64]) -> BotResult<SignalOutput> {
        if prices.len() < MIN_PRICES {
            return Err(BotError::InsufficientData {
                needed: MIN_PRICES,
                got: prices.len(),
            });
        }

        let long_ema = calculate_ema(prices, LONG_SPAN);
        let short_ema = calculate_ema(prices, SHORT_SPAN);

        let n = prices.len();
        let transition = classify(
            short_ema[n - 2],
            short_ema[n - 1],
            long_ema[n - 2],
            long_ema[n - 1],
        );

        Ok(SignalOutput {
            recommendation: transition.recommendation(),
            transition,
            short_ema,
            long_ema,
        })
    }
}
