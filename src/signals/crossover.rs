//! Short/long EMA crossover classification.

use crate::models::signal::{CrossState, Transition};

/// Classify the move between two consecutive points.
///
/// The state at each point is the sign of `short - long`; a difference of
/// exactly zero counts as `Low`.
pub fn classify(
    short_prev: f64,
    short_curr: f64,
    long_prev: f64,
    long_curr: f64,
) -> Transition {
    Transition::new(
        CrossState::from_diff(short_prev - long_prev),
        CrossState::from_diff(short_curr - long_curr),
    )
}
