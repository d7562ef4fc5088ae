//! EMA (Exponential Moving Average) indicator
//!
//! Spans use the center-of-mass convention: `alpha = 1 / (1 + span)`.
//! Each output point is the normalized exponentially weighted average of
//! every input up to and including that index:
//!
//! ```text
//! ema[t] = sum_{i=0..=t} (1 - alpha)^i * x[t - i]  /  sum_{i=0..=t} (1 - alpha)^i
//! ```
//!
//! so `ema[0] == x[0]` and early points are not biased toward zero.

/// Smoothing factor for a center-of-mass span.
pub fn alpha_for_span(span: u32) -> f64 {
    1.0 / (1.0 + span as f64)
}

/// Calculate the EMA series for `values`. The output has the same length and
/// alignment as the input; an empty input yields an empty series.
pub fn calculate_ema(values: &[f64], span: u32) -> Vec<f64> {
    let decay = 1.0 - alpha_for_span(span);
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    values
        .iter()
        .map(|&value| {
            weighted_sum = value + decay * weighted_sum;
            weight_total = 1.0 + decay * weight_total;
            weighted_sum / weight_total
        })
        .collect()
}

