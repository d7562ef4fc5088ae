//! Price series assembly from exchange candles plus the live quote.

use crate::models::market::Candle;

/// Chronological (oldest first) closing prices with the live price appended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Build the series the signal engine consumes.
///
/// `candles` arrive most-recent-first, as the candles endpoint serves them.
/// The result holds their closes oldest-first followed by `current_price`,
/// so its length is always `candles.len() + 1`.
pub fn build_price_series(candles: &[Candle], current_price: f64) -> PriceSeries {
    let mut prices: Vec<f64> = candles.iter().rev().map(|c| c.close).collect();
    prices.push(current_price);
    PriceSeries(prices)
}
