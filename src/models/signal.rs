//! Signal vocabulary: cross states, transitions and recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign of `short EMA - long EMA` at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossState {
    Low,
    High,
}

impl CrossState {
    /// Zero belongs to `Low`.
    pub fn from_diff(diff: f64) -> Self {
        if diff > 0.0 {
            CrossState::High
        } else {
            CrossState::Low
        }
    }
}

impl fmt::Display for CrossState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossState::Low => f.write_str("low"),
            CrossState::High => f.write_str("high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub before: CrossState,
    pub after: CrossState,
}

impl Transition {
    pub fn new(before: CrossState, after: CrossState) -> Self {
        Self { before, after }
    }

    pub fn recommendation(&self) -> Recommendation {
        match (self.before, self.after) {
            (CrossState::Low, CrossState::High) => Recommendation::Buy,
            (CrossState::High, CrossState::Low) => Recommendation::Sell,
            (CrossState::Low, CrossState::Low) | (CrossState::High, CrossState::High) => {
                Recommendation::None
            }
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.before, self.after)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Sell,
    None,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => f.write_str("buy"),
            Recommendation::Sell => f.write_str("sell"),
            Recommendation::None => f.write_str("none"),
        }
    }
}

/// Result of one engine evaluation. Both EMA curves are kept for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOutput {
    pub recommendation: Recommendation,
    pub transition: Transition,
    pub short_ema: Vec<f64>,
    pub long_ema: Vec<f64>,
}
