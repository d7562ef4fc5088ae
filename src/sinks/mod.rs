//! Output sinks written to when a trade goes through.

pub mod chart;
pub mod trade_log;

pub use chart::SvgChartWriter;
pub use trade_log::TradeLog;

use crate::error::BotResult;
use crate::models::order::TradeLogEntry;
use std::path::PathBuf;

/// Append-only destination for executed trades.
pub trait TradeSink: Send {
    fn record(&mut self, entry: &TradeLogEntry) -> BotResult<()>;
}

/// Destination for a snapshot of the series that triggered a trade.
pub trait ChartSink: Send {
    /// Persist the chart and return where it went.
    fn emit(
        &mut self,
        symbol: &str,
        prices: &[f64],
        short_ema: &[f64],
        long_ema: &[f64],
    ) -> BotResult<PathBuf>;
}
