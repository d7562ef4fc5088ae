//! Market data records as served by the exchange REST API.

use crate::error::{BotError, BotResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bucket. The exchange sends these as bare arrays
/// `[time, low, high, open, close, volume]`, and only that shape is
/// accepted on decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CandleRow")]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            low,
            high,
            open,
            close,
            volume,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CandleRow(i64, f64, f64, f64, f64, f64);

impl TryFrom<CandleRow> for Candle {
    type Error = String;

    fn try_from(row: CandleRow) -> Result<Self, Self::Error> {
        let CandleRow(time, low, high, open, close, volume) = row;
        let timestamp = DateTime::from_timestamp(time, 0)
            .ok_or_else(|| format!("Invalid candle time: {}", time))?;
        if !(close.is_finite() && close > 0.0) {
            return Err(format!("Invalid candle close: {}", close));
        }
        Ok(Candle::new(open, high, low, close, volume, timestamp))
    }
}

/// Live quote for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub ask: String,
    #[serde(default)]
    pub bid: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SS.ffffffZ`
    pub time: String,
}

impl Ticker {
    /// Ask price as a positive float.
    pub fn ask_price(&self) -> BotResult<f64> {
        parse_price("ask", &self.ask)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub quote_currency: Option<String>,
    #[serde(default)]
    pub trading_disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub currency: String,
    pub balance: String,
    pub available: String,
    #[serde(default)]
    pub hold: Option<String>,
}

impl Account {
    pub fn available_amount(&self) -> BotResult<f64> {
        self.available.trim().parse::<f64>().map_err(|_| {
            BotError::Parse(format!("Invalid available balance: '{}'", self.available))
        })
    }
}

/// Parse a decimal string from the exchange into a strictly positive price.
pub fn parse_price(field: &str, raw: &str) -> BotResult<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| BotError::Parse(format!("Invalid {} price: '{}'", field, raw)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(BotError::Parse(format!(
            "Invalid {} price: {} is not positive",
            field, value
        )));
    }
    Ok(value)
}
