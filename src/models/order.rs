//! Market order requests and the records written once a trade goes through.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => f.write_str("buy"),
            OrderSide::Sell => f.write_str("sell"),
        }
    }
}

/// Body of `POST /orders`. Amounts are decimal strings on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub product_id: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl OrderRequest {
    /// Market buy spending `funds` of the quote currency.
    pub fn market_buy(product_id: &str, funds: f64) -> Self {
        Self {
            product_id: product_id.to_string(),
            side: OrderSide::Buy,
            order_type: "market".to_string(),
            funds: Some(format!("{:.2}", funds)),
            size: None,
        }
    }

    /// Market sell of `size` units of the base currency, passed through as
    /// the exchange reported it.
    pub fn market_sell(product_id: &str, size: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            side: OrderSide::Sell,
            order_type: "market".to_string(),
            funds: None,
            size: Some(size.trim().to_string()),
        }
    }
}

/// Acknowledgement returned by the exchange for an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Bought,
    Sold,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Bought => f.write_str("Bought"),
            TradeAction::Sold => f.write_str("Sold"),
        }
    }
}

/// One line of the trade log, e.g. `Bought BTC-USD for 43012.5`. Prices keep a
/// decimal point even when whole (`3000.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    pub action: TradeAction,
    pub symbol: String,
    pub price: f64,
}

impl fmt::Display for TradeLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} for {:?}", self.action, self.symbol, self.price)
    }
}
