//! Unit tests for order requests and trade log entries

use coinbot::models::{OrderRequest, OrderSide, TradeAction, TradeLogEntry};
use serde_json::{json, Value};

#[test]
fn test_market_buy_body() {
    let order = OrderRequest::market_buy("BTC-USD", 5.0);
    let body: Value = serde_json::to_value(&order).unwrap();
    assert_eq!(
        body,
        json!({
            "product_id": "BTC-USD",
            "side": "buy",
            "type": "market",
            "funds": "5.00"
        })
    );
}

#[test]
fn test_market_sell_body() {
    let order = OrderRequest::market_sell("ETH-USD", " 1.2500 ");
    assert_eq!(order.side, OrderSide::Sell);
    let body: Value = serde_json::to_value(&order).unwrap();
    assert_eq!(body["size"], "1.2500");
    assert!(body.get("funds").is_none());
}

#[test]
fn test_trade_log_entry_format() {
    let bought = TradeLogEntry {
        action: TradeAction::Bought,
        symbol: "BTC-USD".into(),
        price: 43012.5,
    };
    let sold = TradeLogEntry {
        action: TradeAction::Sold,
        symbol: "ETH-USD".into(),
        price: 3000.0,
    };
    assert_eq!(bought.to_string(), "Bought BTC-USD for 43012.5");
    assert_eq!(sold.to_string(), "Sold ETH-USD for 3000.0");
}
