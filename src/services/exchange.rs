//! Exchange interface consumed by the trading loop.

use crate::error::BotResult;
use crate::models::{Account, Candle, OrderAck, OrderRequest, Product, Ticker};
use async_trait::async_trait;
use chrono::NaiveDateTime;

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Full product catalog.
    async fn list_products(&self) -> BotResult<Vec<Product>>;

    /// Latest quote (ask price and its timestamp).
    async fn get_ticker(&self, product_id: &str) -> BotResult<Ticker>;

    /// Candles between `start` and `end`, most recent first.
    async fn get_candles(
        &self,
        product_id: &str,
        granularity_seconds: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> BotResult<Vec<Candle>>;

    /// Balances of the authenticated account.
    async fn get_accounts(&self) -> BotResult<Vec<Account>>;

    async fn place_market_order(&self, order: &OrderRequest) -> BotResult<OrderAck>;
}
