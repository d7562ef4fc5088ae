//! Coinbase Exchange REST client.

use crate::core::time_window::format_timestamp;
use crate::error::{BotError, BotResult};
use crate::models::{Account, Candle, OrderAck, OrderRequest, Product, Ticker};
use crate::services::credentials::Credentials;
use crate::services::exchange::ExchangeClient;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::auth::auth_headers;

const USER_AGENT: &str = concat!("coinbot/", env!("CARGO_PKG_VERSION"));

pub struct CoinbaseRestClient {
    base_url: String,
    client: Client,
    credentials: Option<Credentials>,
}

impl CoinbaseRestClient {
    /// Client with a bounded per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> BotResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BotError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client, credentials))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        client: Client,
        credentials: Option<Credentials>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> BotResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET {}", path);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        decode(response).await
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> BotResult<T> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            BotError::Config(format!("Credentials required for {} {}", method, path))
        })?;

        let timestamp = Utc::now().timestamp().to_string();
        let body = body.unwrap_or_default();
        let headers = auth_headers(credentials, &timestamp, method.as_str(), path, &body)?;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "{} {} (signed)", method, path);
        let mut request = self
            .client
            .request(method, &url)
            .header(ACCEPT, "application/json");
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if !body.is_empty() {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        decode(request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> BotResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);
        return Err(BotError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl ExchangeClient for CoinbaseRestClient {
    async fn list_products(&self) -> BotResult<Vec<Product>> {
        self.get_public("/products", &[]).await
    }

    async fn get_ticker(&self, product_id: &str) -> BotResult<Ticker> {
        self.get_public(&format!("/products/{}/ticker", product_id), &[])
            .await
    }

    async fn get_candles(
        &self,
        product_id: &str,
        granularity_seconds: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> BotResult<Vec<Candle>> {
        let query = [
            ("granularity", granularity_seconds.to_string()),
            ("start", format_timestamp(start)),
            ("end", format_timestamp(end)),
        ];
        self.get_public(&format!("/products/{}/candles", product_id), &query)
            .await
    }

    async fn get_accounts(&self) -> BotResult<Vec<Account>> {
        self.send_signed(Method::GET, "/accounts", None).await
    }

    async fn place_market_order(&self, order: &OrderRequest) -> BotResult<OrderAck> {
        let body = serde_json::to_string(order)?;
        self.send_signed(Method::POST, "/orders", Some(body)).await
    }
}
