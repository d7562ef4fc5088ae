//! Polling loop: fetch quote -> fetch history -> build series -> signal -> act.
//!
//! Instruments are visited sequentially in [`InstrumentSet`] order. Anything
//! that goes wrong for one instrument is logged, recorded in the
//! [`CycleReport`] and counted; the cycle then moves on to the next
//! instrument. Nothing escapes [`Trader::run_cycle`].

use crate::config::BotConfig;
use crate::core::http::HealthStatus;
use crate::core::instruments::{base_currency, InstrumentSet};
use crate::core::time_window::{parse_timestamp, TimeWindow};
use crate::error::{BotError, BotResult, FailureKind};
use crate::metrics::Metrics;
use crate::models::{
    Account, OrderRequest, Recommendation, SignalOutput, TradeAction, TradeLogEntry, Transition,
};
use crate::services::exchange::ExchangeClient;
use crate::signals::{build_price_series, PriceSeries, SignalEngine};
use crate::sinks::{ChartSink, TradeSink};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Fixed parameters of the trading policy.
#[derive(Debug, Clone)]
pub struct TradingPolicy {
    pub granularity_seconds: u32,
    pub window: TimeWindow,
    /// Quote-currency amount spent on every buy.
    pub buy_funds: f64,
    /// When false, orders are not sent but trades are still logged and charted.
    pub trading_enabled: bool,
    pub poll_interval: Duration,
}

impl TradingPolicy {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            granularity_seconds: config.granularity_seconds,
            window: TimeWindow::new(config.lookback_seconds),
            buy_funds: config.buy_funds,
            trading_enabled: config.trading_enabled,
            poll_interval: config.poll_interval(),
        }
    }
}

impl Default for TradingPolicy {
    fn default() -> Self {
        Self::from_config(&BotConfig::default())
    }
}

/// State carried from one cycle to the next.
pub struct LoopContext {
    pub cycle: u64,
    pub evaluations: u64,
    trades: Box<dyn TradeSink>,
    charts: Box<dyn ChartSink>,
    metrics: Option<Arc<Metrics>>,
    health: Option<Arc<RwLock<HealthStatus>>>,
}

impl LoopContext {
    pub fn new(trades: Box<dyn TradeSink>, charts: Box<dyn ChartSink>) -> Self {
        Self {
            cycle: 0,
            evaluations: 0,
            trades,
            charts,
            metrics: None,
            health: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_health(mut self, health: Arc<RwLock<HealthStatus>>) -> Self {
        self.health = Some(health);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentOutcome {
    /// Signal computed, no crossover.
    Held { transition: Transition },
    /// Series too short for a signal.
    NoData { prices: usize },
    /// `order_id` is `None` for paper trades.
    Bought { price: f64, order_id: Option<String> },
    Sold {
        price: f64,
        size: Option<String>,
        order_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<BotError> for InstrumentFailure {
    fn from(err: BotError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentReport {
    pub symbol: String,
    pub result: Result<InstrumentOutcome, InstrumentFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub balances_loaded: bool,
    pub instruments: Vec<InstrumentReport>,
}

impl CycleReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &InstrumentFailure)> {
        self.instruments
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|f| (r.symbol.as_str(), f)))
    }

    pub fn trades(&self) -> usize {
        self.instruments
            .iter()
            .filter(|r| {
                matches!(
                    r.result,
                    Ok(InstrumentOutcome::Bought { .. }) | Ok(InstrumentOutcome::Sold { .. })
                )
            })
            .count()
    }

    pub fn outcome(&self, symbol: &str) -> Option<&Result<InstrumentOutcome, InstrumentFailure>> {
        self.instruments
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| &r.result)
    }
}

pub struct Trader {
    exchange: Arc<dyn ExchangeClient>,
    instruments: InstrumentSet,
    policy: TradingPolicy,
}

impl Trader {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        instruments: InstrumentSet,
        policy: TradingPolicy,
    ) -> Self {
        Self {
            exchange,
            instruments,
            policy,
        }
    }

    pub fn instruments(&self) -> &InstrumentSet {
        &self.instruments
    }

    pub fn policy(&self) -> &TradingPolicy {
        &self.policy
    }

    /// Cycle forever, sleeping the poll interval between cycles.
    pub async fn run(&self, ctx: &mut LoopContext) {
        if let Some(metrics) = &ctx.metrics {
            metrics.instruments_tracked.set(self.instruments.len() as i64);
        }
        loop {
            let report = self.run_cycle(ctx).await;
            info!(
                cycle = report.cycle,
                trades = report.trades(),
                failures = report.failures().count(),
                sleep_secs = self.policy.poll_interval.as_secs(),
                "Cycle {} complete, sleeping",
                report.cycle
            );
            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }

    /// Visit every instrument once.
    pub async fn run_cycle(&self, ctx: &mut LoopContext) -> CycleReport {
        ctx.cycle += 1;
        let started = Instant::now();

        // Balances are only needed if a sell fires, but are read once per cycle.
        let balances = match self.exchange.get_accounts().await {
            Ok(accounts) => Some(accounts),
            Err(e) => {
                error!(
                    cycle = ctx.cycle,
                    kind = %e.kind(),
                    error = %e,
                    "Failed to fetch account balances; live sells this cycle will fail"
                );
                None
            }
        };

        let mut reports = Vec::with_capacity(self.instruments.len());
        for symbol in self.instruments.iter() {
            ctx.evaluations += 1;
            debug!(symbol = %symbol, evaluation = ctx.evaluations, "Evaluating {}", symbol);
            if let Some(metrics) = &ctx.metrics {
                metrics.instruments_evaluated_total.inc();
            }

            let result = self
                .process_instrument(symbol, balances.as_deref(), ctx)
                .await;

            if let Err(e) = &result {
                error!(symbol = %symbol, kind = %e.kind(), error = %e, "Instrument failed");
                if let Some(metrics) = &ctx.metrics {
                    metrics
                        .instrument_failures_total
                        .with_label_values(&[e.kind().as_str()])
                        .inc();
                }
            }

            reports.push(InstrumentReport {
                symbol: symbol.to_string(),
                result: result.map_err(InstrumentFailure::from),
            });
        }

        let report = CycleReport {
            cycle: ctx.cycle,
            balances_loaded: balances.is_some(),
            instruments: reports,
        };

        if let Some(metrics) = &ctx.metrics {
            metrics.cycles_total.inc();
            metrics
                .cycle_duration_seconds
                .observe(started.elapsed().as_secs_f64());
        }
        if let Some(health) = &ctx.health {
            let mut health = health.write().await;
            health.cycles_completed = ctx.cycle;
            health.last_cycle_at = Some(Utc::now());
            health.last_cycle_failures = report.failures().count();
            health.instruments = self.instruments.len();
            health.trading_enabled = self.policy.trading_enabled;
            health.poll_interval_seconds = self.policy.poll_interval.as_secs();
        }

        report
    }

    async fn process_instrument(
        &self,
        symbol: &str,
        balances: Option<&[Account]>,
        ctx: &mut LoopContext,
    ) -> BotResult<InstrumentOutcome> {
        let ticker = self.exchange.get_ticker(symbol).await?;
        let price = ticker.ask_price()?;
        let end = parse_timestamp(&ticker.time)?;
        let start = self.policy.window.start_of(end)?;

        let candles = self
            .exchange
            .get_candles(symbol, self.policy.granularity_seconds, start, end)
            .await?;
        let series = build_price_series(&candles, price);

        let signal = match SignalEngine::recommend(series.as_slice()) {
            Ok(signal) => signal,
            Err(BotError::InsufficientData { got, .. }) => {
                debug!(symbol = %symbol, prices = got, "Not enough prices for a signal");
                return Ok(InstrumentOutcome::NoData { prices: got });
            }
            Err(e) => return Err(e),
        };

        debug!(
            symbol = %symbol,
            price = price,
            candles = candles.len(),
            transition = %signal.transition,
            recommendation = %signal.recommendation,
            "Signal computed"
        );

        match signal.recommendation {
            Recommendation::None => Ok(InstrumentOutcome::Held {
                transition: signal.transition,
            }),
            Recommendation::Buy => {
                let order = OrderRequest::market_buy(symbol, self.policy.buy_funds);
                let order_id = self.execute(&order).await?;
                self.record(ctx, TradeAction::Bought, symbol, price, &series, &signal)?;
                Ok(InstrumentOutcome::Bought { price, order_id })
            }
            Recommendation::Sell => {
                let (size, order_id) = if self.policy.trading_enabled {
                    let size = available_to_sell(balances, symbol)?;
                    let order = OrderRequest::market_sell(symbol, &size);
                    (Some(size), self.execute(&order).await?)
                } else {
                    let size = available_to_sell(balances, symbol).ok();
                    info!(symbol = %symbol, size = ?size, "Paper trading: sell not sent");
                    (size, None)
                };
                self.record(ctx, TradeAction::Sold, symbol, price, &series, &signal)?;
                Ok(InstrumentOutcome::Sold {
                    price,
                    size,
                    order_id,
                })
            }
        }
    }

    /// Send the order, or skip it in paper mode. Returns the exchange order id.
    async fn execute(&self, order: &OrderRequest) -> BotResult<Option<String>> {
        if !self.policy.trading_enabled {
            info!(
                symbol = %order.product_id,
                side = %order.side,
                funds = ?order.funds,
                "Paper trading: order not sent"
            );
            return Ok(None);
        }

        let ack = self
            .exchange
            .place_market_order(order)
            .await
            .map_err(BotError::into_order_failure)?;
        info!(
            symbol = %order.product_id,
            side = %order.side,
            order_id = %ack.id,
            "Order placed"
        );
        Ok(Some(ack.id))
    }

    /// Trade log line first, chart second. A chart failure does not undo the
    /// trade.
    fn record(
        &self,
        ctx: &mut LoopContext,
        action: TradeAction,
        symbol: &str,
        price: f64,
        series: &PriceSeries,
        signal: &SignalOutput,
    ) -> BotResult<()> {
        let entry = TradeLogEntry {
            action,
            symbol: symbol.to_string(),
            price,
        };
        ctx.trades.record(&entry)?;
        info!(symbol = %symbol, price = price, "{}", entry);

        if let Some(metrics) = &ctx.metrics {
            let side = match action {
                TradeAction::Bought => "buy",
                TradeAction::Sold => "sell",
            };
            metrics.trades_total.with_label_values(&[side]).inc();
        }

        match ctx
            .charts
            .emit(symbol, series.as_slice(), &signal.short_ema, &signal.long_ema)
        {
            Ok(path) => debug!(symbol = %symbol, path = %path.display(), "Chart written"),
            Err(e) => warn!(symbol = %symbol, error = %e, "Failed to write chart"),
        }
        Ok(())
    }
}

/// Available balance of the instrument's base currency, as the exchange
/// reported it.
fn available_to_sell(balances: Option<&[Account]>, symbol: &str) -> BotResult<String> {
    let base = base_currency(symbol)
        .ok_or_else(|| BotError::Parse(format!("Product id '{}' has no base currency", symbol)))?;
    let balances = balances
        .ok_or_else(|| BotError::Balance("account balances unavailable this cycle".into()))?;
    let account = balances
        .iter()
        .find(|a| a.currency == base)
        .ok_or_else(|| BotError::Balance(format!("no {} account", base)))?;

    if account.available_amount()? <= 0.0 {
        return Err(BotError::Balance(format!("no {} available to sell", base)));
    }
    Ok(account.available.trim().to_string())
}
