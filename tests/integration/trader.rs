//! Integration tests for the polling cycle
//!
//! Runs whole cycles against an in-memory exchange and checks what was
//! ordered, logged and charted.

use super::test_utils::{
    account, ticker, FakeExchange, RecordingCharts, RecordingTrades, TICKER_TIME,
};
use chrono::TimeDelta;
use coinbot::core::http::HealthStatus;
use coinbot::core::instruments::InstrumentSet;
use coinbot::core::time_window::parse_timestamp;
use coinbot::core::trader::{InstrumentOutcome, LoopContext, Trader, TradingPolicy};
use coinbot::metrics::Metrics;
use coinbot::models::{CrossState, OrderSide, Transition};
use coinbot::FailureKind;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

// Closes are oldest first; the ask is appended as the newest price.
const BUY_CLOSES: &[f64] = &[1.0];
const BUY_ASK: f64 = 2.0;
const SELL_CLOSES: &[f64] = &[10.0, 11.0];
const SELL_ASK: f64 = 5.0;
const HOLD_CLOSES: &[f64] = &[1.0, 2.0];
const HOLD_ASK: f64 = 3.0;

struct Harness {
    exchange: Arc<FakeExchange>,
    trader: Trader,
    ctx: LoopContext,
    trades: RecordingTrades,
    charts: RecordingCharts,
}

fn harness(exchange: FakeExchange, symbols: &[&str], trading_enabled: bool) -> Harness {
    harness_with_charts(exchange, symbols, trading_enabled, RecordingCharts::default())
}

fn harness_with_charts(
    exchange: FakeExchange,
    symbols: &[&str],
    trading_enabled: bool,
    charts: RecordingCharts,
) -> Harness {
    let exchange = Arc::new(exchange);
    let instruments = InstrumentSet::from_catalog(symbols.iter().copied(), "USD", &[]);
    let policy = TradingPolicy {
        trading_enabled,
        ..TradingPolicy::default()
    };
    let trader = Trader::new(exchange.clone(), instruments, policy);
    let trades = RecordingTrades::default();
    let ctx = LoopContext::new(Box::new(trades.clone()), Box::new(charts.clone()));
    Harness {
        exchange,
        trader,
        ctx,
        trades,
        charts,
    }
}

#[tokio::test]
async fn failing_instrument_does_not_stop_the_cycle() {
    let exchange = FakeExchange::new()
        .with_failing_ticker("AAA-USD")
        .with_market("BTC-USD", HOLD_CLOSES, HOLD_ASK)
        .with_accounts(vec![]);
    let mut h = harness(exchange, &["AAA-USD", "BTC-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    assert_eq!(report.cycle, 1);
    assert_eq!(h.ctx.evaluations, 2);
    let failure = report.outcome("AAA-USD").unwrap().as_ref().unwrap_err();
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(matches!(
        report.outcome("BTC-USD"),
        Some(Ok(InstrumentOutcome::Held { .. }))
    ));
    assert_eq!(report.failures().count(), 1);
}

#[tokio::test]
async fn buy_is_ordered_then_logged_and_charted() {
    let exchange = FakeExchange::new()
        .with_market("BTC-USD", BUY_CLOSES, BUY_ASK)
        .with_accounts(vec![]);
    let mut h = harness(exchange, &["BTC-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    assert_eq!(
        report.outcome("BTC-USD"),
        Some(&Ok(InstrumentOutcome::Bought {
            price: BUY_ASK,
            order_id: Some("order-1".into()),
        }))
    );
    let orders = h.exchange.placed_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].side, OrderSide::Buy);
    assert_eq!(orders[0].funds.as_deref(), Some("5.00"));
    assert_eq!(h.trades.lines(), vec!["Bought BTC-USD for 2.0"]);
    assert_eq!(h.charts.symbols(), vec!["BTC-USD"]);
    assert_eq!(report.trades(), 1);
}

#[tokio::test]
async fn rejected_order_is_not_logged() {
    let exchange = FakeExchange::new()
        .with_market("BTC-USD", BUY_CLOSES, BUY_ASK)
        .with_accounts(vec![])
        .rejecting_orders();
    let mut h = harness(exchange, &["BTC-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    let failure = report.outcome("BTC-USD").unwrap().as_ref().unwrap_err();
    assert_eq!(failure.kind, FailureKind::OrderExecution);
    assert!(failure.message.contains("Insufficient funds"));
    assert!(h.trades.lines().is_empty());
    assert!(h.charts.symbols().is_empty());
}

#[tokio::test]
async fn paper_mode_logs_without_ordering() {
    let exchange = FakeExchange::new()
        .with_market("BTC-USD", BUY_CLOSES, BUY_ASK)
        .with_market("ETH-USD", SELL_CLOSES, SELL_ASK);
    let mut h = harness(exchange, &["BTC-USD", "ETH-USD"], false);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    assert!(h.exchange.placed_orders().is_empty());
    assert!(!report.balances_loaded);
    assert_eq!(
        report.outcome("BTC-USD"),
        Some(&Ok(InstrumentOutcome::Bought {
            price: BUY_ASK,
            order_id: None,
        }))
    );
    assert_eq!(
        report.outcome("ETH-USD"),
        Some(&Ok(InstrumentOutcome::Sold {
            price: SELL_ASK,
            size: None,
            order_id: None,
        }))
    );
    assert_eq!(
        h.trades.lines(),
        vec!["Bought BTC-USD for 2.0", "Sold ETH-USD for 5.0"]
    );
}

#[tokio::test]
async fn sell_uses_available_balance() {
    let exchange = FakeExchange::new()
        .with_market("ETH-USD", SELL_CLOSES, SELL_ASK)
        .with_accounts(vec![account("USD", "100.00"), account("ETH", "0.2500")]);
    let mut h = harness(exchange, &["ETH-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    assert_eq!(
        report.outcome("ETH-USD"),
        Some(&Ok(InstrumentOutcome::Sold {
            price: SELL_ASK,
            size: Some("0.2500".into()),
            order_id: Some("order-1".into()),
        }))
    );
    let orders = h.exchange.placed_orders();
    assert_eq!(orders[0].side, OrderSide::Sell);
    assert_eq!(orders[0].size.as_deref(), Some("0.2500"));
    assert_eq!(h.trades.lines(), vec!["Sold ETH-USD for 5.0"]);
}

#[tokio::test]
async fn sell_without_balance_fails() {
    for accounts in [None, Some(vec![]), Some(vec![account("ETH", "0")])] {
        let mut exchange = FakeExchange::new().with_market("ETH-USD", SELL_CLOSES, SELL_ASK);
        exchange.accounts = accounts;
        let mut h = harness(exchange, &["ETH-USD"], true);

        let report = h.trader.run_cycle(&mut h.ctx).await;

        let failure = report.outcome("ETH-USD").unwrap().as_ref().unwrap_err();
        assert_eq!(failure.kind, FailureKind::Balance);
        assert!(h.exchange.placed_orders().is_empty());
        assert!(h.trades.lines().is_empty());
    }
}

#[tokio::test]
async fn missing_balances_do_not_block_buys() {
    let exchange = FakeExchange::new().with_market("BTC-USD", BUY_CLOSES, BUY_ASK);
    let mut h = harness(exchange, &["BTC-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    assert!(!report.balances_loaded);
    assert!(matches!(
        report.outcome("BTC-USD"),
        Some(Ok(InstrumentOutcome::Bought { .. }))
    ));
}

#[tokio::test]
async fn chart_failure_keeps_the_trade() {
    let exchange = FakeExchange::new()
        .with_market("BTC-USD", BUY_CLOSES, BUY_ASK)
        .with_accounts(vec![]);
    let mut h = harness_with_charts(exchange, &["BTC-USD"], true, RecordingCharts::failing());

    let report = h.trader.run_cycle(&mut h.ctx).await;

    assert!(matches!(
        report.outcome("BTC-USD"),
        Some(Ok(InstrumentOutcome::Bought { .. }))
    ));
    assert_eq!(h.trades.lines().len(), 1);
}

#[tokio::test]
async fn short_history_is_no_data() {
    let exchange = FakeExchange::new()
        .with_market("BTC-USD", &[], 100.0)
        .with_accounts(vec![]);
    let mut h = harness(exchange, &["BTC-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    assert_eq!(
        report.outcome("BTC-USD"),
        Some(&Ok(InstrumentOutcome::NoData { prices: 1 }))
    );
}

#[tokio::test]
async fn malformed_quote_is_a_parse_failure() {
    let exchange = FakeExchange::new()
        .with_ticker("BTC-USD", ticker(10.0, "30/03/2022 14:00"))
        .with_ticker("ETH-USD", ticker(-1.0, "2022-03-30T14:00:00Z"))
        .with_accounts(vec![]);
    let mut h = harness(exchange, &["BTC-USD", "ETH-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;

    for symbol in ["BTC-USD", "ETH-USD"] {
        let failure = report.outcome(symbol).unwrap().as_ref().unwrap_err();
        assert_eq!(failure.kind, FailureKind::Parse, "{}", symbol);
    }
    assert!(h.exchange.candle_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn candles_cover_the_lookback_window() {
    let exchange = FakeExchange::new()
        .with_market("BTC-USD", HOLD_CLOSES, HOLD_ASK)
        .with_accounts(vec![]);
    let mut h = harness(exchange, &["BTC-USD"], true);

    let report = h.trader.run_cycle(&mut h.ctx).await;
    assert_eq!(
        report.outcome("BTC-USD"),
        Some(&Ok(InstrumentOutcome::Held {
            transition: Transition::new(CrossState::High, CrossState::High),
        }))
    );

    let requests = h.exchange.candle_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (symbol, granularity, start, end) = &requests[0];
    assert_eq!(symbol, "BTC-USD");
    assert_eq!(*granularity, 900);
    assert_eq!(*end, parse_timestamp(TICKER_TIME).unwrap());
    assert_eq!(*end - *start, TimeDelta::seconds(108_000));
}

#[tokio::test]
async fn cycle_updates_metrics_and_health() {
    let exchange = FakeExchange::new()
        .with_failing_ticker("AAA-USD")
        .with_market("BTC-USD", BUY_CLOSES, BUY_ASK)
        .with_accounts(vec![]);
    let mut h = harness(exchange, &["AAA-USD", "BTC-USD"], true);
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let health = Arc::new(RwLock::new(HealthStatus::default()));
    h.ctx = LoopContext::new(Box::new(h.trades.clone()), Box::new(h.charts.clone()))
        .with_metrics(metrics.clone())
        .with_health(health.clone());

    h.trader.run_cycle(&mut h.ctx).await;
    h.trader.run_cycle(&mut h.ctx).await;

    assert_eq!(metrics.cycles_total.get(), 2);
    assert_eq!(metrics.instruments_evaluated_total.get(), 4);
    assert_eq!(
        metrics
            .instrument_failures_total
            .with_label_values(&["transport"])
            .get(),
        2
    );
    assert_eq!(metrics.trades_total.with_label_values(&["buy"]).get(), 2);

    let health = health.read().await;
    assert_eq!(health.cycles_completed, 2);
    assert_eq!(health.last_cycle_failures, 1);
    assert_eq!(health.instruments, 2);
    assert!(health.trading_enabled);
    assert!(health.last_cycle_at.is_some());
}

#[tokio::test]
async fn run_sleeps_between_cycles_and_never_returns() {
    let exchange = FakeExchange::new()
        .with_market("BTC-USD", HOLD_CLOSES, HOLD_ASK)
        .with_market("ETH-USD", HOLD_CLOSES, HOLD_ASK)
        .with_accounts(vec![]);
    let instruments = InstrumentSet::from_catalog(["BTC-USD", "ETH-USD"], "USD", &[]);
    let interval = Duration::from_millis(50);
    let policy = TradingPolicy {
        poll_interval: interval,
        ..TradingPolicy::default()
    };
    let trader = Trader::new(Arc::new(exchange), instruments, policy);
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let mut ctx = LoopContext::new(
        Box::new(RecordingTrades::default()),
        Box::new(RecordingCharts::default()),
    )
    .with_metrics(metrics.clone());

    let started = Instant::now();
    let result = tokio::time::timeout(Duration::from_millis(275), trader.run(&mut ctx)).await;
    let elapsed = started.elapsed();

    assert!(result.is_err(), "run returned instead of looping");
    assert!(ctx.cycle >= 2, "only {} cycle(s) ran", ctx.cycle);
    // cycle k starts no earlier than (k - 1) poll intervals in
    let max_cycles = elapsed.as_millis() / interval.as_millis() + 1;
    assert!(
        u128::from(ctx.cycle) <= max_cycles,
        "{} cycles in {:?} means the sleep was skipped",
        ctx.cycle,
        elapsed
    );
    assert_eq!(metrics.instruments_tracked.get(), 2);
}
