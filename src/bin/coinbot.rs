//! Coinbot
//!
//! Polls Coinbase every few minutes and trades EMA crossovers on every USD
//! product that is not blacklisted.

use coinbot::config::{get_environment, BotConfig};
use coinbot::core::http::{start_server, AppState, HealthStatus};
use coinbot::core::instruments::InstrumentSet;
use coinbot::core::trader::{LoopContext, Trader, TradingPolicy};
use coinbot::logging;
use coinbot::metrics::Metrics;
use coinbot::services::{CoinbaseRestClient, Credentials, ExchangeClient};
use coinbot::sinks::{SvgChartWriter, TradeLog};
use dotenvy::dotenv;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = BotConfig::from_env()?;
    info!(environment = %get_environment(), "Starting Coinbot");
    info!(
        api_url = %config.api_url,
        poll_interval = config.poll_interval_seconds,
        granularity = config.granularity_seconds,
        lookback = config.lookback_seconds,
        buy_funds = config.buy_funds,
        trading_enabled = config.trading_enabled,
        "Configuration loaded"
    );

    if config.trading_enabled && !config.skip_confirmation && !confirm_live_trading()? {
        info!("Live trading not confirmed, exiting");
        return Ok(());
    }
    if !config.trading_enabled {
        warn!("TRADING_ENABLED is off: trades will be logged and charted but no orders sent");
    }

    let credentials = Credentials::load(&config.credentials_path)?;
    info!(path = %config.credentials_path.display(), "Credentials loaded");

    let client = CoinbaseRestClient::new(
        config.api_url.clone(),
        Some(credentials),
        config.request_timeout(),
    )?;
    let exchange: Arc<dyn ExchangeClient> = Arc::new(client);

    let products = exchange.list_products().await?;
    let instruments =
        InstrumentSet::from_products(&products, &config.quote_currency, &config.blacklist);
    if instruments.is_empty() {
        warn!(quote = %config.quote_currency, "No tradable instruments after filtering");
    } else {
        info!(
            count = instruments.len(),
            "Tracking {} instruments: {}",
            instruments.len(),
            instruments.symbols().join(", ")
        );
    }

    let metrics = Arc::new(Metrics::new()?);
    let health = Arc::new(RwLock::new(HealthStatus {
        trading_enabled: config.trading_enabled,
        instruments: instruments.len(),
        poll_interval_seconds: config.poll_interval_seconds,
        ..HealthStatus::default()
    }));

    if let Some(port) = config.metrics_port {
        let state = AppState {
            health: health.clone(),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
        };
        tokio::spawn(async move {
            if let Err(e) = start_server(port, state).await {
                error!(error = %e, "Health server stopped");
            }
        });
    }

    let trade_log = TradeLog::open(&config.trade_log_path)?;
    let charts = SvgChartWriter::new(&config.chart_dir)?;
    info!(
        trade_log = %config.trade_log_path.display(),
        charts = %config.chart_dir.display(),
        "Output sinks ready"
    );

    let mut ctx = LoopContext::new(Box::new(trade_log), Box::new(charts))
        .with_metrics(metrics)
        .with_health(health);
    let trader = Trader::new(exchange, instruments, TradingPolicy::from_config(&config));

    tokio::select! {
        _ = trader.run(&mut ctx) => {}
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }
    info!(cycles = ctx.cycle, evaluations = ctx.evaluations, "Coinbot stopped");

    Ok(())
}

fn confirm_live_trading() -> io::Result<bool> {
    print!("Live trading is enabled and will place real orders. Continue? Y/N\n> ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "Y" | "y"))
}
