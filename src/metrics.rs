//! Prometheus metrics for the trading loop and the health server.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub cycles_total: IntCounter,
    pub instruments_evaluated_total: IntCounter,
    pub instrument_failures_total: IntCounterVec,
    pub trades_total: IntCounterVec,
    pub cycle_duration_seconds: Histogram,
    pub instruments_tracked: IntGauge,
    pub http_requests_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("coinbot".to_string()), None)?;

        let cycles_total = IntCounter::new("cycles_total", "Completed polling cycles")?;
        let instruments_evaluated_total = IntCounter::new(
            "instruments_evaluated_total",
            "Instrument evaluations attempted",
        )?;
        let instrument_failures_total = IntCounterVec::new(
            Opts::new(
                "instrument_failures_total",
                "Instrument evaluations that failed, by failure kind",
            ),
            &["kind"],
        )?;
        let trades_total = IntCounterVec::new(
            Opts::new("trades_total", "Trades recorded, by side"),
            &["side"],
        )?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Wall time of one polling cycle")
                .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;
        let instruments_tracked =
            IntGauge::new("instruments_tracked", "Instruments visited each cycle")?;
        let http_requests_total = IntCounterVec::new(
            Opts::new(
                "http_requests_total",
                "Requests served by the health server, by route and status",
            ),
            &["route", "status"],
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(instruments_evaluated_total.clone()))?;
        registry.register(Box::new(instrument_failures_total.clone()))?;
        registry.register(Box::new(trades_total.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(instruments_tracked.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            instruments_evaluated_total,
            instrument_failures_total,
            trades_total,
            cycle_duration_seconds,
            instruments_tracked,
            http_requests_total,
        })
    }

    /// Text exposition of every registered metric.
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
