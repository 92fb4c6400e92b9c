//! Prometheus metrics for the signal worker and its HTTP surface

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::models::signal::Tier;

pub struct Metrics {
    registry: Registry,

    pub cycles_total: IntCounter,
    pub signals_dispatched_total: IntCounterVec,
    pub fetch_errors_total: IntCounter,
    pub dispatch_errors_total: IntCounter,
    pub cycle_duration_seconds: Histogram,
    pub last_cycle_timestamp: Gauge,

    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles_total = IntCounter::new("cycles_total", "Evaluation cycles completed")?;
        let signals_dispatched_total = IntCounterVec::new(
            Opts::new("signals_dispatched_total", "Signals handed to the dispatcher"),
            &["tier"],
        )?;
        let fetch_errors_total =
            IntCounter::new("fetch_errors_total", "Market data fetch failures")?;
        let dispatch_errors_total =
            IntCounter::new("dispatch_errors_total", "Alert delivery failures")?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Wall time of one evaluation cycle")
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        let last_cycle_timestamp = Gauge::new(
            "last_cycle_timestamp_seconds",
            "Unix time at which the last cycle finished",
        )?;

        let http_requests_total = IntCounter::new("http_requests_total", "HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(signals_dispatched_total.clone()))?;
        registry.register(Box::new(fetch_errors_total.clone()))?;
        registry.register(Box::new(dispatch_errors_total.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(last_cycle_timestamp.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;

        // Labelled counters only show up once a label set exists.
        for tier in [Tier::Primary, Tier::Forced] {
            signals_dispatched_total.with_label_values(&[tier.as_str()]);
        }

        Ok(Self {
            registry,
            cycles_total,
            signals_dispatched_total,
            fetch_errors_total,
            dispatch_errors_total,
            cycle_duration_seconds,
            last_cycle_timestamp,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
        })
    }

    pub fn record_dispatch(&self, tier: Tier) {
        self.signals_dispatched_total
            .with_label_values(&[tier.as_str()])
            .inc();
    }

    pub fn dispatched(&self, tier: Tier) -> u64 {
        self.signals_dispatched_total
            .with_label_values(&[tier.as_str()])
            .get()
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
