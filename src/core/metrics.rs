//! Metrics collection for the Telegram bot using Prometheus
//!
//! Counters live on an owned [`Registry`] so tests can build an isolated set.
//! Tracked:
//! - format lookups by outcome
//! - deliveries by attachment kind
//! - interaction errors by category
//! - number of pending format menus

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

pub struct BotMetrics {
    registry: Registry,
    /// Labels: outcome (ok/error)
    pub format_lookups: IntCounterVec,
    /// Labels: kind (audio/video)
    pub deliveries: IntCounterVec,
    /// Labels: category (see `FlowError::category`)
    pub flow_errors: IntCounterVec,
    pub live_sessions: IntGauge,
}

impl BotMetrics {
    /// Creates and registers all metrics on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let format_lookups = IntCounterVec::new(
            Opts::new("tubegrab_format_lookups_total", "Format list requests by outcome"),
            &["outcome"],
        )?;
        let deliveries = IntCounterVec::new(
            Opts::new("tubegrab_deliveries_total", "Files sent back to users by kind"),
            &["kind"],
        )?;
        let flow_errors = IntCounterVec::new(
            Opts::new("tubegrab_flow_errors_total", "Interactions that ended with an error"),
            &["category"],
        )?;
        let live_sessions = IntGauge::new("tubegrab_live_sessions", "Format menus waiting for a choice")?;

        registry.register(Box::new(format_lookups.clone()))?;
        registry.register(Box::new(deliveries.clone()))?;
        registry.register(Box::new(flow_errors.clone()))?;
        registry.register(Box::new(live_sessions.clone()))?;

        // Pre-create label sets so they show up in /metrics with 0 values
        for outcome in ["ok", "error"] {
            format_lookups.with_label_values(&[outcome]);
        }
        for kind in ["audio", "video"] {
            deliveries.with_label_values(&[kind]);
        }

        Ok(Self {
            registry,
            format_lookups,
            deliveries,
            flow_errors,
            live_sessions,
        })
    }

    /// Encodes all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<(String, String), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((
            encoder.format_type().to_string(),
            String::from_utf8_lossy(&buffer).into_owned(),
        ))
    }
}
