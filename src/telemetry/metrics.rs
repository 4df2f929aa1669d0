//! Prometheus metrics

use crate::price::Vendor;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Cache entry written
    CacheUpdate,
    /// Reading differed from the cached one
    PriceChange,
    /// Reading rejected as older than the cached one
    StaleReading,
    /// Source fetch failed
    FetchFailure,
}

impl CounterMetric {
    fn name(&self) -> &'static str {
        match self {
            CounterMetric::CacheUpdate => "giavang_cache_updates_total",
            CounterMetric::PriceChange => "giavang_price_changes_total",
            CounterMetric::StaleReading => "giavang_stale_readings_total",
            CounterMetric::FetchFailure => "giavang_fetch_failures_total",
        }
    }
}

/// Increment a per-vendor counter
///
/// A no-op until a recorder is installed.
pub fn increment_counter(metric: CounterMetric, vendor: Vendor) {
    metrics::counter!(metric.name(), "vendor" => vendor.id()).increment(1);
}

/// Serve metrics for scraping on `port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
