//! Price check cycle
//!
//! Fetches every registered source, diffs each quote against the cache and
//! collects the results. A failing vendor never blocks the others.

use crate::cache::{ChangeReport, PriceCache};
use crate::notify;
use crate::price::Vendor;
use crate::source::SourceRegistry;
use crate::telemetry::{increment_counter, CounterMetric};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::sync::Arc;

/// Result of one check cycle
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Reports for vendors that were fetched and cached, in vendor order
    pub reports: Vec<ChangeReport>,
    /// Vendors that failed to fetch or update, with the reason
    pub failures: Vec<(Vendor, String)>,
    pub checked_at: DateTime<Utc>,
}

impl CheckOutcome {
    /// Reports whose prices moved
    pub fn changed(&self) -> impl Iterator<Item = &ChangeReport> {
        self.reports.iter().filter(|r| r.changed)
    }

    /// Render as a notification
    pub fn render(&self) -> String {
        notify::render(&self.reports, &self.failures, self.checked_at)
    }
}

/// Runs check cycles over a source registry and a price cache
pub struct Monitor {
    registry: SourceRegistry,
    cache: Arc<PriceCache>,
}

impl Monitor {
    pub fn new(registry: SourceRegistry, cache: Arc<PriceCache>) -> Self {
        Self { registry, cache }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetch all sources and update the cache with every successful quote
    pub async fn run_once(&self) -> CheckOutcome {
        let checked_at = Utc::now();
        let fetched = self.registry.fetch_all().await;

        let mut failures = Vec::new();
        let mut readings = Vec::new();
        for (vendor, result) in fetched {
            match result {
                Ok(reading) => readings.push((vendor, reading)),
                Err(e) => {
                    tracing::warn!(vendor = vendor.id(), error = %e, "Failed to fetch price");
                    increment_counter(CounterMetric::FetchFailure, vendor);
                    failures.push((vendor, e.to_string()));
                }
            }
        }

        let updates = join_all(
            readings
                .into_iter()
                .map(|(vendor, reading)| async move {
                    (vendor, self.cache.compare_and_update(vendor, reading).await)
                }),
        )
        .await;

        let mut reports = Vec::new();
        for (vendor, result) in updates {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!(vendor = vendor.id(), error = %e, "Failed to update price cache");
                    failures.push((vendor, e.to_string()));
                }
            }
        }
        failures.sort_by_key(|(vendor, _)| *vendor);

        tracing::info!(
            fetched = reports.len(),
            changed = reports.iter().filter(|r| r.changed).count(),
            failed = failures.len(),
            "Price check complete"
        );

        CheckOutcome {
            reports,
            failures,
            checked_at,
        }
    }
}
