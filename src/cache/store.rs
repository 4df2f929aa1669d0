//! Price snapshot cache and differ

use super::{CacheBackend, CacheEntry, CacheError, ChangeReport};
use crate::price::{PriceReading, Vendor};
use crate::telemetry::{increment_counter, CounterMetric};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default key prefix; entries are stored under `<prefix>:<vendor id>`
pub const DEFAULT_KEY_PREFIX: &str = "gold:last";

/// Last-known price per vendor, backed by a [`CacheBackend`]
///
/// Updates for one vendor are serialized by a per-vendor lock held across the
/// read-check-write sequence. Updates for different vendors run in parallel.
pub struct PriceCache {
    backend: Arc<dyn CacheBackend>,
    key_prefix: String,
    locks: [Mutex<()>; Vendor::COUNT],
}

impl PriceCache {
    /// Create a cache over `backend` with the default key prefix
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_key_prefix(backend, DEFAULT_KEY_PREFIX)
    }

    /// Create a cache over `backend` with a custom key prefix
    pub fn with_key_prefix(backend: Arc<dyn CacheBackend>, key_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            key_prefix: key_prefix.into(),
            locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    /// Storage key for a vendor
    pub fn key(&self, vendor: Vendor) -> String {
        format!("{}:{}", self.key_prefix, vendor.id())
    }

    /// Get the cached entry for `vendor`, if any
    pub async fn get_cached(&self, vendor: Vendor) -> Result<Option<CacheEntry>, CacheError> {
        let raw = self.backend.read(&self.key(vendor)).await?;
        raw.map(|raw| CacheEntry::decode(vendor, &raw)).transpose()
    }

    /// Compare `reading` against the cached entry and store it
    ///
    /// Rejects readings older than the cached one with
    /// [`CacheError::StaleReading`], leaving the cache untouched. A malformed
    /// cached value counts as no baseline and is overwritten. Every successful
    /// call performs exactly one backend write, even when prices are unchanged.
    pub async fn compare_and_update(
        &self,
        vendor: Vendor,
        reading: PriceReading,
    ) -> Result<ChangeReport, CacheError> {
        if reading.vendor() != vendor {
            return Err(CacheError::VendorMismatch {
                expected: vendor,
                got: reading.vendor(),
            });
        }

        let _guard = self.locks[vendor as usize].lock().await;

        let previous = match self.get_cached(vendor).await {
            Ok(entry) => entry.map(|e| e.last_reading),
            Err(CacheError::MalformedCacheEntry { reason, .. }) => {
                tracing::warn!(
                    vendor = vendor.id(),
                    reason = %reason,
                    "Ignoring malformed cache entry"
                );
                None
            }
            Err(e) => return Err(e),
        };

        if let Some(ref cached) = previous {
            if reading.is_older_than(cached) {
                increment_counter(CounterMetric::StaleReading, vendor);
                return Err(CacheError::StaleReading {
                    vendor,
                    cached: cached.observed_at(),
                    received: reading.observed_at(),
                });
            }
        }

        let entry = CacheEntry::new(reading.clone(), Utc::now());
        self.backend.write(&self.key(vendor), entry.encode()?).await?;

        let report = ChangeReport::between(previous, reading);

        increment_counter(CounterMetric::CacheUpdate, vendor);
        if report.changed {
            increment_counter(CounterMetric::PriceChange, vendor);
        }

        tracing::debug!(
            vendor = vendor.id(),
            changed = report.changed,
            delta_buy = %report.delta_buy,
            delta_sell = %report.delta_sell,
            "Updated price cache"
        );

        Ok(report)
    }

    /// Flush the backend; call at shutdown
    pub async fn close(&self) -> Result<(), CacheError> {
        self.backend.flush().await
    }
}
