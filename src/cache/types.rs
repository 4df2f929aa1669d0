//! Cache entry, change report and error types

use crate::price::{PriceReading, Vendor};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Price cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backing store unreachable or I/O failure
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// New reading is older than the cached one
    #[error("Stale reading for {vendor}: observed at {received}, cached at {cached}")]
    StaleReading {
        vendor: Vendor,
        cached: DateTime<Utc>,
        received: DateTime<Utc>,
    },
    /// Stored value could not be decoded
    #[error("Malformed cache entry for {vendor}: {reason}")]
    MalformedCacheEntry { vendor: Vendor, reason: String },
    /// Reading belongs to a different vendor than requested
    #[error("Reading for {got} passed as {expected}")]
    VendorMismatch { expected: Vendor, got: Vendor },
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        CacheError::StorageUnavailable(e.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::StorageUnavailable(e.to_string())
    }
}

/// The last reading persisted for a vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub vendor: Vendor,
    pub last_reading: PriceReading,
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry for `reading`, stamped with `updated_at`
    pub fn new(reading: PriceReading, updated_at: DateTime<Utc>) -> Self {
        Self {
            vendor: reading.vendor(),
            last_reading: reading,
            updated_at,
        }
    }

    /// Decode a stored value, checking it belongs to `vendor`
    pub fn decode(vendor: Vendor, raw: &str) -> Result<Self, CacheError> {
        let entry: CacheEntry =
            serde_json::from_str(raw).map_err(|e| CacheError::MalformedCacheEntry {
                vendor,
                reason: e.to_string(),
            })?;

        if entry.vendor != vendor || entry.last_reading.vendor() != vendor {
            return Err(CacheError::MalformedCacheEntry {
                vendor,
                reason: format!("entry belongs to {}", entry.last_reading.vendor().id()),
            });
        }

        Ok(entry)
    }

    /// Encode for storage
    pub fn encode(&self) -> Result<String, CacheError> {
        serde_json::to_string(self).map_err(|e| CacheError::StorageUnavailable(e.to_string()))
    }
}

/// Difference between a new reading and the cached baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub vendor: Vendor,
    pub previous: Option<PriceReading>,
    pub current: PriceReading,
    pub delta_buy: Decimal,
    pub delta_sell: Decimal,
    pub changed: bool,
}

impl ChangeReport {
    /// Compare `current` against an optional `previous` reading
    ///
    /// Without a baseline the deltas are zero and the report counts as changed.
    pub fn between(previous: Option<PriceReading>, current: PriceReading) -> Self {
        let (delta_buy, delta_sell, changed) = match &previous {
            Some(prev) => {
                let delta_buy = current.buy_price() - prev.buy_price();
                let delta_sell = current.sell_price() - prev.sell_price();
                (
                    delta_buy,
                    delta_sell,
                    !delta_buy.is_zero() || !delta_sell.is_zero(),
                )
            }
            None => (Decimal::ZERO, Decimal::ZERO, true),
        };

        Self {
            vendor: current.vendor(),
            previous,
            current,
            delta_buy,
            delta_sell,
            changed,
        }
    }

    /// Whether this is the first reading seen for the vendor
    pub fn is_first(&self) -> bool {
        self.previous.is_none()
    }
}
