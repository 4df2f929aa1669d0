//! Price reading types

use super::Vendor;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A timestamped buy/sell quote from one vendor, in VND per chỉ
///
/// Readings are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    vendor: Vendor,
    buy_price: Decimal,
    sell_price: Decimal,
    observed_at: DateTime<Utc>,
}

impl PriceReading {
    /// Create a new reading
    pub fn new(
        vendor: Vendor,
        buy_price: Decimal,
        sell_price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            vendor,
            buy_price,
            sell_price,
            observed_at,
        }
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Price the vendor pays when buying gold back
    pub fn buy_price(&self) -> Decimal {
        self.buy_price
    }

    /// Price the vendor sells gold at
    pub fn sell_price(&self) -> Decimal {
        self.sell_price
    }

    /// When the quote was observed
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Whether this reading was observed strictly before `other`
    pub fn is_older_than(&self, other: &PriceReading) -> bool {
        self.observed_at < other.observed_at
    }
}
