//! Fixed-quote source

use super::PriceSource;
use crate::price::{PriceReading, Vendor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Source returning a preset quote, or a preset failure
pub struct StaticSource {
    vendor: Vendor,
    quote: Result<(Decimal, Decimal), String>,
    observed_at: Option<DateTime<Utc>>,
}

impl StaticSource {
    /// Quote `buy`/`sell`, stamped with the fetch time
    pub fn new(vendor: Vendor, buy: Decimal, sell: Decimal) -> Self {
        Self {
            vendor,
            quote: Ok((buy, sell)),
            observed_at: None,
        }
    }

    /// Always fail with `message`
    pub fn failing(vendor: Vendor, message: impl Into<String>) -> Self {
        Self {
            vendor,
            quote: Err(message.into()),
            observed_at: None,
        }
    }

    /// Pin the observation time instead of using the fetch time
    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = Some(at);
        self
    }
}

#[async_trait]
impl PriceSource for StaticSource {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    async fn fetch(&self) -> anyhow::Result<PriceReading> {
        match &self.quote {
            Ok((buy, sell)) => Ok(PriceReading::new(
                self.vendor,
                *buy,
                *sell,
                self.observed_at.unwrap_or_else(Utc::now),
            )),
            Err(message) => anyhow::bail!("{}: {}", self.vendor, message),
        }
    }
}
