//! Generic JSON-over-HTTP price source
//!
//! Fetches a JSON document, optionally selects one element of an array by
//! field equality, and reads buy/sell prices through JSON pointers.

use super::PriceSource;
use crate::config::{FetchConfig, SourceConfig};
use crate::price::{PriceReading, Vendor};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::time::Duration;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Price source backed by a JSON HTTP endpoint
pub struct HttpJsonSource {
    config: SourceConfig,
    client: Client,
    max_attempts: u32,
}

impl HttpJsonSource {
    /// Create a source with its own HTTP client
    pub fn new(config: SourceConfig, fetch: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()?;

        Ok(Self::with_client(config, client, fetch.max_attempts))
    }

    /// Create a source sharing an existing HTTP client
    pub fn with_client(config: SourceConfig, client: Client, max_attempts: u32) -> Self {
        Self {
            config,
            client,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Fetch the document, retrying transport and status failures
    async fn request_json(&self) -> anyhow::Result<JsonValue> {
        let mut last_err = None;

        for attempt in 1..=self.max_attempts {
            match self.request_once().await {
                Ok(doc) => return Ok(doc),
                Err(e) => {
                    tracing::debug!(
                        vendor = self.config.vendor.id(),
                        attempt,
                        error = %e,
                        "Price request failed"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("no request attempted")))
    }

    async fn request_once(&self) -> anyhow::Result<JsonValue> {
        let response = self.client.get(&self.config.url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned {}", self.config.url, response.status());
        }

        let body = response.bytes().await?;
        let body = body.strip_prefix(UTF8_BOM).unwrap_or(&body[..]);
        Ok(serde_json::from_slice(body)?)
    }

    /// Extract (buy, sell) from a fetched document
    pub fn extract(&self, doc: &JsonValue) -> anyhow::Result<(Decimal, Decimal)> {
        let item = self.select_item(doc)?;
        let buy = self.read_price(item, &self.config.buy)?;
        let sell = self.read_price(item, &self.config.sell)?;
        Ok((buy, sell))
    }

    fn select_item<'a>(&self, doc: &'a JsonValue) -> anyhow::Result<&'a JsonValue> {
        let Some(ref pointer) = self.config.items else {
            return Ok(doc);
        };

        let items = doc
            .pointer(pointer)
            .and_then(JsonValue::as_array)
            .ok_or_else(|| anyhow::anyhow!("No item array at {}", pointer))?;

        items
            .iter()
            .find(|item| self.matches_filter(item))
            .ok_or_else(|| anyhow::anyhow!("No item matching {:?}", self.config.filter))
    }

    fn matches_filter(&self, item: &JsonValue) -> bool {
        self.config.filter.iter().all(|(field, expected)| match item.get(field) {
            Some(JsonValue::String(s)) => s == expected,
            Some(other) => other.to_string() == *expected,
            None => false,
        })
    }

    fn read_price(&self, item: &JsonValue, pointer: &str) -> anyhow::Result<Decimal> {
        let raw = item
            .pointer(pointer)
            .ok_or_else(|| anyhow::anyhow!("Missing price at {}", pointer))?;

        let price = parse_price(raw)
            .ok_or_else(|| anyhow::anyhow!("Unparseable price at {}: {}", pointer, raw))?;

        let scaled = (price * self.config.scale)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);

        if scaled <= Decimal::ZERO {
            anyhow::bail!("Non-positive price at {}: {}", pointer, raw);
        }

        Ok(scaled)
    }
}

/// Parse a JSON price
///
/// Strings are stripped of everything but digits, so `"74,500"` and
/// `"74.500"` both read as 74500.
fn parse_price(value: &JsonValue) -> Option<Decimal> {
    match value {
        JsonValue::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        JsonValue::String(s) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return None;
            }
            Decimal::from_str(&digits).ok()
        }
        _ => None,
    }
}

#[async_trait]
impl PriceSource for HttpJsonSource {
    fn vendor(&self) -> Vendor {
        self.config.vendor
    }

    async fn fetch(&self) -> anyhow::Result<PriceReading> {
        let doc = self.request_json().await?;
        let (buy, sell) = self.extract(&doc)?;

        tracing::info!(
            vendor = self.config.vendor.id(),
            buy = %buy,
            sell = %sell,
            "Fetched price"
        );

        Ok(PriceReading::new(self.config.vendor, buy, sell, Utc::now()))
    }
}
