//! Vendor → source lookup table

use super::{HttpJsonSource, PriceSource};
use crate::config::Config;
use crate::price::{PriceReading, Vendor};
use futures_util::future::join_all;
use std::collections::BTreeMap;

/// Registered price sources, at most one per vendor
#[derive(Default)]
pub struct SourceRegistry {
    sources: BTreeMap<Vendor, Box<dyn PriceSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP sources for every `[[sources]]` entry
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut registry = Self::new();
        for source in &config.sources {
            let vendor = source.vendor;
            if registry
                .register(Box::new(HttpJsonSource::new(source.clone(), &config.fetch)?))
                .is_some()
            {
                tracing::warn!(vendor = vendor.id(), "Duplicate source, keeping the last one");
            }
        }
        Ok(registry)
    }

    /// Register a source, returning the one it replaces
    pub fn register(&mut self, source: Box<dyn PriceSource>) -> Option<Box<dyn PriceSource>> {
        self.sources.insert(source.vendor(), source)
    }

    pub fn get(&self, vendor: Vendor) -> Option<&dyn PriceSource> {
        self.sources.get(&vendor).map(|s| s.as_ref())
    }

    /// Registered vendors in priority order
    pub fn vendors(&self) -> Vec<Vendor> {
        self.sources.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fetch the current quote for `vendor`
    pub async fn fetch(&self, vendor: Vendor) -> anyhow::Result<PriceReading> {
        let source = self
            .get(vendor)
            .ok_or_else(|| anyhow::anyhow!("No source registered for {}", vendor))?;
        source.fetch().await
    }

    /// Fetch every registered source concurrently, in vendor order
    pub async fn fetch_all(&self) -> Vec<(Vendor, anyhow::Result<PriceReading>)> {
        let results = join_all(self.sources.values().map(|s| s.fetch())).await;
        self.sources.keys().copied().zip(results).collect()
    }
}
