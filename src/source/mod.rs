//! Price source module
//!
//! Vendor quotes enter through the [`PriceSource`] capability. Sources are
//! looked up by vendor in a [`SourceRegistry`].

mod fixed;
mod http_json;
mod registry;

pub use fixed::StaticSource;
pub use http_json::HttpJsonSource;
pub use registry::SourceRegistry;

use crate::price::{PriceReading, Vendor};
use async_trait::async_trait;

/// Trait for vendor price sources
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Vendor this source quotes
    fn vendor(&self) -> Vendor;
    /// Fetch the vendor's current quote
    async fn fetch(&self) -> anyhow::Result<PriceReading>;
}
