//! Show command implementation

use crate::cache::{open_cache, CacheEntry, CacheError};
use crate::config::Config;
use crate::notify::format_thousands;
use crate::price::Vendor;
use clap::Args;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Only show this vendor
    pub vendor: Option<Vendor>,

    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let cache = open_cache(&config.cache).await?;
        let vendors = match self.vendor {
            Some(vendor) => vec![vendor],
            None => Vendor::ALL.to_vec(),
        };

        let mut entries = Vec::new();
        for vendor in vendors {
            match cache.get_cached(vendor).await {
                Ok(Some(entry)) => {
                    if !self.json {
                        print_entry(&entry);
                    }
                    entries.push(entry);
                }
                Ok(None) => {
                    if !self.json {
                        println!("{:<10} (no cached price)", vendor.display_name());
                    }
                }
                Err(e @ CacheError::MalformedCacheEntry { .. }) => {
                    tracing::warn!(vendor = vendor.id(), error = %e, "Skipping cache entry");
                    if !self.json {
                        println!("{:<10} (unreadable: {})", vendor.display_name(), e);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }

        Ok(())
    }
}

fn print_entry(entry: &CacheEntry) {
    let reading = &entry.last_reading;
    println!(
        "{:<10} mua {:>8}  bán {:>8}  observed {}  updated {}",
        entry.vendor.display_name(),
        format_thousands(reading.buy_price()),
        format_thousands(reading.sell_price()),
        reading.observed_at().to_rfc3339(),
        entry.updated_at.to_rfc3339(),
    );
}
