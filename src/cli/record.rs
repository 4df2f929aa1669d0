//! Record command implementation

use crate::cache::open_cache;
use crate::config::Config;
use crate::notify;
use crate::price::{PriceReading, Vendor};
use chrono::{DateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Vendor (sjc, doji, pnj, phu_quy, ngoc_tham)
    pub vendor: Vendor,

    /// Buy price in VND per chỉ
    #[arg(long)]
    pub buy: Decimal,

    /// Sell price in VND per chỉ
    #[arg(long)]
    pub sell: Decimal,

    /// Observation time (RFC 3339), defaults to now
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

impl RecordArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let cache = open_cache(&config.cache).await?;
        let observed_at = self.at.unwrap_or_else(Utc::now);
        let reading = PriceReading::new(self.vendor, self.buy, self.sell, observed_at);

        let report = cache.compare_and_update(self.vendor, reading).await?;
        cache.close().await?;

        println!("{}", notify::render(&[report], &[], Utc::now()));
        Ok(())
    }
}
