//! Check command implementation

use crate::cache::open_cache;
use crate::config::Config;
use crate::monitor::Monitor;
use crate::source::SourceRegistry;
use clap::Args;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Keep checking until interrupted
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between checks in watch mode
    #[arg(long, default_value = "300")]
    pub interval: u64,

    /// Print change reports as JSON instead of a notification
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let registry = SourceRegistry::from_config(config)?;
        if registry.is_empty() {
            anyhow::bail!("No price sources configured");
        }

        let cache = Arc::new(open_cache(&config.cache).await?);
        let monitor = Monitor::new(registry, cache.clone());

        self.run_until(&monitor, tokio::signal::ctrl_c()).await?;

        cache.close().await?;
        Ok(())
    }

    /// Run check cycles until done or `shutdown` resolves
    ///
    /// `shutdown` interrupts both an in-flight check and the wait between
    /// checks. Returns the number of completed checks.
    pub async fn run_until<F: Future>(&self, monitor: &Monitor, shutdown: F) -> anyhow::Result<usize> {
        let interval = Duration::from_secs(self.interval.max(1));
        tokio::pin!(shutdown);

        let mut completed = 0;
        loop {
            let outcome = tokio::select! {
                outcome = monitor.run_once() => outcome,
                _ = &mut shutdown => {
                    tracing::info!("Interrupted during check, stopping");
                    break;
                }
            };
            completed += 1;

            if self.json {
                println!("{}", serde_json::to_string_pretty(&outcome.reports)?);
            } else {
                println!("{}", outcome.render());
            }

            if !self.watch {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Interrupted, stopping");
                    break;
                }
            }
        }

        Ok(completed)
    }
}
