//! End-to-end integration tests

use gia_vang::cache::open_cache;
use gia_vang::config::Config;
use gia_vang::monitor::Monitor;
use gia_vang::price::Vendor;
use gia_vang::source::SourceRegistry;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tempfile::TempDir;

use crate::source_test::{pnj_body, serve};

fn config_for(url: &str, cache_path: &std::path::Path) -> Config {
    let toml = format!(
        r#"
        [cache]
        backend = "file"
        path = "{}"

        [fetch]
        timeout_secs = 5
        max_attempts = 1

        [[sources]]
        vendor = "pnj"
        url = "{}"
        items = "/data"
        filter = {{ masp = "N24K" }}
        buy = "/giamua"
        sell = "/giaban"
        scale = 1000

        [[sources]]
        vendor = "doji"
        url = "http://127.0.0.1:1/unreachable"
        buy = "/buy"
        sell = "/sell"
        "#,
        cache_path.display(),
        url
    );
    Config::parse(&toml).unwrap()
}

#[tokio::test]
async fn test_check_cycle_end_to_end() {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("last_prices.json");

    let moved = br#"{"data":[{"masp":"N24K","giamua":"7.450","giaban":"7.550"}]}"#.to_vec();
    let url = serve(vec![(200, pnj_body()), (200, moved)]).await;
    let config = config_for(&url, &cache_path);

    let cache = Arc::new(open_cache(&config.cache).await.unwrap());
    let monitor = Monitor::new(SourceRegistry::from_config(&config).unwrap(), cache.clone());

    let first = monitor.run_once().await;
    assert_eq!(first.reports.len(), 1);
    assert!(first.reports[0].is_first());
    assert_eq!(first.failures.len(), 1);
    assert_eq!(first.failures[0].0, Vendor::Doji);

    let second = monitor.run_once().await;
    assert_eq!(second.reports[0].delta_buy, dec!(50000));
    assert_eq!(second.reports[0].delta_sell, dec!(0));

    let text = second.render();
    assert!(text.contains("7.450 (+50)"));
    assert!(text.contains("7.550 (0)"));
    assert!(text.contains("- Doji:"));

    cache.close().await.unwrap();
    assert!(cache_path.exists());
}

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();
    assert_eq!(config.cache.key_prefix, "gold:last");
    assert_eq!(config.sources.len(), 2);
}
