//! Integration tests for the price cache over the file backend

use chrono::{DateTime, TimeZone, Utc};
use gia_vang::cache::{open_cache, CacheError, FileBackend, PriceCache};
use gia_vang::config::{CacheBackendKind, CacheConfig, RedisConfig};
use gia_vang::price::{PriceReading, Vendor};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tempfile::TempDir;

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()
}

fn reading(vendor: Vendor, buy: Decimal, sell: Decimal, minute: u32) -> PriceReading {
    PriceReading::new(vendor, buy, sell, at(minute))
}

async fn file_cache(dir: &TempDir) -> PriceCache {
    let backend = FileBackend::open(dir.path().join("last_prices.json"))
        .await
        .unwrap();
    PriceCache::new(Arc::new(backend))
}

#[tokio::test]
async fn test_sjc_example_over_file_backend() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(&dir).await;

    let first = cache
        .compare_and_update(Vendor::Sjc, reading(Vendor::Sjc, dec!(74000000), dec!(76000000), 0))
        .await
        .unwrap();
    assert!(first.changed);
    assert!(first.previous.is_none());

    let second = cache
        .compare_and_update(Vendor::Sjc, reading(Vendor::Sjc, dec!(74500000), dec!(76000000), 5))
        .await
        .unwrap();
    assert_eq!(second.delta_buy, dec!(500000));
    assert_eq!(second.delta_sell, dec!(0));
    assert!(second.changed);
}

#[tokio::test]
async fn test_entries_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let r1 = reading(Vendor::Doji, dec!(7400000), dec!(7550000), 0);

    {
        let cache = file_cache(&dir).await;
        cache.compare_and_update(Vendor::Doji, r1.clone()).await.unwrap();
        cache.close().await.unwrap();
    }

    let cache = file_cache(&dir).await;
    let entry = cache.get_cached(Vendor::Doji).await.unwrap().unwrap();
    assert_eq!(entry.vendor, Vendor::Doji);
    assert_eq!(entry.last_reading, r1);

    let report = cache
        .compare_and_update(Vendor::Doji, reading(Vendor::Doji, dec!(7400000), dec!(7550000), 1))
        .await
        .unwrap();
    assert_eq!(report.previous, Some(r1));
    assert!(!report.changed);
}

#[tokio::test]
async fn test_stale_reading_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last_prices.json");
    let cache = file_cache(&dir).await;

    cache
        .compare_and_update(Vendor::Pnj, reading(Vendor::Pnj, dec!(1), dec!(2), 30))
        .await
        .unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let err = cache
        .compare_and_update(Vendor::Pnj, reading(Vendor::Pnj, dec!(5), dec!(6), 10))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::StaleReading { .. }));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    let entry = cache.get_cached(Vendor::Pnj).await.unwrap().unwrap();
    assert_eq!(entry.last_reading.observed_at(), at(30));
}

#[tokio::test]
async fn test_malformed_file_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last_prices.json");
    std::fs::write(
        &path,
        r#"{"gold:last:sjc": {"SJC nhẫn 9999": {"buy": 74000000, "sell": 76000000}}}"#,
    )
    .unwrap();

    let cache = file_cache(&dir).await;
    assert!(matches!(
        cache.get_cached(Vendor::Sjc).await,
        Err(CacheError::MalformedCacheEntry { vendor: Vendor::Sjc, .. })
    ));

    let report = cache
        .compare_and_update(Vendor::Sjc, reading(Vendor::Sjc, dec!(74000000), dec!(76000000), 0))
        .await
        .unwrap();
    assert!(report.previous.is_none());
    assert!(cache.get_cached(Vendor::Sjc).await.unwrap().is_some());
}

#[tokio::test]
async fn test_concurrent_vendors_share_one_file() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(file_cache(&dir).await);

    let handles: Vec<_> = Vendor::ALL
        .into_iter()
        .map(|vendor| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .compare_and_update(vendor, reading(vendor, dec!(100), dec!(200), 0))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let reopened = file_cache(&dir).await;
    for vendor in Vendor::ALL {
        assert!(reopened.get_cached(vendor).await.unwrap().is_some());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_vendor_never_regresses() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(file_cache(&dir).await);

    let handles: Vec<_> = (0..30u32)
        .rev()
        .map(|minute| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let r = reading(Vendor::PhuQuy, Decimal::from(minute), dec!(1), minute);
                cache.compare_and_update(Vendor::PhuQuy, r).await
            })
        })
        .collect();

    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) | Err(CacheError::StaleReading { .. }) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    let entry = cache.get_cached(Vendor::PhuQuy).await.unwrap().unwrap();
    assert_eq!(entry.last_reading.observed_at(), at(29));
}

#[tokio::test]
async fn test_unreachable_redis_falls_back_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fallback.json");
    let config = CacheConfig {
        backend: CacheBackendKind::Redis,
        path: path.clone(),
        redis: RedisConfig {
            host: Some("127.0.0.1".to_string()),
            port: 1,
            timeout_secs: 2,
            ..RedisConfig::default()
        },
        ..CacheConfig::default()
    };

    let cache = open_cache(&config).await.unwrap();
    cache
        .compare_and_update(Vendor::Doji, reading(Vendor::Doji, dec!(7400000), dec!(7550000), 0))
        .await
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("gold:last:doji"));
}
