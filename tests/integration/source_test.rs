//! Integration tests for HTTP price sources against a local server

use gia_vang::config::{Config, FetchConfig, SourceConfig};
use gia_vang::price::Vendor;
use gia_vang::source::{HttpJsonSource, PriceSource, SourceRegistry};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `responses` in order, one per connection, then stop
pub async fn serve(responses: Vec<(u16, Vec<u8>)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;

            let head = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{}/prices", addr)
}

pub fn pnj_body() -> Vec<u8> {
    br#"{"data":[{"masp":"TL","giamua":"7.380","giaban":"7.530"},{"masp":"N24K","giamua":"7.400","giaban":"7.550"}]}"#
        .to_vec()
}

fn pnj_config(url: String) -> SourceConfig {
    let mut filter = BTreeMap::new();
    filter.insert("masp".to_string(), "N24K".to_string());
    SourceConfig {
        vendor: Vendor::Pnj,
        url,
        items: Some("/data".to_string()),
        filter,
        buy: "/giamua".to_string(),
        sell: "/giaban".to_string(),
        scale: dec!(1000),
    }
}

#[tokio::test]
async fn test_fetch_from_server() {
    let url = serve(vec![(200, pnj_body())]).await;
    let source = HttpJsonSource::new(pnj_config(url), &FetchConfig::default()).unwrap();

    let reading = source.fetch().await.unwrap();
    assert_eq!(reading.vendor(), Vendor::Pnj);
    assert_eq!(reading.buy_price(), dec!(7400000));
    assert_eq!(reading.sell_price(), dec!(7550000));
}

#[tokio::test]
async fn test_fetch_strips_bom() {
    let mut body = vec![0xEF, 0xBB, 0xBF];
    body.extend(pnj_body());
    let url = serve(vec![(200, body)]).await;
    let source = HttpJsonSource::new(pnj_config(url), &FetchConfig::default()).unwrap();

    assert_eq!(source.fetch().await.unwrap().buy_price(), dec!(7400000));
}

#[tokio::test]
async fn test_fetch_retries_server_errors() {
    let url = serve(vec![(503, b"{}".to_vec()), (200, pnj_body())]).await;
    let fetch = FetchConfig {
        max_attempts: 2,
        ..FetchConfig::default()
    };
    let source = HttpJsonSource::new(pnj_config(url), &fetch).unwrap();

    assert_eq!(source.fetch().await.unwrap().sell_price(), dec!(7550000));
}

#[tokio::test]
async fn test_fetch_gives_up_after_max_attempts() {
    let url = serve(vec![(500, b"{}".to_vec()), (200, pnj_body())]).await;
    let fetch = FetchConfig {
        max_attempts: 1,
        ..FetchConfig::default()
    };
    let source = HttpJsonSource::new(pnj_config(url), &fetch).unwrap();

    assert!(source.fetch().await.is_err());
}

#[tokio::test]
async fn test_registry_fetch_by_vendor() {
    let url = serve(vec![(200, pnj_body())]).await;
    let toml = format!(
        r#"
        [[sources]]
        vendor = "pnj"
        url = "{}"
        items = "/data"
        filter = {{ masp = "N24K" }}
        buy = "/giamua"
        sell = "/giaban"
        scale = 1000
        "#,
        url
    );
    let config = Config::parse(&toml).unwrap();
    let registry = SourceRegistry::from_config(&config).unwrap();

    let reading = registry.fetch(Vendor::Pnj).await.unwrap();
    assert_eq!(reading.buy_price(), dec!(7400000));
}
