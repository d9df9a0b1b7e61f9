use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use common::{Error, MarketDataProvider, Result};

const BASE_URL: &str = "https://api.binance.com";

/// Per-request timeout. A symbol whose fetch exceeds this fails on its own;
/// sibling fetches keep running.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Market data client for the public Binance klines endpoint.
/// No API key required; only unauthenticated reads are performed.
pub struct BinanceMarketData {
    http: Client,
    base_url: String,
}

impl BinanceMarketData {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .use_rustls_tls()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }
}

impl Default for BinanceMarketData {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for BinanceMarketData {
    async fn closes(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<f64>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.to_string();

        debug!(symbol, timeframe, "Fetching klines");
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", binance_interval(timeframe)),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::MarketData(format!("HTTP {status}: {body}")));
        }

        let rows: Vec<Value> = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        closes_from_klines(&rows)
    }
}

/// Binance accepts a fixed set of interval strings; anything outside the
/// supported timeframes degrades to 1m rather than failing the fetch.
fn binance_interval(timeframe: &str) -> &str {
    match timeframe {
        "1m" | "5m" | "15m" => timeframe,
        _ => "1m",
    }
}

/// Extract closing prices from raw kline rows. Binance encodes each kline
/// as a mixed-type array with the close price as a string at index 4.
fn closes_from_klines(rows: &[Value]) -> Result<Vec<f64>> {
    rows.iter()
        .map(|row| {
            row.get(4)
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| Error::MarketData("malformed kline row".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interval_passes_supported_timeframes_through() {
        assert_eq!(binance_interval("1m"), "1m");
        assert_eq!(binance_interval("5m"), "5m");
        assert_eq!(binance_interval("15m"), "15m");
    }

    #[test]
    fn interval_falls_back_to_one_minute() {
        assert_eq!(binance_interval("4h"), "1m");
        assert_eq!(binance_interval(""), "1m");
    }

    #[test]
    fn closes_parse_from_kline_rows() {
        let rows = vec![
            json!([1700000000000i64, "100.0", "101.0", "99.0", "100.5", "12.3", 1700000059999i64]),
            json!([1700000060000i64, "100.5", "102.0", "100.1", "101.25", "8.8", 1700000119999i64]),
        ];
        let closes = closes_from_klines(&rows).unwrap();
        assert_eq!(closes, vec![100.5, 101.25]);
    }

    #[test]
    fn malformed_kline_row_is_an_error() {
        let rows = vec![json!([1700000000000i64, "100.0"])];
        assert!(closes_from_klines(&rows).is_err());
    }
}
