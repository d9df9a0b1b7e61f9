use async_trait::async_trait;

use crate::Result;

/// Abstraction over the market data source.
///
/// `BinanceMarketData` in `crates/engine` implements this against the public
/// klines endpoint; tests substitute scripted providers. A failed fetch for
/// one symbol must never affect fetches for other symbols.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch up to `limit` closing prices for `symbol`, oldest first and
    /// most recent last.
    async fn closes(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<f64>>;
}
