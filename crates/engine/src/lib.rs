pub mod binance;
pub mod tick;

pub use binance::BinanceMarketData;
pub use tick::TickEngine;
