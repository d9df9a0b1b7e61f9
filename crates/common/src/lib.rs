pub mod config;
pub mod error;
pub mod market;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use market::MarketDataProvider;
pub use store::{LedgerStore, SettingsStore};
pub use types::*;
