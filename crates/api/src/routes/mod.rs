mod health;
mod settings;
mod tick;
mod trades;

pub use health::health_router;
pub use settings::settings_router;
pub use tick::tick_router;
pub use trades::{manual_trade_router, trades_router};
