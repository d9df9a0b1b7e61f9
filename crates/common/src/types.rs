use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side of a trade. The engine is long-only: positions are always opened
/// with `Buy`; `Sell` only ever appears as a closing signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Whether the bot simulates fills or would trade against the real venue.
/// Live execution is not implemented; any mode other than `Paper` turns a
/// tick into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeMode {
    Paper,
    Live,
}

impl std::fmt::Display for TradeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeMode::Paper => write!(f, "paper"),
            TradeMode::Live => write!(f, "live"),
        }
    }
}

impl Default for TradeMode {
    fn default() -> Self {
        TradeMode::Paper
    }
}

/// An open position held by the paper ledger.
/// At most one open trade may exist per symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenTrade {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub qty: f64,
    pub entry_price: f64,
    pub notional_usdc: f64,
    pub entry_time: DateTime<Utc>,
}

/// A settled position. Immutable once created; appended to history and
/// never touched again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub qty: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub notional_usdc: f64,
    pub pnl_usdc: f64,
    pub pnl_pct: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub duration_sec: f64,
}

/// Accumulated exposure feedback. The base limit lives in [`RiskConfig`];
/// the effective limit is always derived (`risk::effective_limit`), never
/// stored. Mutated only by the exposure accountant on trade close, or by
/// the explicit reset operation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExposureState {
    #[serde(default)]
    pub adjustment_usdc: f64,
}

/// Risk and symbol configuration, stored in the settings file and editable
/// through the API. Read-only to the tick engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub trade_mode: TradeMode,
    #[serde(default)]
    pub allowed_symbols: Vec<String>,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: u32,
    #[serde(default = "default_max_position_size")]
    pub max_position_size_usdc: f64,
    #[serde(default = "default_max_exposure")]
    pub max_usdc_exposure: f64,
    #[serde(default)]
    pub reinvest_profit_pct: f64,
    #[serde(default = "default_true")]
    pub auto_adjust_exposure: bool,
}

fn default_timeframe() -> String {
    "1m".to_string()
}

fn default_max_open_positions() -> u32 {
    1
}

fn default_max_position_size() -> f64 {
    25.0
}

fn default_max_exposure() -> f64 {
    100.0
}

fn default_true() -> bool {
    true
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            trade_mode: TradeMode::Paper,
            allowed_symbols: Vec::new(),
            timeframe: default_timeframe(),
            max_open_positions: default_max_open_positions(),
            max_position_size_usdc: default_max_position_size(),
            max_usdc_exposure: default_max_exposure(),
            reinvest_profit_pct: 0.0,
            auto_adjust_exposure: true,
        }
    }
}

impl RiskConfig {
    /// Uppercase all symbols. Applied at the store boundary so the rest of
    /// the system can compare symbols verbatim.
    pub fn normalized(mut self) -> Self {
        for symbol in &mut self.allowed_symbols {
            *symbol = symbol.to_uppercase();
        }
        self
    }
}

/// Derived portfolio statistics. A pure projection of the closed-trade
/// history plus the exposure state; recomputed wholesale after every
/// mutation and therefore always equal to a fresh recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub open_count: usize,
    pub closed_count: usize,
    pub realized_pnl_usdc_total: f64,
    pub realized_pnl_usdc_today: f64,
    pub win_rate: f64,
    pub avg_pnl_usdc: f64,
    pub max_drawdown_usdc: f64,
    pub base_exposure_usdc: f64,
    pub adjustment_usdc: f64,
    pub effective_max_usdc_exposure: f64,
    pub reinvest_profit_pct: f64,
    #[serde(default)]
    pub last_tick_time: Option<DateTime<Utc>>,
}

/// Outcome of one tick, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickResult {
    pub processed: usize,
    pub opened: usize,
    pub closed: usize,
    pub errors: Vec<String>,
    pub effective_limit_usdc: f64,
    pub open_now: usize,
    #[serde(default)]
    pub last_tick_time: Option<DateTime<Utc>>,
}

impl TickResult {
    /// A tick that performed no work (missing settings, no symbols, or a
    /// non-paper trade mode). Reported, not raised.
    pub fn no_op(reason: impl Into<String>) -> Self {
        Self {
            processed: 0,
            opened: 0,
            closed: 0,
            errors: vec![reason.into()],
            effective_limit_usdc: 0.0,
            open_now: 0,
            last_tick_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_config_defaults_match_documented_values() {
        let cfg = RiskConfig::default();
        assert_eq!(cfg.trade_mode, TradeMode::Paper);
        assert_eq!(cfg.max_open_positions, 1);
        assert_eq!(cfg.max_position_size_usdc, 25.0);
        assert_eq!(cfg.max_usdc_exposure, 100.0);
        assert_eq!(cfg.reinvest_profit_pct, 0.0);
        assert!(cfg.auto_adjust_exposure);
        assert!(cfg.allowed_symbols.is_empty());
        assert_eq!(cfg.timeframe, "1m");
    }

    #[test]
    fn risk_config_deserializes_from_partial_json() {
        let cfg: RiskConfig =
            serde_json::from_str(r#"{"allowed_symbols": ["btcusdc"]}"#).unwrap();
        let cfg = cfg.normalized();
        assert_eq!(cfg.allowed_symbols, vec!["BTCUSDC"]);
        assert_eq!(cfg.max_usdc_exposure, 100.0);
    }

    #[test]
    fn order_side_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), r#""BUY""#);
        assert_eq!(OrderSide::Sell.to_string(), "SELL");
    }

    #[test]
    fn no_op_tick_result_carries_reason() {
        let result = TickResult::no_op("no settings");
        assert_eq!(result.processed, 0);
        assert_eq!(result.errors, vec!["no settings".to_string()]);
    }
}
