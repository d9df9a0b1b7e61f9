/// Process-level configuration loaded from environment variables at startup.
/// Everything has a sensible default; the risk/symbol configuration lives in
/// the settings store instead (see `SettingsStore`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer token required on mutating API routes. Unset = open access.
    pub api_token: Option<String>,
    pub port: u16,
    /// Directory holding the JSON ledger and settings files.
    pub data_dir: String,
    pub quote_asset: String,
    /// Optional TOML file overriding the crossover window lengths.
    pub signal_config_path: String,
    /// Built-in tick cadence in seconds; 0 disables the internal ticker and
    /// leaves scheduling to whoever calls POST /tick.
    pub tick_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables, reading `.env` if
    /// present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        AppConfig {
            api_token: optional_env("APP_TOKEN"),
            port: optional_env("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            data_dir: optional_env("DATA_DIR").unwrap_or_else(|| "db".to_string()),
            quote_asset: optional_env("QUOTE_ASSET").unwrap_or_else(|| "USDC".to_string()),
            signal_config_path: optional_env("SIGNAL_CONFIG_PATH")
                .unwrap_or_else(|| "config/signal.toml".to_string()),
            tick_interval_secs: optional_env("TICK_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
