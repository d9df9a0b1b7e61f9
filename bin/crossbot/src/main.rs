use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use common::{AppConfig, LedgerStore, SettingsStore};
use engine::{BinanceMarketData, TickEngine};
use ledger::JsonStore;
use strategy::{SignalFileConfig, SmaCrossover};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = AppConfig::from_env();
    info!(data_dir = %cfg.data_dir, quote = %cfg.quote_asset, "CrossBot starting");

    // ── Stores ────────────────────────────────────────────────────────────────
    let store = Arc::new(JsonStore::new(&cfg.data_dir)?);
    let ledger_store: Arc<dyn LedgerStore> = store.clone();
    let settings_store: Arc<dyn SettingsStore> = store;

    // ── Signal parameters ─────────────────────────────────────────────────────
    let signal_cfg = SignalFileConfig::load(&cfg.signal_config_path);
    let signal = SmaCrossover::new(signal_cfg.crossover.fast, signal_cfg.crossover.slow);

    // ── Engine ────────────────────────────────────────────────────────────────
    let market = Arc::new(BinanceMarketData::new());
    let engine = Arc::new(TickEngine::new(market, ledger_store.clone(), signal));

    // ── Built-in ticker (optional; POST /tick remains the external trigger) ──
    if cfg.tick_interval_secs > 0 {
        info!(interval_secs = cfg.tick_interval_secs, "Internal ticker enabled");
        let tick_engine = engine.clone();
        let tick_settings = settings_store.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(cfg.tick_interval_secs));
            loop {
                interval.tick().await;
                match tick_settings.load().await {
                    Ok(Some(config)) => match tick_engine.run_tick(&config).await {
                        Ok(result) => info!(
                            processed = result.processed,
                            opened = result.opened,
                            closed = result.closed,
                            errors = result.errors.len(),
                            "Tick complete"
                        ),
                        Err(e) => error!(error = %e, "Tick failed"),
                    },
                    Ok(None) => debug!("No settings saved yet; tick skipped"),
                    Err(e) => error!(error = %e, "Failed to load settings"),
                }
            }
        });
    }

    // ── API ───────────────────────────────────────────────────────────────────
    let state = api::AppState {
        engine,
        settings: settings_store,
        store: ledger_store,
        api_token: cfg.api_token.clone(),
        quote_asset: cfg.quote_asset.clone(),
        started_at: Instant::now(),
    };
    api::serve(state, cfg.port).await;

    Ok(())
}
