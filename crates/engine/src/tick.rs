use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::{
    ClosedTrade, LedgerStore, MarketDataProvider, OpenTrade, OrderSide, Result, RiskConfig,
    Summary, TickResult, TradeMode,
};
use ledger::{summary, TradeLedger};
use strategy::{CrossoverSignal, SmaCrossover};

/// Closing prices requested per symbol; comfortably more than the 61 bars
/// the default crossover windows need.
const KLINE_LIMIT: usize = 80;

/// Minimum headroom before a new position is admitted. Blocks dust
/// positions when the effective limit is almost exhausted.
const DUST_EPSILON: f64 = 1e-6;

/// The tick orchestrator.
///
/// One call to [`run_tick`](Self::run_tick) is one pass through
/// fetch → decide → settle. Fetches fan out concurrently; all decisions run
/// sequentially on the joined results; the settled ledger is persisted in a
/// single store call. Ticks and manual ledger operations serialize on an
/// internal lock, so the ledger is owned exclusively for the duration of
/// each mutation.
pub struct TickEngine {
    market: Arc<dyn MarketDataProvider>,
    store: Arc<dyn LedgerStore>,
    signal: SmaCrossover,
    /// Exclusive ownership of the ledger. The guarded value is the
    /// completion time of the last settled tick.
    tick_lock: Mutex<Option<DateTime<Utc>>>,
}

impl TickEngine {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        store: Arc<dyn LedgerStore>,
        signal: SmaCrossover,
    ) -> Self {
        Self {
            market,
            store,
            signal,
            tick_lock: Mutex::new(None),
        }
    }

    /// Completion time of the last settled tick, if any tick has settled
    /// since startup.
    pub async fn last_tick(&self) -> Option<DateTime<Utc>> {
        *self.tick_lock.lock().await
    }

    /// Run one tick over all allowed symbols.
    ///
    /// Per-symbol fetch failures are collected into the result's `errors`
    /// and never abort the tick. Ledger invariant violations and
    /// persistence failures propagate as `Err`; the tick does not report
    /// success without a durable save.
    pub async fn run_tick(&self, config: &RiskConfig) -> Result<TickResult> {
        let mut last_tick = self.tick_lock.lock().await;

        if config.trade_mode != TradeMode::Paper {
            debug!(mode = %config.trade_mode, "Tick skipped: not in paper mode");
            return Ok(TickResult::no_op("mode is not paper"));
        }
        let symbols = &config.allowed_symbols;
        if symbols.is_empty() {
            debug!("Tick skipped: no allowed symbols");
            return Ok(TickResult::no_op("no symbols"));
        }

        // ── Fetch ─────────────────────────────────────────────────────────
        // One concurrent request per symbol. Each carries its own timeout;
        // a failure is recorded against its symbol only.
        let fetches = symbols.iter().map(|symbol| {
            let market = Arc::clone(&self.market);
            let symbol = symbol.clone();
            let timeframe = config.timeframe.clone();
            async move {
                let result = market.closes(&symbol, &timeframe, KLINE_LIMIT).await;
                (symbol, result)
            }
        });
        let fetched = join_all(fetches).await;

        let mut book = TradeLedger::new(
            self.store.load_open().await?,
            self.store.load_closed().await?,
        );
        let mut exposure = self.store.load_exposure().await?;

        // ── Decide ────────────────────────────────────────────────────────
        // Strictly sequential, in fetch-result order: every open must see
        // the headroom left by the opens and closes before it.
        let mut errors: Vec<String> = Vec::new();
        let mut opened = 0usize;
        let mut closed = 0usize;
        let mut limit = risk::effective_limit(config, &exposure);

        for (symbol, result) in fetched {
            let prices = match result {
                Ok(prices) => prices,
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Price fetch failed");
                    errors.push(format!("{symbol}: {e}"));
                    continue;
                }
            };

            let signal = match self.signal.compute(&prices) {
                Some(signal) => signal,
                None => continue, // insufficient history, not an error
            };
            let Some(&price) = prices.last() else { continue };
            if price <= 0.0 {
                errors.push(format!("{symbol}: non-positive close price"));
                continue;
            }

            match signal {
                CrossoverSignal::Bearish => {
                    // Long-only: a bearish cross closes an existing BUY
                    // position and is otherwise ignored. No short is opened.
                    let holds_long = book
                        .position(&symbol)
                        .map(|t| t.side == OrderSide::Buy)
                        .unwrap_or(false);
                    if holds_long {
                        let trade = book.close_position(&symbol, price, Utc::now())?;
                        risk::apply_close(
                            &mut exposure,
                            trade.pnl_usdc,
                            config.reinvest_profit_pct,
                            config.auto_adjust_exposure,
                        );
                        limit = risk::effective_limit(config, &exposure);
                        closed += 1;
                    }
                }
                CrossoverSignal::Bullish => {
                    if book.position(&symbol).is_some() {
                        continue;
                    }
                    if book.open_count() >= config.max_open_positions as usize {
                        debug!(symbol = %symbol, "Buy skipped: position cap reached");
                        continue;
                    }
                    let remaining = limit - book.current_exposure();
                    if remaining <= DUST_EPSILON {
                        debug!(symbol = %symbol, remaining, "Buy skipped: no exposure headroom");
                        continue;
                    }
                    let notional = config.max_position_size_usdc.min(remaining);
                    let qty = qty_from_notional(notional, price);
                    book.open_position(&symbol, qty, price, notional)?;
                    opened += 1;
                }
                CrossoverSignal::Neutral => {}
            }
        }

        // ── Settle ────────────────────────────────────────────────────────
        let now = Utc::now();
        let summary = summary::compute(
            book.closed(),
            book.open_count(),
            config,
            &exposure,
            now,
            Some(now),
        );
        self.store
            .save(book.open(), book.closed(), &exposure, &summary)
            .await?;
        *last_tick = Some(now);

        info!(
            processed = symbols.len(),
            opened,
            closed,
            errors = errors.len(),
            effective_limit = summary.effective_max_usdc_exposure,
            "Tick settled"
        );

        Ok(TickResult {
            processed: symbols.len(),
            opened,
            closed,
            errors,
            effective_limit_usdc: summary.effective_max_usdc_exposure,
            open_now: book.open_count(),
            last_tick_time: Some(now),
        })
    }

    /// Record a position by hand, bypassing the signal but not the ledger
    /// invariants. Serializes with ticks on the same lock.
    pub async fn manual_open(
        &self,
        symbol: &str,
        qty: f64,
        entry_price: f64,
        notional_usdc: Option<f64>,
        config: &RiskConfig,
    ) -> Result<OpenTrade> {
        let last_tick = self.tick_lock.lock().await;

        let mut book = TradeLedger::new(
            self.store.load_open().await?,
            self.store.load_closed().await?,
        );
        let exposure = self.store.load_exposure().await?;

        let symbol = symbol.to_uppercase();
        let notional = notional_usdc.unwrap_or(qty * entry_price);
        let trade = book.open_position(&symbol, qty, entry_price, notional)?.clone();

        let summary = summary::compute(
            book.closed(),
            book.open_count(),
            config,
            &exposure,
            Utc::now(),
            *last_tick,
        );
        self.store
            .save(book.open(), book.closed(), &exposure, &summary)
            .await?;
        Ok(trade)
    }

    /// Close a position by hand at the given price. Feeds the realized PnL
    /// into the exposure accountant exactly like a signal-driven close.
    pub async fn manual_close(
        &self,
        symbol: &str,
        exit_price: f64,
        config: &RiskConfig,
    ) -> Result<ClosedTrade> {
        let last_tick = self.tick_lock.lock().await;

        let mut book = TradeLedger::new(
            self.store.load_open().await?,
            self.store.load_closed().await?,
        );
        let mut exposure = self.store.load_exposure().await?;

        let symbol = symbol.to_uppercase();
        let trade = book.close_position(&symbol, exit_price, Utc::now())?;
        risk::apply_close(
            &mut exposure,
            trade.pnl_usdc,
            config.reinvest_profit_pct,
            config.auto_adjust_exposure,
        );

        let summary = summary::compute(
            book.closed(),
            book.open_count(),
            config,
            &exposure,
            Utc::now(),
            *last_tick,
        );
        self.store
            .save(book.open(), book.closed(), &exposure, &summary)
            .await?;
        Ok(trade)
    }

    /// Zero the accumulated exposure adjustment. This is the only way the
    /// adjustment ever resets.
    pub async fn reset_adjustment(&self, config: &RiskConfig) -> Result<Summary> {
        let last_tick = self.tick_lock.lock().await;

        let book = TradeLedger::new(
            self.store.load_open().await?,
            self.store.load_closed().await?,
        );
        let mut exposure = self.store.load_exposure().await?;
        exposure.adjustment_usdc = 0.0;

        let summary = summary::compute(
            book.closed(),
            book.open_count(),
            config,
            &exposure,
            Utc::now(),
            *last_tick,
        );
        self.store
            .save(book.open(), book.closed(), &exposure, &summary)
            .await?;
        info!("Exposure adjustment reset");
        Ok(summary)
    }
}

fn qty_from_notional(notional: f64, price: f64) -> f64 {
    (notional / price * 1e8).round() / 1e8
}

// ─── Tests ────────────────────────────────────────────────────────────────────
