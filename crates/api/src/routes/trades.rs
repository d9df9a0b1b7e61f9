use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use common::{ClosedTrade, Error, OpenTrade, Summary};

use crate::{ApiError, AppState};

pub fn trades_router() -> Router<AppState> {
    Router::new()
        .route("/trades/open", get(get_open))
        .route("/trades/closed", get(get_closed))
        .route("/trades/summary", get(get_summary))
}

/// Manual order entry points, mainly for testing and ops. Auth-protected;
/// both serialize with ticks through the engine's ledger lock.
pub fn manual_trade_router() -> Router<AppState> {
    Router::new()
        .route("/trade/open", post(post_open))
        .route("/trade/close", post(post_close))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

async fn get_open(State(state): State<AppState>) -> Result<Json<Vec<OpenTrade>>, ApiError> {
    Ok(Json(state.store.load_open().await?))
}

#[derive(Deserialize)]
struct ClosedQuery {
    limit: Option<usize>,
}

async fn get_closed(
    State(state): State<AppState>,
    Query(q): Query<ClosedQuery>,
) -> Result<Json<Vec<ClosedTrade>>, ApiError> {
    let limit = q.limit.unwrap_or(200).clamp(1, 1000);

    let mut closed = state.store.load_closed().await?;
    closed.sort_by(|a, b| b.exit_time.cmp(&a.exit_time));
    closed.truncate(limit);
    Ok(Json(closed))
}

/// The summary is always recomputed from the ledger rather than read back
/// from the persisted projection.
async fn get_summary(State(state): State<AppState>) -> Result<Json<Summary>, ApiError> {
    let config = state.settings.load().await?.unwrap_or_default();
    let open = state.store.load_open().await?;
    let closed = state.store.load_closed().await?;
    let exposure = state.store.load_exposure().await?;
    let last_tick = state.engine.last_tick().await;

    let summary = ledger::summary::compute(
        &closed,
        open.len(),
        &config,
        &exposure,
        Utc::now(),
        last_tick,
    );
    Ok(Json(summary))
}

// ─── Manual orders ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ManualOpenRequest {
    symbol: String,
    qty: f64,
    entry_price: f64,
    /// Defaults to `qty * entry_price`.
    notional_usdc: Option<f64>,
}

async fn post_open(
    State(state): State<AppState>,
    Json(req): Json<ManualOpenRequest>,
) -> Result<Json<OpenTrade>, ApiError> {
    if req.qty <= 0.0 || req.entry_price <= 0.0 {
        return Err(Error::Config("qty and entry_price must be positive".to_string()).into());
    }

    let config = state.settings.load().await?.unwrap_or_default();
    let trade = state
        .engine
        .manual_open(
            &req.symbol,
            req.qty,
            req.entry_price,
            req.notional_usdc,
            &config,
        )
        .await?;
    Ok(Json(trade))
}

#[derive(Deserialize)]
struct ManualCloseRequest {
    symbol: String,
    exit_price: f64,
}

async fn post_close(
    State(state): State<AppState>,
    Json(req): Json<ManualCloseRequest>,
) -> Result<Json<ClosedTrade>, ApiError> {
    if req.exit_price <= 0.0 {
        return Err(Error::Config("exit_price must be positive".to_string()).into());
    }

    let config = state.settings.load().await?.unwrap_or_default();
    let trade = state
        .engine
        .manual_close(&req.symbol, req.exit_price, &config)
        .await?;
    Ok(Json(trade))
}
