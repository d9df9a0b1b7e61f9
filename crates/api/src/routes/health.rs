use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use common::TradeMode;

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Liveness probe for deploy checks and ops scripts. Never authenticated.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let mode = match state.settings.load().await {
        Ok(Some(config)) => config.trade_mode,
        _ => TradeMode::Paper,
    };
    let uptime_sec = (state.started_at.elapsed().as_secs_f64() * 100.0).round() / 100.0;

    Json(json!({
        "status": "ok",
        "mode": mode.to_string(),
        "quote": state.quote_asset,
        "uptime_sec": uptime_sec,
    }))
}
