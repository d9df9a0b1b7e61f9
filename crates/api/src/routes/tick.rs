use axum::{extract::State, routing::post, Json, Router};

use common::{Summary, TickResult};

use crate::{ApiError, AppState};

pub fn tick_router() -> Router<AppState> {
    Router::new()
        .route("/tick", post(post_tick))
        .route("/state/reset", post(post_reset))
}

/// Run one tick. Cadence is the caller's concern (cron, timer, or manual).
/// Missing settings are a reported no-op, not an error.
async fn post_tick(State(state): State<AppState>) -> Result<Json<TickResult>, ApiError> {
    let Some(config) = state.settings.load().await? else {
        return Ok(Json(TickResult::no_op("no settings")));
    };
    let result = state.engine.run_tick(&config).await?;
    Ok(Json(result))
}

/// Zero the accumulated exposure adjustment. The only way the feedback loop
/// ever resets.
async fn post_reset(State(state): State<AppState>) -> Result<Json<Summary>, ApiError> {
    let config = state.settings.load().await?.unwrap_or_default();
    let summary = state.engine.reset_adjustment(&config).await?;
    Ok(Json(summary))
}
