use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use common::{Error, ExposureState, RiskConfig};

use crate::{ApiError, AppState};

pub fn settings_router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(put_settings))
}

/// The stored configuration plus the derived effective limit; the latter is
/// never persisted, only computed for the response.
#[derive(Serialize)]
struct SettingsResponse {
    #[serde(flatten)]
    config: RiskConfig,
    effective_max_usdc_exposure: f64,
}

impl SettingsResponse {
    fn new(config: RiskConfig, exposure: &ExposureState) -> Self {
        let effective_max_usdc_exposure = risk::effective_limit(&config, exposure);
        Self {
            config,
            effective_max_usdc_exposure,
        }
    }
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<SettingsResponse>, ApiError> {
    let config = state.settings.load().await?.unwrap_or_default();
    let exposure = state.store.load_exposure().await?;
    Ok(Json(SettingsResponse::new(config, &exposure)))
}

async fn put_settings(
    State(state): State<AppState>,
    Json(config): Json<RiskConfig>,
) -> Result<Json<SettingsResponse>, ApiError> {
    validate(&config).map_err(Error::Config)?;

    let config = config.normalized();
    state.settings.save(&config).await?;

    let exposure = state.store.load_exposure().await?;
    Ok(Json(SettingsResponse::new(config, &exposure)))
}

fn validate(config: &RiskConfig) -> Result<(), String> {
    if config.max_usdc_exposure < 0.0 {
        return Err("max_usdc_exposure must be >= 0".to_string());
    }
    if config.max_position_size_usdc < 0.0 {
        return Err("max_position_size_usdc must be >= 0".to_string());
    }
    if !(0.0..=100.0).contains(&config.reinvest_profit_pct) {
        return Err("reinvest_profit_pct must be between 0 and 100".to_string());
    }
    Ok(())
}
