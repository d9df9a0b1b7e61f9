mod auth;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{middleware, Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::{LedgerStore, SettingsStore};
use engine::TickEngine;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TickEngine>,
    pub settings: Arc<dyn SettingsStore>,
    pub store: Arc<dyn LedgerStore>,
    /// Bearer token required on mutating routes; `None` = open access.
    pub api_token: Option<String>,
    pub quote_asset: String,
    pub started_at: Instant,
}

/// Build and run the Axum API server.
pub async fn serve(state: AppState, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let protected = Router::new()
        .merge(routes::tick_router())
        .merge(routes::manual_trade_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let app = Router::new()
        .merge(routes::health_router())
        .merge(routes::settings_router())
        .merge(routes::trades_router())
        .merge(protected)
        .with_state(state)
        .layer(cors);

    info!(%addr, "API listening");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Maps domain errors onto HTTP responses. Handlers bubble `common::Error`
/// up with `?` and this decides the status code.
pub struct ApiError(common::Error);

impl From<common::Error> for ApiError {
    fn from(err: common::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            common::Error::TradeNotFound(_) => StatusCode::NOT_FOUND,
            common::Error::DuplicateSymbol(_) => StatusCode::BAD_REQUEST,
            common::Error::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
