//! Liveness of the service and its watchlist database

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use super::method_not_allowed;
use crate::db::{Movie, TvShow};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// "ok" or "unreachable"
    pub database: &'static str,
    pub movies: Option<i64>,
    pub tv_shows: Option<i64>,
}

/// GET /health
///
/// 503 when the store does not answer.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = &state.store;
    let reachable = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            false
        }
    };

    let (movies, tv_shows) = if reachable {
        (
            store.count::<Movie>().await.ok(),
            store.count::<TvShow>().await.ok(),
        )
    } else {
        (None, None)
    };

    let (code, status, database) = if reachable {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            module: "homenet",
            version: env!("CARGO_PKG_VERSION"),
            database,
            movies,
            tv_shows,
        }),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check).fallback(method_not_allowed))
}
