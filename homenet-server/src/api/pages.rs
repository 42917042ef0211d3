//! Full-page handlers

use axum::{extract::State, response::Html};
use tracing::debug;

use crate::db::Listing;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /
pub async fn home(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.renderer.home_page(&state.config)?))
}

/// GET /movie-board, GET /tv-shows-board
pub async fn board<T: Listing>(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let kind = T::KIND;
    let items = state
        .store
        .list_all::<T>()
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to load {}: ", kind.plural()), e))?;

    let count = state
        .store
        .count::<T>()
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to count {}: ", kind.plural()), e))?;

    debug!(table = kind.table(), count, "Rendering board");
    Ok(Html(state.renderer.board_page(&state.config, &items, count)?))
}

/// GET /ai
pub async fn ai(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.renderer.ai_page()?))
}
