//! Footer fortune handler

use axum::{
    extract::State,
    http::{header::REFERER, HeaderMap},
    response::Html,
};

use crate::error::ApiResult;
use crate::fortune::text_class;
use crate::AppState;

/// GET /fortune
pub async fn get_fortune(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Html<String>> {
    let referer = headers.get(REFERER).and_then(|v| v.to_str().ok());
    let text = state.fortune.tell().await;

    Ok(Html(state.renderer.fortune_fragment(&text, text_class(referer))?))
}
