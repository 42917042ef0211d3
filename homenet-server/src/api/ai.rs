//! Ollama relay handlers
//!
//! Upstream failures are rendered as an HTML error block with status 200 so
//! the chat page can show them inline.

use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::header::CONTENT_TYPE,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    Form,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PromptForm {
    pub prompt: String,
}

fn require_prompt(prompt: String) -> ApiResult<String> {
    if prompt.is_empty() {
        warn!("Empty AI query received");
        return Err(ApiError::BadRequest("Query is required".to_string()));
    }
    Ok(prompt)
}

/// POST /ai/query
///
/// Plain-text answer, or the HTML error block when the relay fails.
pub async fn query(
    State(state): State<AppState>,
    form: Result<Form<PromptForm>, FormRejection>,
) -> ApiResult<Response> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let prompt = require_prompt(form.prompt)?;
    info!("Received AI query: {}", prompt);

    match state.relay.generate(&prompt).await {
        Ok(answer) => {
            info!(chars = answer.len(), "AI query completed");
            Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], answer).into_response())
        }
        Err(e) => {
            error!("Ollama query error: {}", e);
            let html = state.renderer.relay_error_fragment(&e.to_string(), &prompt)?;
            Ok(Html(html).into_response())
        }
    }
}

/// GET /ai/stream?prompt=...
///
/// One `data` event per answer increment, an `error` event if the relay
/// fails, and always a final `done` event carrying `[DONE]`.
pub async fn stream(
    State(state): State<AppState>,
    Query(params): Query<PromptForm>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let prompt = require_prompt(params.prompt)?;
    info!("Received streaming AI query: {}", prompt);

    let mut upstream = Box::pin(state.relay.generate_stream(&prompt));

    let events = async_stream::stream! {
        while let Some(item) = upstream.next().await {
            match item {
                Ok(text) => yield Ok(Event::default().data(text.replace('\r', ""))),
                Err(e) => {
                    error!("Ollama stream error: {}", e);
                    yield Ok(Event::default().event("error").data(e.to_string().replace('\r', "")));
                    break;
                }
            }
        }
        yield Ok(Event::default().event("done").data("[DONE]"));
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
