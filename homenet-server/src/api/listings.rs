//! Watchlist mutation handlers
//!
//! Add and edit answer with the whole refreshed list plus an out-of-band
//! count block for htmx. Delete answers with an empty 200.

use axum::{
    extract::{rejection::FormRejection, State},
    http::{StatusCode, Uri},
    response::Html,
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::{Details, Kind, Listing, Movie};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Add/edit form fields; every field is optional at the wire level
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingForm {
    pub id: String,
    pub title: String,
    pub year: String,
    pub genre: String,
    pub streaming: String,
    pub notes: String,
    pub imdb_link: String,
    pub available_now: String,
    pub active_season: String,
}

impl ListingForm {
    /// Validate in order: title, id (edit only), year
    pub fn into_listing<T: Listing>(self, with_id: bool) -> ApiResult<T> {
        let kind = T::KIND;

        if self.title.is_empty() {
            warn!(table = kind.table(), "Empty title received");
            return Err(ApiError::BadRequest("Title is required".to_string()));
        }

        let id = if with_id {
            parse_id(kind, &self.id)?
        } else {
            0
        };

        let year = if self.year.is_empty() {
            0
        } else {
            self.year
                .parse::<i64>()
                .map_err(|_| ApiError::BadRequest("Invalid year".to_string()))?
        };

        let flag = match kind {
            Kind::Movie => self.available_now == "on",
            Kind::TvShow => self.active_season == "on",
        };

        let details = Details {
            title: self.title,
            year,
            genre: self.genre,
            streaming: self.streaming,
            notes: self.notes,
            imdb_link: self.imdb_link,
        };

        Ok(T::from_parts(id, details, flag))
    }
}

fn parse_id(kind: Kind, raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", kind.noun())))
}

fn form_fields(form: Result<Form<ListingForm>, FormRejection>) -> ApiResult<ListingForm> {
    form.map(|Form(f)| f)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Fresh list of every row rendered as the htmx fragment
async fn render_list<T: Listing>(state: &AppState) -> ApiResult<Html<String>> {
    let kind = T::KIND;
    let items = state
        .store
        .list_all::<T>()
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to get {}: ", kind.plural()), e))?;

    let count = items.len() as i64;
    info!(table = kind.table(), count, "Returning refreshed list");
    Ok(Html(state.renderer.listing_fragment(&state.config, &items, count)?))
}

/// POST /movie-board/add, POST /tv-shows-board/add
pub async fn add_listing<T: Listing>(
    State(state): State<AppState>,
    form: Result<Form<ListingForm>, FormRejection>,
) -> ApiResult<Html<String>> {
    let record: T = form_fields(form)?.into_listing(false)?;

    state
        .store
        .create(&record)
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to add {}: ", T::KIND.noun()), e))?;

    render_list::<T>(&state).await
}

/// PUT /movie-board/edit, PUT /tv-shows-board/edit
pub async fn edit_listing<T: Listing>(
    State(state): State<AppState>,
    form: Result<Form<ListingForm>, FormRejection>,
) -> ApiResult<Html<String>> {
    let record: T = form_fields(form)?.into_listing(true)?;

    state
        .store
        .update(&record)
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to update {}: ", T::KIND.noun()), e))?;

    render_list::<T>(&state).await
}

/// Id suffix after `<board>/delete/`, percent-decoded
pub fn delete_target(kind: Kind, path: &str) -> ApiResult<i64> {
    let prefix = format!("{}/delete/", kind.board_path());
    let raw = path.strip_prefix(prefix.as_str()).unwrap_or_default();
    let decoded = urlencoding::decode(raw)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", kind.noun())))?;
    parse_id(kind, &decoded)
}

/// DELETE /movie-board/delete/{id}, DELETE /tv-shows-board/delete/{id}
pub async fn delete_listing<T: Listing>(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    let kind = T::KIND;
    let id = delete_target(kind, uri.path())?;

    state
        .store
        .delete::<T>(id)
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to delete {}: ", kind.noun()), e))?;

    Ok(StatusCode::OK)
}

/// GET /movie-board/random
pub async fn random_movie(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let pick = state
        .store
        .random_flagged::<Movie>()
        .await
        .map_err(|e| ApiError::internal("Failed to get random movie: ", e))?;

    Ok(Html(state.renderer.random_fragment(&state.config, pick.as_ref())?))
}
