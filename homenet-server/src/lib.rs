//! homenet-server library - household media tracker
//!
//! Movie and TV show watchlists, a footer fortune, and a relay to a local
//! Ollama server, served as htmx pages.

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use homenet_common::Config;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod error;
pub mod fortune;
pub mod relay;
pub mod render;

use api::method_not_allowed;
use db::{Movie, Store, TvShow};
use fortune::Fortune;
use relay::OllamaClient;
use render::Renderer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// Read-only after startup
    pub config: Arc<Config>,
    pub renderer: Renderer,
    pub relay: OllamaClient,
    pub fortune: Fortune,
}

impl AppState {
    /// Build the state from an opened store and the loaded configuration
    pub fn new(store: Store, config: Config) -> anyhow::Result<Self> {
        let renderer =
            Renderer::new(&config.templates.dir).context("Failed to load fragment templates")?;
        let relay = OllamaClient::new(&config.ollama.host, &config.ollama.model_name)
            .context("Failed to create Ollama client")?;
        let fortune = Fortune::new(&config.fortune);

        Ok(Self {
            store,
            config: Arc::new(config),
            renderer,
            relay,
            fortune,
        })
    }
}

/// Build application router
///
/// Every registered path answers other methods with 405 "Method not allowed".
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_files.dir.clone();

    Router::new()
        .route("/", get(api::pages::home).fallback(method_not_allowed))
        // Movies
        .route(
            "/movie-board",
            get(api::pages::board::<Movie>).fallback(method_not_allowed),
        )
        .route(
            "/movie-board/add",
            post(api::listings::add_listing::<Movie>).fallback(method_not_allowed),
        )
        .route(
            "/movie-board/edit",
            put(api::listings::edit_listing::<Movie>).fallback(method_not_allowed),
        )
        .route(
            "/movie-board/delete/",
            delete(api::listings::delete_listing::<Movie>).fallback(method_not_allowed),
        )
        .route(
            "/movie-board/delete/*id",
            delete(api::listings::delete_listing::<Movie>).fallback(method_not_allowed),
        )
        .route(
            "/movie-board/random",
            get(api::listings::random_movie).fallback(method_not_allowed),
        )
        // TV shows
        .route(
            "/tv-shows-board",
            get(api::pages::board::<TvShow>).fallback(method_not_allowed),
        )
        .route(
            "/tv-shows-board/add",
            post(api::listings::add_listing::<TvShow>).fallback(method_not_allowed),
        )
        .route(
            "/tv-shows-board/edit",
            put(api::listings::edit_listing::<TvShow>).fallback(method_not_allowed),
        )
        .route(
            "/tv-shows-board/delete/",
            delete(api::listings::delete_listing::<TvShow>).fallback(method_not_allowed),
        )
        .route(
            "/tv-shows-board/delete/*id",
            delete(api::listings::delete_listing::<TvShow>).fallback(method_not_allowed),
        )
        // Fortune and AI
        .route(
            "/fortune",
            get(api::fortune::get_fortune).fallback(method_not_allowed),
        )
        .route("/ai", get(api::pages::ai).fallback(method_not_allowed))
        .route("/ai/query", post(api::ai::query).fallback(method_not_allowed))
        .route("/ai/stream", get(api::ai::stream).fallback(method_not_allowed))
        .merge(api::health_routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
