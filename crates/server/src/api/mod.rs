pub mod browse;
pub mod config;
pub mod media;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::state::{AppState, HealthResponse};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/catalog", get(browse::get_catalog))
        .route("/catalog/reload", post(browse::reload))
        .route("/albums", get(browse::list_albums))
        .route("/albums/:name", get(browse::get_album))
        .route("/album/:album_id", get(browse::get_album_by_id))
        .route("/track/:track_id", get(browse::get_track))
        .route("/search", get(browse::search))
        .route("/audio/*path", get(media::stream_audio))
        .route("/image/*path", get(media::stream_image))
        .route("/album-art/*name", get(media::album_art))
        .route("/remote-audio/*path", get(media::remote_audio))
        .route("/convert-path", get(media::convert_path))
        .route("/images", get(media::list_images))
        .route("/album-art-flipbook", get(media::album_art_flipbook))
        .route(
            "/config/storage",
            get(config::get_storage_config).post(config::update_storage_config),
        )
        .with_state(state)
}

/// Full HTTP surface: health probe plus the JSON API under `/api`.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/api", api_router(state))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog = state.catalog.catalog();
    Json(HealthResponse {
        status: "healthy",
        catalog_loaded: !catalog.tracks().is_empty(),
        source: browse::source_label(&catalog),
    })
}
