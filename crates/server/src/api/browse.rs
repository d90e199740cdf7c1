use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog::{inventory_path, Catalog};
use common::Album;

use crate::state::{
    AlbumListResponse, AppState, CatalogResponse, JsonResult, ReloadResponse, SearchQuery,
    SearchResponse, TrackRelationships, TrackResponse,
};
use crate::utils::{json_error, json_error_response};

pub(crate) fn source_label(catalog: &Catalog) -> String {
    match inventory_path(catalog) {
        Some(path) => path.display().to_string(),
        None => "sample".to_string(),
    }
}

pub async fn get_catalog(State(state): State<AppState>) -> Response {
    let catalog = state.catalog.catalog();
    Json(CatalogResponse {
        albums: catalog.albums(),
        tracks: catalog.tracks(),
        stats: catalog.stats(),
    })
    .into_response()
}

pub async fn list_albums(State(state): State<AppState>) -> Response {
    let catalog = state.catalog.catalog();
    let albums: Vec<&Album> = catalog.albums().iter().collect();
    Json(AlbumListResponse {
        total: albums.len(),
        albums,
    })
    .into_response()
}

pub async fn get_album(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> JsonResult<Album> {
    state
        .catalog
        .album(&name)
        .map(Json)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "album not found"))
}

pub async fn get_album_by_id(
    State(state): State<AppState>,
    AxumPath(album_id): AxumPath<String>,
) -> JsonResult<Album> {
    state
        .catalog
        .album_by_id(&album_id)
        .map(Json)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "album not found"))
}

pub async fn get_track(
    State(state): State<AppState>,
    AxumPath(track_id): AxumPath<String>,
) -> JsonResult<TrackResponse> {
    let track = state
        .catalog
        .track_by_id(&track_id)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "track not found"))?;
    let relationships = TrackRelationships {
        album_id: track.album_id.clone(),
        artist_id: track.artist_id.clone(),
        trace_path: format!("{} -> {} -> {}", track.id, track.album_id, track.artist_id),
    };
    Ok(Json(TrackResponse {
        remote_url: state.catalog.remote_url_for(&track),
        relationships,
        track,
    }))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> JsonResult<SearchResponse> {
    let tracks = state.catalog.search(&query.q);
    Ok(Json(SearchResponse {
        query: query.q,
        total: tracks.len(),
        tracks,
    }))
}

pub async fn reload(State(state): State<AppState>) -> Response {
    let service = state.catalog.clone();
    match tokio::task::spawn_blocking(move || service.reload()).await {
        Ok(catalog) => Json(ReloadResponse {
            status: "reloaded",
            source: source_label(&catalog),
            stats: catalog.stats(),
        })
        .into_response(),
        Err(err) => json_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("reload failed: {}", err),
        ),
    }
}
