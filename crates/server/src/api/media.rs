use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog::{AssetKind, Resolution};

use crate::state::{AppState, AssetQuery, ConvertPathQuery, ConvertPathResponse, ImagesResponse};
use crate::streaming::file_response;
use crate::utils::{json_error_response, redirect_temporary};

pub async fn stream_audio(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    Query(query): Query<AssetQuery>,
    headers: HeaderMap,
) -> Response {
    let resolution = state
        .catalog
        .resolve_asset(&path, AssetKind::Audio, query.use_remote);
    respond(resolution, &headers, "audio file not found").await
}

pub async fn stream_image(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    Query(query): Query<AssetQuery>,
    headers: HeaderMap,
) -> Response {
    let resolution = state
        .catalog
        .resolve_asset(&path, AssetKind::Image, query.use_remote);
    respond(resolution, &headers, "image file not found").await
}

pub async fn album_art(
    State(state): State<AppState>,
    AxumPath(album_name): AxumPath<String>,
    Query(query): Query<AssetQuery>,
    headers: HeaderMap,
) -> Response {
    if state.catalog.album(&album_name).is_none() {
        return json_error_response(StatusCode::NOT_FOUND, "album not found");
    }
    let resolution = state
        .catalog
        .resolve_cover_art(&album_name, query.use_remote);
    respond(resolution, &headers, "album art not found").await
}

pub async fn remote_audio(
    State(state): State<AppState>,
    AxumPath(relative): AxumPath<String>,
) -> Response {
    redirect_temporary(&state.catalog.remote_redirect(&relative))
}

pub async fn convert_path(
    State(state): State<AppState>,
    Query(query): Query<ConvertPathQuery>,
) -> Response {
    match state.catalog.convert_path(&query.path) {
        Some(remote_url) => Json(ConvertPathResponse {
            original_path: query.path,
            remote_url,
        })
        .into_response(),
        None => json_error_response(StatusCode::NOT_FOUND, "path has no Albums anchor"),
    }
}

pub async fn list_images(State(state): State<AppState>) -> Response {
    let service = state.catalog.clone();
    match tokio::task::spawn_blocking(move || service.list_images()).await {
        Ok(images) => Json(ImagesResponse {
            total_images: images.len(),
            images,
        })
        .into_response(),
        Err(err) => json_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("image listing failed: {}", err),
        ),
    }
}

pub async fn album_art_flipbook(State(state): State<AppState>) -> Response {
    let service = state.catalog.clone();
    match tokio::task::spawn_blocking(move || service.list_album_art()).await {
        Ok(listing) => Json(listing).into_response(),
        Err(err) => json_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("album art listing failed: {}", err),
        ),
    }
}

async fn respond(resolution: Resolution, headers: &HeaderMap, missing: &str) -> Response {
    match resolution {
        Resolution::Redirect(url) => redirect_temporary(&url),
        Resolution::Stream { path, content_type } => {
            file_response(&path, content_type, headers).await
        }
        Resolution::NotFound => json_error_response(StatusCode::NOT_FOUND, missing),
    }
}
