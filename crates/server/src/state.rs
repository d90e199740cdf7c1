use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use catalog::{AlbumMap, CatalogService, CatalogStats, ImageEntry, StorageConfig};
use common::{Album, Track};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub config_path: PathBuf,
    pub config: Arc<RwLock<ServerConfig>>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_loaded: bool,
    pub source: String,
}

#[derive(Serialize)]
pub struct CatalogResponse<'a> {
    pub albums: &'a AlbumMap,
    pub tracks: &'a [Track],
    pub stats: CatalogStats,
}

#[derive(Serialize)]
pub struct AlbumListResponse<'a> {
    pub albums: Vec<&'a Album>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub tracks: Vec<Track>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct TrackRelationships {
    pub album_id: String,
    pub artist_id: String,
    pub trace_path: String,
}

#[derive(Serialize)]
pub struct TrackResponse {
    pub remote_url: Option<String>,
    pub relationships: TrackRelationships,
    pub track: Track,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub source: String,
    pub stats: CatalogStats,
}

#[derive(Serialize)]
pub struct ConvertPathResponse {
    pub original_path: String,
    pub remote_url: String,
}

#[derive(Serialize)]
pub struct ImagesResponse {
    pub total_images: usize,
    pub images: Vec<ImageEntry>,
}

#[derive(Serialize)]
pub struct StorageConfigResponse {
    pub status: &'static str,
    pub config: StorageConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetQuery {
    #[serde(default, alias = "use_tailscale")]
    pub use_remote: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertPathQuery {
    pub path: String,
}

pub type JsonResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;
