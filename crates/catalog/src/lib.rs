mod aggregate;
mod config;
mod cover;
mod gallery;
mod inventory;
mod locate;
mod normalize;
mod resolve;
mod sample;
mod service;

use std::path::PathBuf;

use common::{Album, CatalogSource, Track};
use serde::Serialize;

pub use aggregate::{aggregate, AlbumMap};
pub use config::{ShareLayout, StorageConfig, StorageConfigUpdate};
pub use cover::{cover_candidates, discover_cover, has_image_extension, IMAGE_EXTENSIONS};
pub use gallery::{list_album_art, list_images, AlbumArt, AlbumArtListing, ImageEntry};
pub use inventory::{
    derive_title, duration_from_field, find_latest_inventory, ingest, ingest_tracks,
    parse_clock_duration, parse_inventory, read_inventory, size_from_field, track_from_row,
    InventoryRow,
};
pub use locate::{candidate_paths, locate};
pub use normalize::{canonical_suffix, normalize, percent_decode, repair, repair_decoded, ALBUMS_ANCHOR};
pub use resolve::{resolve_asset, resolve_cover, AssetKind, Resolution};
pub use sample::sample_tracks;
pub use service::CatalogService;

/// One immutable ingestion result: tracks in inventory order plus their album grouping.
#[derive(Clone, Debug)]
pub struct Catalog {
    tracks: Vec<Track>,
    albums: AlbumMap,
    source: CatalogSource,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_albums: usize,
    pub total_tracks: usize,
    pub total_size_bytes: u64,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>, source: CatalogSource) -> Self {
        let albums = aggregate(&tracks);
        Self {
            tracks,
            albums,
            source,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), CatalogSource::Sample)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn albums(&self) -> &AlbumMap {
        &self.albums
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn album(&self, name: &str) -> Option<&Album> {
        self.albums.get(name)
    }

    pub fn album_by_id(&self, album_id: &str) -> Option<&Album> {
        self.albums.iter().find(|album| album.id == album_id)
    }

    pub fn track_by_id(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == track_id)
    }

    /// Case-insensitive substring match over album, artist and title. An empty query matches
    /// every track.
    pub fn search(&self, query: &str) -> Vec<Track> {
        if query.is_empty() {
            return self.tracks.clone();
        }
        let needle = query.to_lowercase();
        self.tracks
            .iter()
            .filter(|track| {
                track.album.to_lowercase().contains(&needle)
                    || track.artist.to_lowercase().contains(&needle)
                    || track.title.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            total_albums: self.albums.len(),
            total_tracks: self.tracks.len(),
            total_size_bytes: self
                .tracks
                .iter()
                .fold(0u64, |total, track| total.saturating_add(track.size_bytes)),
        }
    }
}

#[derive(Debug)]
pub enum CatalogError {
    MalformedRow { position: u64, reason: String },
    MissingColumn(&'static str),
    SourceUnavailable,
    ConfigurationInvalid(String),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::MalformedRow { position, reason } => {
                write!(f, "malformed inventory row {}: {}", position, reason)
            }
            CatalogError::MissingColumn(name) => {
                write!(f, "inventory is missing the {} column", name)
            }
            CatalogError::SourceUnavailable => {
                write!(f, "no inventory file reachable on any configured root")
            }
            CatalogError::ConfigurationInvalid(reason) => {
                write!(f, "invalid storage configuration: {}", reason)
            }
            CatalogError::Io(err) => write!(f, "io error: {}", err),
            CatalogError::Csv(err) => write!(f, "csv error: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        CatalogError::Csv(err)
    }
}

/// Inventory file a catalog was built from, if any.
pub fn inventory_path(catalog: &Catalog) -> Option<&PathBuf> {
    match catalog.source() {
        CatalogSource::Inventory { path } => Some(path),
        CatalogSource::Sample => None,
    }
}
