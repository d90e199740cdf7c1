use std::sync::Arc;

use common::{Album, Track};
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::config::{StorageConfig, StorageConfigUpdate};
use crate::gallery::{list_album_art, list_images, AlbumArtListing, ImageEntry};
use crate::inventory::ingest;
use crate::normalize::normalize;
use crate::resolve::{resolve_asset, resolve_cover, AssetKind, Resolution};
use crate::{Catalog, CatalogError, CatalogStats};

/// Long-lived owner of the current catalog and storage configuration. Both are immutable
/// snapshots behind a reference that is swapped whole, so readers never observe a partial
/// update.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<RwLock<Arc<Catalog>>>,
    config: Arc<RwLock<Arc<StorageConfig>>>,
    reload_lock: Arc<Mutex<()>>,
}

impl CatalogService {
    /// Runs the first ingestion pass against the configured roots.
    pub fn load(config: StorageConfig) -> Self {
        let catalog = ingest(&config.allowed_roots);
        Self::with_catalog(catalog, config)
    }

    pub fn with_catalog(catalog: Catalog, config: StorageConfig) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            config: Arc::new(RwLock::new(Arc::new(config))),
            reload_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    pub fn config(&self) -> Arc<StorageConfig> {
        self.config.read().clone()
    }

    pub fn album(&self, name: &str) -> Option<Album> {
        self.catalog().album(name).cloned()
    }

    pub fn album_by_id(&self, album_id: &str) -> Option<Album> {
        self.catalog().album_by_id(album_id).cloned()
    }

    pub fn track_by_id(&self, track_id: &str) -> Option<Track> {
        self.catalog().track_by_id(track_id).cloned()
    }

    pub fn search(&self, query: &str) -> Vec<Track> {
        self.catalog().search(query)
    }

    pub fn stats(&self) -> CatalogStats {
        self.catalog().stats()
    }

    pub fn resolve_asset(
        &self,
        requested: &str,
        kind: AssetKind,
        prefer_remote: Option<bool>,
    ) -> Resolution {
        let config = self.config();
        resolve_asset(requested, kind, prefer_remote, &config)
    }

    pub fn resolve_cover_art(&self, album_name: &str, prefer_remote: Option<bool>) -> Resolution {
        let catalog = self.catalog();
        let config = self.config();
        resolve_cover(&catalog, album_name, prefer_remote, &config)
    }

    /// Inventory URL when one was recorded, else derived from the track's source path.
    pub fn remote_url_for(&self, track: &Track) -> Option<String> {
        if let Some(url) = track.remote_url.as_ref().filter(|url| !url.is_empty()) {
            return Some(url.clone());
        }
        self.convert_path(&track.source_path)
    }

    pub fn convert_path(&self, path: &str) -> Option<String> {
        let config = self.config();
        normalize(path, &config.share).map(|suffix| config.remote_url(&suffix))
    }

    pub fn remote_redirect(&self, relative: &str) -> String {
        self.config().remote_url(relative.trim_start_matches('/'))
    }

    pub fn list_images(&self) -> Vec<ImageEntry> {
        let catalog = self.catalog();
        let config = self.config();
        list_images(&catalog, &config.allowed_roots)
    }

    pub fn list_album_art(&self) -> AlbumArtListing {
        list_album_art(&self.catalog())
    }

    /// Re-ingests from the current roots and swaps in the new catalog. Concurrent reloads are
    /// serialized; readers keep the snapshot they already hold.
    pub fn reload(&self) -> Arc<Catalog> {
        let _guard = self.reload_lock.lock();
        let config = self.config();
        let catalog = Arc::new(ingest(&config.allowed_roots));
        *self.catalog.write() = catalog.clone();
        info!(tracks = catalog.tracks().len(), "catalog reloaded");
        catalog
    }

    /// Validates `update` against the current configuration and swaps it in. On error the
    /// current configuration stays in place.
    pub fn update_config(
        &self,
        update: StorageConfigUpdate,
    ) -> Result<Arc<StorageConfig>, CatalogError> {
        let current = self.config();
        let next = Arc::new(update.into_config(&current)?);
        *self.config.write() = next.clone();
        info!(
            remote_base_url = %next.remote_base_url,
            remote_enabled = next.remote_enabled,
            roots = next.allowed_roots.len(),
            "storage configuration updated"
        );
        Ok(next)
    }
}
