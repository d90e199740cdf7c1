use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::StorageConfig;
use crate::locate::locate;
use crate::normalize::{canonical_suffix, percent_decode, repair_decoded};
use crate::Catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Audio,
    Image,
}

impl AssetKind {
    /// Content type by file extension alone.
    pub fn content_type(&self, path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match self {
            AssetKind::Audio => match ext.as_str() {
                "wav" => "audio/wav",
                "flac" => "audio/flac",
                "ogg" => "audio/ogg",
                "m4a" => "audio/mp4",
                _ => "audio/mpeg",
            },
            AssetKind::Image => match ext.as_str() {
                "png" => "image/png",
                "gif" => "image/gif",
                "webp" => "image/webp",
                "svg" => "image/svg+xml",
                "ico" => "image/x-icon",
                _ => "image/jpeg",
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Redirect(String),
    Stream {
        path: PathBuf,
        content_type: &'static str,
    },
    NotFound,
}

/// Decides how a client-requested asset path is served. Remote mode redirects whenever the
/// repaired path has an `Albums` anchor; otherwise, or when no anchor is found, the file is
/// looked up on the configured roots.
pub fn resolve_asset(
    requested: &str,
    kind: AssetKind,
    prefer_remote: Option<bool>,
    config: &StorageConfig,
) -> Resolution {
    let decoded = percent_decode(requested);
    let repaired = repair_decoded(&decoded, &config.share);

    if prefer_remote.unwrap_or(config.remote_enabled) {
        match canonical_suffix(&repaired) {
            Some(suffix) => {
                let url = config.remote_url(&suffix);
                debug!(requested, url = %url, "redirecting to remote storage");
                return Resolution::Redirect(url);
            }
            None => {
                debug!(requested, "no albums anchor, serving locally");
            }
        }
    }

    match locate(&repaired, &config.allowed_roots) {
        Some(path) => {
            let content_type = kind.content_type(&path);
            debug!(requested, path = %path.display(), content_type, "serving local file");
            Resolution::Stream { path, content_type }
        }
        None => Resolution::NotFound,
    }
}

/// Resolves the chosen cover of `album_name` like any other image request.
pub fn resolve_cover(
    catalog: &Catalog,
    album_name: &str,
    prefer_remote: Option<bool>,
    config: &StorageConfig,
) -> Resolution {
    let Some(cover) = catalog.album(album_name).and_then(|album| album.cover.as_deref()) else {
        return Resolution::NotFound;
    };
    resolve_asset(cover, AssetKind::Image, prefer_remote, config)
}
