use std::collections::HashSet;
use std::fs;
use std::path::Path;

use common::{file_name_of, parent_dir, Album};
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::Catalog;

const GALLERY_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "tiff", "ico",
];
const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    pub file_path: String,
    pub album: String,
    pub artist: String,
    pub file_size: u64,
    pub file_name: String,
    pub extension: String,
    pub parent_folder: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlbumArt {
    pub album: String,
    pub artist: String,
    pub cover_path: String,
    pub track_count: usize,
    pub total_duration: u64,
    pub is_primary_cover: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlbumArtListing {
    pub total_albums_with_art: usize,
    pub total_images: usize,
    pub album_arts: Vec<AlbumArt>,
}

#[derive(Default)]
struct Gallery {
    entries: Vec<ImageEntry>,
    seen: HashSet<String>,
}

impl Gallery {
    fn push(&mut self, entry: ImageEntry) {
        if self.seen.insert(entry.file_path.clone()) {
            self.entries.push(entry);
        }
    }

    fn contains(&self, path: &str) -> bool {
        self.seen.contains(path)
    }
}

/// Every image reachable from the catalog: image tracks, images next to each album's first
/// track, then anything under the storage roots. Paths are reported once.
pub fn list_images(catalog: &Catalog, roots: &[String]) -> Vec<ImageEntry> {
    let mut gallery = Gallery::default();

    for track in catalog.tracks() {
        if !is_gallery_image(&track.source_path) || gallery.contains(&track.source_path) {
            continue;
        }
        let file_size = if track.size_bytes > 0 {
            track.size_bytes
        } else {
            file_size(Path::new(&track.source_path))
        };
        gallery.push(ImageEntry {
            file_path: track.source_path.clone(),
            album: track.album.clone(),
            artist: track.artist.clone(),
            file_size,
            file_name: file_name_of(&track.source_path).to_string(),
            extension: extension_of(&track.source_path),
            parent_folder: parent_dir(&track.source_path)
                .map(file_name_of)
                .unwrap_or_default()
                .to_string(),
        });
    }

    for album in catalog.albums().iter() {
        let Some(dir) = album_folder(album) else {
            continue;
        };
        for (path, name) in folder_images(dir) {
            if gallery.contains(&path) {
                continue;
            }
            gallery.push(ImageEntry {
                file_size: file_size(Path::new(&path)),
                extension: extension_of(&name),
                parent_folder: file_name_of(dir).to_string(),
                file_path: path,
                album: album.name.clone(),
                artist: album.artist.clone(),
                file_name: name,
            });
        }
    }

    for root in roots {
        if !Path::new(root).is_dir() {
            continue;
        }
        debug!(root = %root, "scanning root for images");
        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().to_string_lossy().to_string();
            if !is_gallery_image(&path) || gallery.contains(&path) {
                continue;
            }
            let parent = entry.path().parent();
            let parent_folder = parent
                .and_then(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            let grandparent = parent
                .and_then(|dir| dir.parent())
                .and_then(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            let album = if parent_folder.eq_ignore_ascii_case("albums") && !grandparent.is_empty() {
                grandparent
            } else {
                parent_folder.clone()
            };
            gallery.push(ImageEntry {
                file_size: entry.metadata().map(|meta| meta.len()).unwrap_or(0),
                file_name: entry.file_name().to_string_lossy().to_string(),
                extension: extension_of(&path),
                file_path: path,
                album,
                artist: UNKNOWN_ARTIST.to_string(),
                parent_folder,
            });
        }
    }

    info!(images = gallery.entries.len(), "image listing built");
    gallery.entries
}

/// Album art for flipbook browsing. Each album contributes its cover (when it exists on disk)
/// followed by the other images in its folder; image tracks not seen yet come last.
pub fn list_album_art(catalog: &Catalog) -> AlbumArtListing {
    let mut arts: Vec<AlbumArt> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for album in catalog.albums().iter() {
        if let Some(cover) = album.cover.as_deref() {
            if Path::new(cover).is_file() && seen.insert(cover.to_string()) {
                arts.push(album_art(album, cover.to_string(), true));
            }
        }
        let Some(dir) = album_folder(album) else {
            continue;
        };
        for (path, _) in folder_images(dir) {
            if seen.insert(path.clone()) {
                arts.push(album_art(album, path, false));
            }
        }
    }

    for track in catalog.tracks() {
        if !is_gallery_image(&track.source_path) || !seen.insert(track.source_path.clone()) {
            continue;
        }
        let art = match catalog.album(&track.album) {
            Some(album) => album_art(album, track.source_path.clone(), false),
            None => AlbumArt {
                album: track.album.clone(),
                artist: track.artist.clone(),
                cover_path: track.source_path.clone(),
                track_count: 0,
                total_duration: 0,
                is_primary_cover: false,
            },
        };
        arts.push(art);
    }

    let albums: HashSet<&str> = arts.iter().map(|art| art.album.as_str()).collect();
    let total_albums_with_art = albums.len();
    info!(
        images = arts.len(),
        albums = total_albums_with_art,
        "album art listing built"
    );
    AlbumArtListing {
        total_albums_with_art,
        total_images: arts.len(),
        album_arts: arts,
    }
}

fn album_art(album: &Album, cover_path: String, is_primary_cover: bool) -> AlbumArt {
    AlbumArt {
        album: album.name.clone(),
        artist: album.artist.clone(),
        cover_path,
        track_count: album.tracks.len(),
        total_duration: album.total_duration_seconds,
        is_primary_cover,
    }
}

/// Folder of the album's first track with a recorded path.
fn album_folder(album: &Album) -> Option<&str> {
    let track = album.tracks.iter().find(|t| !t.source_path.is_empty())?;
    parent_dir(&track.source_path)
}

/// Sorted `(path, file name)` pairs of the images directly inside `dir`, joined with the
/// separator style `dir` already uses.
fn folder_images(dir: &str) -> Vec<(String, String)> {
    let sep = if dir.contains('\\') && !dir.contains('/') {
        '\\'
    } else {
        '/'
    };
    image_names(Path::new(dir))
        .into_iter()
        .map(|name| (format!("{}{}{}", dir, sep, name), name))
        .collect()
}

fn is_gallery_image(path: &str) -> bool {
    let ext = extension_of(path);
    GALLERY_EXTENSIONS
        .iter()
        .any(|candidate| ext.len() > 1 && &ext[1..] == *candidate)
}

/// Lowercased extension with its leading dot, or empty.
fn extension_of(path: &str) -> String {
    let name = file_name_of(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

fn image_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| is_gallery_image(name))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::CatalogSource;

    fn catalog_in(album_dir: &Path) -> Catalog {
        let mut tracks = crate::sample_tracks();
        tracks.truncate(1);
        tracks[0].source_path = album_dir
            .join("01 Silicon Love.mp3")
            .to_string_lossy()
            .to_string();
        Catalog::new(tracks, CatalogSource::Sample)
    }

    #[test]
    fn lists_album_and_root_images_once() {
        let root = tempfile::tempdir().unwrap();
        let album_dir = root.path().join("Synthetic Souls");
        fs::create_dir_all(&album_dir).unwrap();
        fs::write(album_dir.join("cover.jpg"), b"12345").unwrap();
        fs::write(album_dir.join("notes.txt"), b"x").unwrap();
        let loose_dir = root.path().join("Extras").join("Albums");
        fs::create_dir_all(&loose_dir).unwrap();
        fs::write(loose_dir.join("Poster.PNG"), b"xx").unwrap();

        let catalog = catalog_in(&album_dir);
        let images = list_images(&catalog, &[root.path().to_string_lossy().to_string()]);
        assert_eq!(images.len(), 2);

        let cover = &images[0];
        assert_eq!(cover.album, "Synthetic Souls");
        assert_eq!(cover.artist, "AeroVista");
        assert_eq!(cover.file_size, 5);
        assert_eq!(cover.extension, ".jpg");
        assert_eq!(cover.parent_folder, "Synthetic Souls");

        let poster = &images[1];
        assert_eq!(poster.album, "Extras");
        assert_eq!(poster.artist, "Unknown Artist");
        assert_eq!(poster.parent_folder, "Albums");
        assert_eq!(poster.extension, ".png");
        assert_eq!(poster.file_name, "Poster.PNG");
    }

    #[test]
    fn image_tracks_are_listed_first() {
        let mut tracks = crate::sample_tracks();
        tracks[0].source_path = "M:/Albums/Synthetic Souls/booklet.tiff".to_string();
        let catalog = Catalog::new(tracks, CatalogSource::Sample);
        let images = list_images(&catalog, &[]);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].file_size, 5_120_000);
        assert_eq!(images[0].parent_folder, "Synthetic Souls");
    }

    #[test]
    fn album_art_puts_primary_cover_first() {
        let root = tempfile::tempdir().unwrap();
        let album_dir = root.path().join("Synthetic Souls");
        fs::create_dir_all(&album_dir).unwrap();
        fs::write(album_dir.join("cover.jpg"), b"x").unwrap();
        fs::write(album_dir.join("back.png"), b"x").unwrap();

        let mut tracks = crate::sample_tracks();
        tracks.truncate(2);
        for track in &mut tracks {
            track.source_path = album_dir
                .join(format!("{}.mp3", track.title))
                .to_string_lossy()
                .to_string();
            track.cover_path = Some(album_dir.join("cover.jpg").to_string_lossy().to_string());
        }
        let catalog = Catalog::new(tracks, CatalogSource::Sample);
        let listing = list_album_art(&catalog);

        assert_eq!(listing.total_images, 2);
        assert_eq!(listing.total_albums_with_art, 1);
        let primary = &listing.album_arts[0];
        assert!(primary.is_primary_cover);
        assert!(primary.cover_path.ends_with("cover.jpg"));
        assert_eq!(primary.track_count, 2);
        assert_eq!(primary.total_duration, 477);
        let other = &listing.album_arts[1];
        assert!(!other.is_primary_cover);
        assert!(other.cover_path.ends_with("back.png"));
        assert_eq!(other.artist, "AeroVista");
    }

    #[test]
    fn album_art_skips_missing_covers_and_adds_image_tracks() {
        let mut tracks = crate::sample_tracks();
        tracks[2].source_path = "M:/Albums/Neon Dreams/poster.webp".to_string();
        let catalog = Catalog::new(tracks, CatalogSource::Sample);
        let listing = list_album_art(&catalog);

        assert_eq!(listing.total_images, 1);
        let art = &listing.album_arts[0];
        assert_eq!(art.album, "Neon Dreams");
        assert_eq!(art.cover_path, "M:/Albums/Neon Dreams/poster.webp");
        assert_eq!(art.track_count, 1);
        assert_eq!(art.total_duration, 208);
        assert!(!art.is_primary_cover);
    }

    #[test]
    fn extension_helpers() {
        assert_eq!(extension_of("a/b/Cover.JPG"), ".jpg");
        assert_eq!(extension_of(".hidden"), "");
        assert!(is_gallery_image("x.ico"));
        assert!(!is_gallery_image("x.mp3"));
    }
}
