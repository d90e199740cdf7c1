use std::fs;
use std::path::Path;

use common::parent_dir;
use tracing::{debug, warn};

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

const BASE_NAMES: [&str; 12] = [
    "cover",
    "album",
    "front",
    "folder",
    "artwork",
    "albumart",
    "art",
    "albumcover",
    "cd",
    "booklet",
    "sleeve",
    "inlay",
];

const NAME_KEYWORDS: [&str; 4] = ["cover", "art", "front", "album"];

pub fn has_image_extension(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Well-known cover file names in probe order.
pub fn cover_candidates(album: &str) -> Vec<String> {
    let album_stem = album.to_lowercase().replace(' ', "");
    let mut bases: Vec<&str> = BASE_NAMES.to_vec();
    if !album_stem.is_empty() {
        bases.push(&album_stem);
    }

    let mut out = Vec::with_capacity((bases.len() + 6) * IMAGE_EXTENSIONS.len());
    for base in &bases {
        for ext in IMAGE_EXTENSIONS {
            out.push(format!("{}.{}", base, ext));
        }
    }
    for i in 1..=3 {
        for ext in IMAGE_EXTENSIONS {
            out.push(format!("cover{}.{}", i, ext));
            out.push(format!("{}.{}", i, ext));
        }
    }
    out
}

/// Picks cover art for a track recorded at `source_path`. Image rows are their own cover;
/// otherwise the containing directory is probed by well-known names, then by keyword, then for
/// any image at all.
pub fn discover_cover(source_path: &str, album: &str) -> Option<String> {
    if source_path.is_empty() {
        return None;
    }
    if has_image_extension(source_path) {
        return Some(source_path.to_string());
    }

    let dir = parent_dir(source_path)?;
    let sep = if dir.contains('\\') && !dir.contains('/') {
        '\\'
    } else {
        '/'
    };
    let join = |name: &str| format!("{}{}{}", dir, sep, name);

    for name in cover_candidates(album) {
        let candidate = join(&name);
        if Path::new(&candidate).is_file() {
            debug!(album, cover = %candidate, "cover by name");
            return Some(candidate);
        }
    }

    let listing = list_images(Path::new(dir))?;
    if let Some(name) = listing.iter().find(|name| {
        let lower = name.to_lowercase();
        NAME_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    }) {
        return Some(join(name));
    }
    listing.first().map(|name| join(name))
}

// Directory entries are sorted so the pick does not depend on filesystem order.
fn list_images(dir: &Path) -> Option<Vec<String>> {
    if !dir.is_dir() {
        return None;
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "failed to list album directory");
            return None;
        }
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| has_image_extension(name))
        .collect();
    names.sort();
    Some(names)
}
