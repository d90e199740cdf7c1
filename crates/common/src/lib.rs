use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const HASH_WIDTH: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub album_id: String,
    pub artist_id: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub duration_seconds: u64,
    /// Display form of `duration_seconds`, `M:SS`.
    pub duration: String,
    pub size_bytes: u64,
    pub source_path: String,
    pub cover_path: Option<String>,
    pub remote_url: Option<String>,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub artist_id: String,
    pub name: String,
    pub artist: String,
    pub tracks: Vec<Track>,
    pub total_duration_seconds: u64,
    pub total_size_bytes: u64,
    pub cover: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum CatalogSource {
    Inventory { path: PathBuf },
    Sample,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    Artist,
    Album,
    Track,
}

impl IdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Artist => "artist",
            IdKind::Album => "album",
            IdKind::Track => "track",
        }
    }
}

/// First eight hex characters of the blake3 digest of `input`.
pub fn stable_hash(input: &str) -> String {
    let mut hex = blake3::hash(input.as_bytes()).to_hex().to_string();
    hex.truncate(HASH_WIDTH);
    hex
}

/// Hierarchical id: `kind_hash` for top-level items, `kind_hash_parenthash` when a parent id is
/// given, where `parenthash` is the parent's trailing `_` segment (`root` if it has none).
pub fn assign_id(kind: IdKind, name: &str, parent_id: Option<&str>) -> String {
    let hash = stable_hash(name);
    match parent_id {
        Some(parent) => {
            let parent_hash = match parent.rsplit_once('_') {
                Some((_, tail)) => tail,
                None => "root",
            };
            format!("{}_{}_{}", kind.as_str(), hash, parent_hash)
        }
        None => format!("{}_{}", kind.as_str(), hash),
    }
}

/// Splits a recorded path on either separator, dropping empty parts.
pub fn path_segments(raw: &str) -> Vec<&str> {
    raw.split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect()
}

/// Directory portion of a recorded path, whichever separator style it uses.
pub fn parent_dir(raw: &str) -> Option<&str> {
    let idx = raw.rfind(['/', '\\'])?;
    let dir = &raw[..idx];
    if dir.is_empty() {
        None
    } else {
        Some(dir)
    }
}

pub fn file_name_of(raw: &str) -> &str {
    match raw.rfind(['/', '\\']) {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    }
}

pub fn join_relpath(root: &Path, relpath: &str) -> PathBuf {
    let mut out = PathBuf::from(root);
    for part in path_segments(relpath) {
        out.push(part);
    }
    out
}

pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_hash_is_deterministic() {
        let first = stable_hash("Synthetic Souls");
        let second = stable_hash("Synthetic Souls");
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, stable_hash("Neon Dreams"));
    }

    #[test]
    fn assign_id_builds_hierarchy() {
        let artist = assign_id(IdKind::Artist, "AeroVista", None);
        let album = assign_id(IdKind::Album, "Synthetic Souls", Some(&artist));
        let track = assign_id(IdKind::Track, "Silicon Love", Some(&album));

        let artist_hash = stable_hash("AeroVista");
        assert_eq!(artist, format!("artist_{}", artist_hash));
        assert_eq!(
            album,
            format!("album_{}_{}", stable_hash("Synthetic Souls"), artist_hash)
        );
        assert!(track.starts_with(&format!("track_{}_", stable_hash("Silicon Love"))));
        assert_eq!(track.rsplit('_').next(), album.rsplit('_').next());
    }

    #[test]
    fn assign_id_is_repeatable() {
        let a = assign_id(IdKind::Track, "Pulse Code", Some("album_1234abcd_89abcdef"));
        let b = assign_id(IdKind::Track, "Pulse Code", Some("album_1234abcd_89abcdef"));
        assert_eq!(a, b);
    }

    #[test]
    fn parent_without_separator_hashes_to_root() {
        let id = assign_id(IdKind::Album, "Loose", Some("orphan"));
        assert!(id.ends_with("_root"));
    }

    #[test]
    fn path_helpers_accept_both_separators() {
        assert_eq!(
            path_segments(r"\\envy2-0\EchoVerse_Music/Albums\X"),
            vec!["envy2-0", "EchoVerse_Music", "Albums", "X"]
        );
        assert_eq!(parent_dir(r"M:\Albums\X\01 Song.mp3"), Some(r"M:\Albums\X"));
        assert_eq!(parent_dir("song.mp3"), None);
        assert_eq!(file_name_of("M:/Albums/X/01 Song.mp3"), "01 Song.mp3");
    }

    #[test]
    fn join_relpath_skips_empty_parts() {
        let joined = join_relpath(Path::new("/srv/music"), "X//01 Song.mp3");
        assert_eq!(joined, PathBuf::from("/srv/music/X/01 Song.mp3"));
    }

    #[test]
    fn formats_duration() {
        assert_eq!(format_duration(225), "3:45");
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(3_725), "62:05");
    }
}
