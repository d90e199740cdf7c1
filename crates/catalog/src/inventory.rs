use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use common::{assign_id, file_name_of, format_duration, CatalogSource, IdKind, Track};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cover::discover_cover;
use crate::sample::sample_tracks;
use crate::{Catalog, CatalogError};

const INVENTORY_PREFIXES: [&str; 2] = ["_inventory_", "music_catalog_"];
const INVENTORY_EXTENSION: &str = ".csv";
const MEDIA_TYPE_COLUMN: &str = "mime_type";

const UNKNOWN_TRACK: &str = "Unknown Track";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One inventory record as written by the scanner. Every column is optional text; numeric
/// interpretation happens once in [`track_from_row`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InventoryRow {
    pub mime_type: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub file_name: String,
    pub full_path: String,
    pub track_number: String,
    pub year: String,
    pub genre: String,
    pub bitrate: String,
    pub sample_rate: String,
    pub length_seconds: String,
    pub size_bytes: String,
    pub tailscale_echoverse_url: String,
    pub remote_url: String,
}

/// Runs one ingestion pass and aggregates the result into a catalog.
pub fn ingest(roots: &[String]) -> Catalog {
    let (tracks, source) = ingest_tracks(roots);
    let catalog = Catalog::new(tracks, source);
    info!(
        tracks = catalog.tracks().len(),
        albums = catalog.albums().len(),
        "catalog ready"
    );
    catalog
}

/// Loads tracks from the newest inventory on `roots`, degrading to the built-in sample when no
/// inventory is reachable or the chosen file cannot be read.
pub fn ingest_tracks(roots: &[String]) -> (Vec<Track>, CatalogSource) {
    match load_inventory(roots) {
        Ok((tracks, path)) => {
            info!(path = %path.display(), tracks = tracks.len(), "loaded inventory");
            (tracks, CatalogSource::Inventory { path })
        }
        Err(err) => {
            warn!(error = %err, "using built-in sample catalog");
            (sample_tracks(), CatalogSource::Sample)
        }
    }
}

fn load_inventory(roots: &[String]) -> Result<(Vec<Track>, PathBuf), CatalogError> {
    let path = find_latest_inventory(roots).ok_or(CatalogError::SourceUnavailable)?;
    let tracks = read_inventory(&path)?;
    Ok((tracks, path))
}

/// Most recently modified inventory file across `roots`. Earlier roots and names win ties.
pub fn find_latest_inventory(roots: &[String]) -> Option<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for root in roots {
        let dir = Path::new(root);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(root = %root, error = %err, "storage root not reachable");
                continue;
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| is_inventory_name(name))
            .collect();
        names.sort();

        for name in names {
            let path = dir.join(&name);
            let Some(stamp) = modified_time(&path) else {
                continue;
            };
            let newer = match &latest {
                Some((best, _)) => stamp > *best,
                None => true,
            };
            if newer {
                latest = Some((stamp, path));
            }
        }
    }
    latest.map(|(_, path)| path)
}

fn is_inventory_name(name: &str) -> bool {
    INVENTORY_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
        && name.ends_with(INVENTORY_EXTENSION)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    let meta = fs::metadata(path).ok()?;
    meta.modified().or_else(|_| meta.created()).ok()
}

pub fn read_inventory(path: &Path) -> Result<Vec<Track>, CatalogError> {
    let file = File::open(path)?;
    parse_inventory(file)
}

/// Parses inventory rows, keeping audio rows only. Rows that fail to decode are logged and
/// skipped; a file without a media type column is rejected outright.
pub fn parse_inventory<R: Read>(reader: R) -> Result<Vec<Track>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    if !headers.iter().any(|header| header == MEDIA_TYPE_COLUMN) {
        return Err(CatalogError::MissingColumn(MEDIA_TYPE_COLUMN));
    }

    let mut tracks = Vec::new();
    for (index, result) in csv_reader.deserialize::<InventoryRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                let position = err
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(index as u64 + 2);
                let skipped = CatalogError::MalformedRow {
                    position,
                    reason: err.to_string(),
                };
                warn!("{}", skipped);
                continue;
            }
        };
        if !row.mime_type.starts_with("audio/") {
            continue;
        }
        tracks.push(track_from_row(&row));
    }
    Ok(tracks)
}

pub fn track_from_row(row: &InventoryRow) -> Track {
    let artist = text(&row.artist).unwrap_or(UNKNOWN_ARTIST).to_string();
    let album = text(&row.album).unwrap_or(UNKNOWN_ALBUM).to_string();
    let file_name = match text(&row.file_name) {
        Some(name) => name.to_string(),
        None => file_name_of(&row.full_path).to_string(),
    };
    let title = derive_title(&row.title, &file_name);

    let artist_id = assign_id(IdKind::Artist, &artist, None);
    let album_id = assign_id(IdKind::Album, &album, Some(&artist_id));
    let id = assign_id(IdKind::Track, &title, Some(&album_id));

    let cover_path = if text(&row.album).is_some() {
        discover_cover(&row.full_path, &album)
    } else {
        None
    };
    let remote_url = text(&row.tailscale_echoverse_url)
        .or_else(|| text(&row.remote_url))
        .map(str::to_string);
    let duration_seconds = duration_from_field(&row.length_seconds);

    Track {
        id,
        album_id,
        artist_id,
        artist,
        album,
        title,
        duration_seconds,
        duration: format_duration(duration_seconds),
        size_bytes: size_from_field(&row.size_bytes),
        source_path: row.full_path.clone(),
        cover_path,
        remote_url,
        file_name,
        track_number: number(&row.track_number).and_then(to_u32),
        year: number(&row.year).and_then(to_i32),
        genre: text(&row.genre).map(str::to_string),
        bitrate: number(&row.bitrate).and_then(to_u32),
        sample_rate: number(&row.sample_rate).and_then(to_u32),
    }
}

/// Explicit title, else the file stem without a leading track number ("01 - ", "2."), else a
/// placeholder.
pub fn derive_title(title: &str, file_name: &str) -> String {
    if let Some(title) = text(title) {
        return title.to_string();
    }
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    let stem = strip_track_number(stem).trim();
    if stem.is_empty() {
        UNKNOWN_TRACK.to_string()
    } else {
        stem.to_string()
    }
}

fn strip_track_number(stem: &str) -> &str {
    let rest = stem.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == stem.len() {
        return stem;
    }
    let stripped = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '.');
    if stripped.len() == rest.len() {
        stem
    } else {
        stripped
    }
}

/// `M:SS` or `MM:SS` to seconds; anything else is 0.
pub fn parse_clock_duration(value: &str) -> u64 {
    let Some((minutes, seconds)) = value.trim().split_once(':') else {
        return 0;
    };
    match (minutes.trim().parse::<u64>(), seconds.trim().parse::<u64>()) {
        (Ok(minutes), Ok(seconds)) => minutes
            .checked_mul(60)
            .and_then(|minutes| minutes.checked_add(seconds))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Duration column that may hold either a clock string or a number of seconds.
pub fn duration_from_field(value: &str) -> u64 {
    if value.contains(':') {
        return parse_clock_duration(value);
    }
    number(value).and_then(to_u64).unwrap_or(0)
}

pub fn size_from_field(value: &str) -> u64 {
    let value = value.trim();
    if let Ok(bytes) = value.parse::<u64>() {
        return bytes;
    }
    number(value).and_then(to_u64).unwrap_or(0)
}

// Spreadsheet exports write missing cells as "nan".
fn text(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(value)
    }
}

fn number(value: &str) -> Option<f64> {
    let parsed = text(value)?.parse::<f64>().ok()?;
    if parsed.is_finite() && parsed >= 0.0 {
        Some(parsed)
    } else {
        None
    }
}

// `u64::MAX as f64` rounds up to 2^64, hence the strict bound.
fn to_u64(value: f64) -> Option<u64> {
    if value < u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

fn to_u32(value: f64) -> Option<u32> {
    if value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn to_i32(value: f64) -> Option<i32> {
    if value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::stable_hash;
    use std::time::Duration;

    const HEADER: &str = "\"mime_type\",\"artist\",\"album\",\"title\",\"file_name\",\"full_path\",\"track_number\",\"year\",\"genre\",\"length_seconds\",\"size_bytes\",\"tailscale_echoverse_url\"\n";

    fn write_inventory(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("{}{}", HEADER, body)).unwrap();
        path
    }

    fn set_age(path: &Path, seconds_ago: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(seconds_ago))
            .unwrap();
    }

    #[test]
    fn parses_audio_rows_only() {
        let body = concat!(
            "\"audio/mpeg\",\"AeroVista\",\"Neon Dreams\",\"Electric Night\",\"01 Electric Night.mp3\",\"M:/Albums/Neon Dreams/01 Electric Night.mp3\",\"1.0\",\"2024\",\"Synthwave\",\"208.4\",\"4450000\",\"\"\n",
            "\"image/jpeg\",\"AeroVista\",\"Neon Dreams\",\"\",\"cover.jpg\",\"M:/Albums/Neon Dreams/cover.jpg\",\"\",\"\",\"\",\"\",\"1200\",\"\"\n",
        );
        let data = format!("{}{}", HEADER, body);
        let tracks = parse_inventory(data.as_bytes()).unwrap();
        assert_eq!(tracks.len(), 1);

        let track = &tracks[0];
        assert_eq!(track.title, "Electric Night");
        assert_eq!(track.duration_seconds, 208);
        assert_eq!(track.duration, "3:28");
        assert_eq!(track.size_bytes, 4_450_000);
        assert_eq!(track.track_number, Some(1));
        assert_eq!(track.year, Some(2024));
        assert_eq!(track.genre.as_deref(), Some("Synthwave"));
        assert_eq!(track.remote_url, None);
        assert_eq!(track.artist_id, format!("artist_{}", stable_hash("AeroVista")));
        assert_eq!(
            track.album_id,
            format!("album_{}_{}", stable_hash("Neon Dreams"), stable_hash("AeroVista"))
        );
        assert!(track.id.starts_with(&format!("track_{}_", stable_hash("Electric Night"))));
    }

    #[test]
    fn missing_fields_default() {
        let data = "mime_type,full_path,length_seconds,size_bytes,remote_url\naudio/flac,/srv/x/03 - Pulse.flac,nan,n/a,https://remote.example/Albums/x/03.flac\n";
        let tracks = parse_inventory(data.as_bytes()).unwrap();
        let track = &tracks[0];
        assert_eq!(track.artist, "Unknown Artist");
        assert_eq!(track.album, "Unknown Album");
        assert_eq!(track.title, "Pulse");
        assert_eq!(track.file_name, "03 - Pulse.flac");
        assert_eq!(track.duration_seconds, 0);
        assert_eq!(track.size_bytes, 0);
        assert_eq!(track.cover_path, None);
        assert_eq!(
            track.remote_url.as_deref(),
            Some("https://remote.example/Albums/x/03.flac")
        );
    }

    #[test]
    fn rejects_inventory_without_media_type() {
        let data = "artist,album\nAeroVista,Neon Dreams\n";
        assert!(matches!(
            parse_inventory(data.as_bytes()),
            Err(CatalogError::MissingColumn("mime_type"))
        ));
    }

    #[test]
    fn skips_undecodable_rows() {
        let mut data = b"mime_type,title\naudio/mpeg,Good\naudio/mpeg,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\naudio/mpeg,Also Good\n");
        let tracks = parse_inventory(data.as_slice()).unwrap();
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Good", "Also Good"]);
    }

    #[test]
    fn title_falls_back_to_file_name() {
        assert_eq!(derive_title("Silicon Love", "x.mp3"), "Silicon Love");
        assert_eq!(derive_title("nan", "01 - Silicon Love.mp3"), "Silicon Love");
        assert_eq!(derive_title("", "02.Digital Heartbreak.mp3"), "Digital Heartbreak");
        assert_eq!(derive_title(" ", "2049.mp3"), "2049");
        assert_eq!(derive_title("", "Intro.mp3"), "Intro");
        assert_eq!(derive_title("", ""), "Unknown Track");
        assert_eq!(derive_title("", "07 .mp3"), "Unknown Track");
    }

    #[test]
    fn parses_durations_and_sizes() {
        assert_eq!(parse_clock_duration("3:45"), 225);
        assert_eq!(parse_clock_duration("0:00"), 0);
        assert_eq!(parse_clock_duration("12:05"), 725);
        assert_eq!(parse_clock_duration("225"), 0);
        assert_eq!(parse_clock_duration("x:45"), 0);
        assert_eq!(duration_from_field("225.9"), 225);
        assert_eq!(duration_from_field("4:12"), 252);
        assert_eq!(duration_from_field("-3"), 0);
        assert_eq!(duration_from_field("inf"), 0);
        assert_eq!(size_from_field("5120000"), 5_120_000);
        assert_eq!(size_from_field("6780000.0"), 6_780_000);
        assert_eq!(size_from_field("NaN"), 0);
        assert_eq!(size_from_field(""), 0);
    }

    #[test]
    fn oversized_numbers_become_zero() {
        assert_eq!(parse_clock_duration("400000000000000000:00"), 0);
        assert_eq!(parse_clock_duration("0:18446744073709551615"), u64::MAX);
        assert_eq!(duration_from_field("1e30"), 0);
        assert_eq!(size_from_field("1e30"), 0);
        assert_eq!(size_from_field("18446744073709551615"), u64::MAX);

        let data = "mime_type,album,title,length_seconds,size_bytes\naudio/mpeg,A,Long,400000000000000000:00,1e30\naudio/mpeg,A,Huge,1e30,1e30\n";
        let tracks = parse_inventory(data.as_bytes()).unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().all(|t| t.duration_seconds == 0 && t.size_bytes == 0));
    }

    #[test]
    fn latest_inventory_wins_across_roots() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let old = write_inventory(first.path(), "_inventory_2024.csv", "");
        let newer = write_inventory(second.path(), "music_catalog_2025.csv", "");
        let ignored = write_inventory(second.path(), "inventory_latest.csv", "");
        set_age(&old, 600);
        set_age(&newer, 60);
        set_age(&ignored, 0);

        let roots = vec![
            "/definitely/not/here".to_string(),
            first.path().to_string_lossy().to_string(),
            second.path().to_string_lossy().to_string(),
        ];
        assert_eq!(find_latest_inventory(&roots), Some(newer));
    }

    #[test]
    fn unreachable_roots_fall_back_to_sample() {
        let roots = vec!["/definitely/not/here".to_string()];
        let catalog = ingest(&roots);
        assert_eq!(catalog.source(), &CatalogSource::Sample);
        assert_eq!(catalog.tracks(), sample_tracks().as_slice());
        assert!(!catalog.tracks().is_empty());
    }

    #[test]
    fn unreadable_inventory_falls_back_to_sample() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_inventory_bad.csv"), "artist\nAeroVista\n").unwrap();
        let roots = vec![dir.path().to_string_lossy().to_string()];
        let (tracks, source) = ingest_tracks(&roots);
        assert_eq!(source, CatalogSource::Sample);
        assert_eq!(tracks.len(), sample_tracks().len());
    }

    #[test]
    fn ingests_inventory_with_covers() {
        let dir = tempfile::tempdir().unwrap();
        let album_dir = dir.path().join("Neon Dreams");
        fs::create_dir_all(&album_dir).unwrap();
        fs::write(album_dir.join("folder.png"), b"img").unwrap();
        let song = album_dir.join("01 Electric Night.mp3");
        let body = format!(
            "\"audio/mpeg\",\"AeroVista\",\"Neon Dreams\",\"\",\"01 Electric Night.mp3\",\"{}\",\"\",\"\",\"\",\"208\",\"4450000\",\"\"\n",
            song.display()
        );
        let path = write_inventory(dir.path(), "_inventory_1.csv", &body);
        let roots = vec![dir.path().to_string_lossy().to_string()];

        let catalog = ingest(&roots);
        assert_eq!(catalog.source(), &CatalogSource::Inventory { path });
        let track = &catalog.tracks()[0];
        assert_eq!(track.title, "Electric Night");
        let expected_cover = album_dir.join("folder.png").to_string_lossy().to_string();
        assert_eq!(track.cover_path.as_deref(), Some(expected_cover.as_str()));
        assert_eq!(
            catalog.album("Neon Dreams").and_then(|a| a.cover.as_deref()),
            Some(expected_cover.as_str())
        );
    }
}
