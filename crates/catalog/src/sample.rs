use common::{assign_id, format_duration, IdKind, Track};

use crate::config::DEFAULT_REMOTE_BASE_URL;

const SAMPLE_ARTIST: &str = "AeroVista";

// (album, file name, title, seconds, bytes)
const SAMPLE_ROWS: [(&str, &str, &str, u64, u64); 3] = [
    ("Synthetic Souls", "01 Silicon Love.mp3", "Silicon Love", 225, 5_120_000),
    ("Synthetic Souls", "02 Digital Heartbreak.mp3", "Digital Heartbreak", 252, 6_780_000),
    ("Neon Dreams", "01 Electric Night.mp3", "Electric Night", 208, 4_450_000),
];

/// Fixed catalog served when no inventory is reachable.
pub fn sample_tracks() -> Vec<Track> {
    let artist_id = assign_id(IdKind::Artist, SAMPLE_ARTIST, None);
    SAMPLE_ROWS
        .iter()
        .enumerate()
        .map(|(idx, (album, file_name, title, seconds, bytes))| {
            let album_id = assign_id(IdKind::Album, album, Some(&artist_id));
            let relative = format!("{}/{}", album, file_name);
            Track {
                id: assign_id(IdKind::Track, title, Some(&album_id)),
                album_id,
                artist_id: artist_id.clone(),
                artist: SAMPLE_ARTIST.to_string(),
                album: album.to_string(),
                title: title.to_string(),
                duration_seconds: *seconds,
                duration: format_duration(*seconds),
                size_bytes: *bytes,
                source_path: format!("M:/Albums/{}", relative),
                cover_path: Some(format!("M:/Albums/{}/cover.jpg", album)),
                remote_url: Some(format!("{}{}", DEFAULT_REMOTE_BASE_URL, relative)),
                file_name: file_name.to_string(),
                track_number: Some(if idx == 1 { 2 } else { 1 }),
                year: None,
                genre: None,
                bitrate: None,
                sample_rate: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_deterministic() {
        assert_eq!(sample_tracks(), sample_tracks());
    }

    #[test]
    fn sample_shape() {
        let tracks = sample_tracks();
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Silicon Love", "Digital Heartbreak", "Electric Night"]);
        assert_eq!(tracks[0].duration, "3:45");
        assert_eq!(tracks[1].duration, "4:12");
        assert_eq!(tracks[2].duration, "3:28");
        assert_eq!(tracks[0].album_id, tracks[1].album_id);
        assert_ne!(tracks[0].album_id, tracks[2].album_id);
        assert_eq!(
            tracks[2].source_path,
            "M:/Albums/Neon Dreams/01 Electric Night.mp3"
        );
    }
}
