use std::collections::HashMap;

use common::{Album, Track};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Albums keyed by their exact name, kept in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct AlbumMap {
    albums: Vec<Album>,
    index: HashMap<String, usize>,
}

impl AlbumMap {
    pub fn get(&self, name: &str) -> Option<&Album> {
        self.index.get(name).map(|&idx| &self.albums[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Album> {
        self.albums.iter()
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    fn entry(&mut self, track: &Track) -> &mut Album {
        let idx = match self.index.get(&track.album) {
            Some(&idx) => idx,
            None => {
                let idx = self.albums.len();
                self.albums.push(Album {
                    id: track.album_id.clone(),
                    artist_id: track.artist_id.clone(),
                    name: track.album.clone(),
                    artist: track.artist.clone(),
                    tracks: Vec::new(),
                    total_duration_seconds: 0,
                    total_size_bytes: 0,
                    cover: None,
                });
                self.index.insert(track.album.clone(), idx);
                idx
            }
        };
        &mut self.albums[idx]
    }
}

impl Serialize for AlbumMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.albums.len()))?;
        for album in &self.albums {
            map.serialize_entry(&album.name, album)?;
        }
        map.end()
    }
}

/// Groups tracks by album name in ingestion order. The first track with a cover sets the
/// album cover and later tracks never replace it.
pub fn aggregate(tracks: &[Track]) -> AlbumMap {
    let mut albums = AlbumMap::default();
    for track in tracks {
        let album = albums.entry(track);
        album.total_duration_seconds = album
            .total_duration_seconds
            .saturating_add(track.duration_seconds);
        album.total_size_bytes = album.total_size_bytes.saturating_add(track.size_bytes);
        if album.cover.is_none() {
            album.cover = track.cover_path.clone();
        }
        album.tracks.push(track.clone());
    }
    albums
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_tracks;

    fn track(album: &str, title: &str, cover: Option<&str>) -> Track {
        let mut track = sample_tracks().remove(0);
        track.album = album.to_string();
        track.title = title.to_string();
        track.cover_path = cover.map(str::to_string);
        track
    }

    #[test]
    fn totals_accumulate_per_album() {
        let albums = aggregate(&sample_tracks());
        let souls = albums.get("Synthetic Souls").expect("album");
        assert_eq!(souls.total_size_bytes, 11_900_000);
        assert_eq!(souls.total_duration_seconds, 477);
        assert_eq!(souls.tracks.len(), 2);
        assert_eq!(souls.tracks[0].title, "Silicon Love");
        assert_eq!(souls.id, souls.tracks[0].album_id);
        assert_eq!(souls.artist_id, souls.tracks[0].artist_id);
    }

    #[test]
    fn albums_keep_first_seen_order() {
        let albums = aggregate(&sample_tracks());
        let names: Vec<&str> = albums.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Synthetic Souls", "Neon Dreams"]);
    }

    #[test]
    fn first_discovered_cover_wins() {
        let tracks = vec![
            track("X", "one", None),
            track("X", "two", Some("/x/second.jpg")),
            track("X", "three", Some("/x/third.jpg")),
        ];
        let albums = aggregate(&tracks);
        assert_eq!(albums.get("X").and_then(|a| a.cover.as_deref()), Some("/x/second.jpg"));
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut first = track("A", "one", None);
        first.size_bytes = u64::MAX;
        first.duration_seconds = u64::MAX;
        let mut second = track("A", "two", None);
        second.size_bytes = u64::MAX;
        second.duration_seconds = 5;
        let albums = aggregate(&[first, second]);
        let album = albums.get("A").expect("album");
        assert_eq!(album.total_size_bytes, u64::MAX);
        assert_eq!(album.total_duration_seconds, u64::MAX);
    }

    // Grouping is by exact album name only; same-named albums from different artists merge.
    #[test]
    fn grouping_is_case_sensitive_and_ignores_artist() {
        let mut other = track("X", "b", None);
        other.artist = "Someone Else".to_string();
        let tracks = vec![track("X", "a", None), other, track("x", "c", None)];
        let albums = aggregate(&tracks);
        assert_eq!(albums.len(), 2);
        assert_eq!(albums.get("X").map(|a| a.tracks.len()), Some(2));
        assert_eq!(albums.get("X").map(|a| a.artist.as_str()), Some("AeroVista"));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let albums = aggregate(&sample_tracks());
        let json = serde_json::to_string(&albums).unwrap();
        let souls = json.find("\"Synthetic Souls\":").expect("key");
        let neon = json.find("\"Neon Dreams\":").expect("key");
        assert!(souls < neon);
    }
}
