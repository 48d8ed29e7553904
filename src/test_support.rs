//! Fixtures shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

use crate::catalog::{CatalogSearch, CoverArtSource};
use crate::errors::CatalogError;
use crate::file_intake::CandidateTrack;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no padding.
const MPEG_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const MPEG_FRAME_LEN: usize = 417;
const MPEG_FRAME_COUNT: usize = 8;

/// Smallest well-formed JPEG prefix the tag writer recognizes.
pub const JPEG_FIXTURE: [u8; 12] = [
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0xFF, 0xD9,
];

fn nonce() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be valid")
        .as_nanos()
}

pub fn unique_temp_mp3_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("autofiller_{name}_{}.mp3", nonce()))
}

pub fn unique_temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("autofiller_{name}_{}", nonce()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

pub fn silent_mpeg_frames() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(MPEG_FRAME_LEN * MPEG_FRAME_COUNT);
    for _ in 0..MPEG_FRAME_COUNT {
        bytes.extend_from_slice(&MPEG_FRAME_HEADER);
        bytes.extend(std::iter::repeat_n(0u8, MPEG_FRAME_LEN - MPEG_FRAME_HEADER.len()));
    }
    bytes
}

/// Writes an untagged file made only of silent MPEG frames.
pub fn write_silent_mp3(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, silent_mpeg_frames())
}

pub fn candidate_for(path: &Path, display_title: &str) -> CandidateTrack {
    CandidateTrack {
        display_title: display_title.to_string(),
        source_path: path.to_path_buf(),
    }
}

/// Builds a search record shaped like a Spotify track object.
#[allow(clippy::too_many_arguments)]
pub fn spotify_track_record(
    name: &str,
    album: &str,
    release_date: &str,
    track_number: u32,
    total_tracks: u32,
    disc_number: u32,
    artists: &[&str],
    cover_url: &str,
) -> Value {
    let artist_values: Vec<Value> = artists
        .iter()
        .map(|artist| json!({ "name": artist, "type": "artist" }))
        .collect();
    json!({
        "name": name,
        "track_number": track_number,
        "disc_number": disc_number,
        "artists": artist_values,
        "album": {
            "name": album,
            "release_date": release_date,
            "total_tracks": total_tracks,
            "artists": [ { "name": artists.first().copied().unwrap_or_default() } ],
            "images": [ { "url": cover_url, "height": 640, "width": 640 } ]
        }
    })
}

pub fn shape_of_you_record() -> Value {
    spotify_track_record(
        "Shape of You",
        "÷",
        "2017-03-03",
        4,
        16,
        1,
        &["Ed Sheeran"],
        "https://i.scdn.co/image/shape-of-you",
    )
}

/// In-memory catalog: search results keyed by query, images keyed by URL.
#[derive(Default)]
pub struct FakeCatalog {
    pub results: HashMap<String, Vec<Value>>,
    pub images: HashMap<String, Vec<u8>>,
    pub search_failures: VecDeque<CatalogError>,
    pub queries: Vec<String>,
    pub fetched_urls: Vec<String>,
}

impl FakeCatalog {
    pub fn with_record(mut self, query: &str, record: Value) -> Self {
        self.results
            .entry(query.to_string())
            .or_default()
            .push(record);
        self
    }

    pub fn with_image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }
}

impl CatalogSearch for FakeCatalog {
    fn search_tracks(&mut self, query: &str, limit: usize) -> Result<Vec<Value>, CatalogError> {
        self.queries.push(query.to_string());
        if let Some(failure) = self.search_failures.pop_front() {
            return Err(failure);
        }
        Ok(self
            .results
            .get(query)
            .map(|records| records.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

impl CoverArtSource for FakeCatalog {
    fn fetch_cover_art(&mut self, url: &str) -> Result<Vec<u8>, CatalogError> {
        self.fetched_urls.push(url.to_string());
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::Status {
                status: 404,
                message: format!("no image at {url}"),
            })
    }
}
