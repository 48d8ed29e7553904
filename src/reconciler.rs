//! Catalog match extraction and tag-field reconciliation.
//!
//! Only the top-ranked search record is trusted. Every required field has its
//! own extractor, and a single missing field fails the whole track so that no
//! partial tag set ever reaches the writer.

use log::debug;
use serde_json::Value;

use crate::catalog::{CatalogSearch, SEARCH_RESULT_LIMIT};
use crate::errors::TrackFailure;
use crate::file_intake::CandidateTrack;
use crate::metadata_tags::read_existing_composer;

pub const ARTIST_SEPARATOR: &str = ", ";
pub const COMPOSER_SEPARATOR: char = '-';
/// Composer value written when the file carries no composer credit.
pub const MISSING_COMPOSER_PLACEHOLDER: &str = "None";

/// Fields extracted from the top catalog search record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    pub track_name: String,
    pub album_name: String,
    pub release_year: String,
    pub track_number: u32,
    pub total_tracks: u32,
    pub disc_number: u32,
    pub album_artist_name: String,
    pub cover_art_url: String,
    pub artist_names: Vec<String>,
}

/// Final field set written to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    pub title: String,
    pub performers: String,
    pub album: String,
    pub composer: String,
    pub album_artist: String,
    pub track_number: u32,
    pub track_total: u32,
    pub year: String,
    pub disc_number: u32,
    pub cover_art_url: String,
}

impl TagSet {
    pub fn track_position(&self) -> String {
        format!("{}/{}", self.track_number, self.track_total)
    }

    pub fn disc_position(&self) -> String {
        self.disc_number.to_string()
    }
}

fn field_at<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |value, segment| {
        match segment.parse::<usize>() {
            Ok(index) => value.get(index),
            Err(_) => value.get(*segment),
        }
    })
}

fn string_field(record: &Value, path: &[&str]) -> Option<String> {
    match field_at(record, path)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn number_field(record: &Value, path: &[&str]) -> Option<u32> {
    match field_at(record, path)? {
        Value::Number(number) => number.as_u64().and_then(|value| u32::try_from(value).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// First four characters of a catalog release date (`"2017-03-03"` -> `"2017"`).
pub fn release_year_from_date(release_date: &str) -> Option<String> {
    let year: String = release_date.chars().take(4).collect();
    if year.chars().count() == 4 {
        Some(year)
    } else {
        None
    }
}

/// Walks `artists[0..]` and stops at the first entry without a name.
pub fn collect_performer_credits(record: &Value) -> Vec<String> {
    let mut names = Vec::new();
    let mut index = 0usize;
    while let Some(name) = record
        .get("artists")
        .and_then(|artists| artists.get(index))
        .and_then(|artist| artist.get("name"))
        .and_then(Value::as_str)
    {
        names.push(name.to_string());
        index += 1;
    }
    names
}

/// Keeps the segment before the first `-` of a stored composer, trimmed.
/// A file without a composer credit gets the literal placeholder.
pub fn composer_from_existing(existing: Option<&str>) -> String {
    match existing {
        Some(value) => value
            .split(COMPOSER_SEPARATOR)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string(),
        None => MISSING_COMPOSER_PLACEHOLDER.to_string(),
    }
}

impl CatalogMatch {
    pub fn from_record(record: &Value) -> Result<Self, TrackFailure> {
        let track_name =
            string_field(record, &["name"]).ok_or(TrackFailure::IncompleteMatch("name"))?;
        let album_name = string_field(record, &["album", "name"])
            .ok_or(TrackFailure::IncompleteMatch("album.name"))?;
        let release_year = string_field(record, &["album", "release_date"])
            .as_deref()
            .and_then(release_year_from_date)
            .ok_or(TrackFailure::IncompleteMatch("album.release_date"))?;
        let track_number = number_field(record, &["track_number"])
            .ok_or(TrackFailure::IncompleteMatch("track_number"))?;
        let total_tracks = number_field(record, &["album", "total_tracks"])
            .ok_or(TrackFailure::IncompleteMatch("album.total_tracks"))?;
        let disc_number = number_field(record, &["disc_number"])
            .ok_or(TrackFailure::IncompleteMatch("disc_number"))?;
        let album_artist_name = string_field(record, &["album", "artists", "0", "name"])
            .ok_or(TrackFailure::IncompleteMatch("album.artists[0].name"))?;
        let cover_art_url = string_field(record, &["album", "images", "0", "url"])
            .ok_or(TrackFailure::IncompleteMatch("album.images[0].url"))?;
        let artist_names = collect_performer_credits(record);
        if artist_names.is_empty() {
            return Err(TrackFailure::IncompleteMatch("artists"));
        }

        Ok(Self {
            track_name,
            album_name,
            release_year,
            track_number,
            total_tracks,
            disc_number,
            album_artist_name,
            cover_art_url,
            artist_names,
        })
    }

    pub fn into_tag_set(self, composer: String) -> TagSet {
        TagSet {
            title: self.track_name,
            performers: self.artist_names.join(ARTIST_SEPARATOR),
            album: self.album_name,
            composer,
            album_artist: self.album_artist_name,
            track_number: self.track_number,
            track_total: self.total_tracks,
            year: self.release_year,
            disc_number: self.disc_number,
            cover_art_url: self.cover_art_url,
        }
    }
}

/// Looks the candidate up in the catalog and builds its tag set. The file is
/// only read here; nothing is written.
pub fn reconcile_track<S: CatalogSearch + ?Sized>(
    candidate: &CandidateTrack,
    catalog: &mut S,
) -> Result<TagSet, TrackFailure> {
    let records = catalog
        .search_tracks(&candidate.display_title, SEARCH_RESULT_LIMIT)
        .map_err(TrackFailure::Search)?;
    let top_record = records.first().ok_or(TrackFailure::NoMatchFound)?;
    let catalog_match = CatalogMatch::from_record(top_record)?;
    debug!(
        "Reconciler: matched title={:?} track={:?} album={:?}",
        candidate.display_title, catalog_match.track_name, catalog_match.album_name
    );

    let existing_composer = read_existing_composer(&candidate.source_path);
    let composer = composer_from_existing(existing_composer.as_deref());
    Ok(catalog_match.into_tag_set(composer))
}
