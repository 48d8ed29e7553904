//! Writes a reconciled tag set and its cover art into an MP3 file.

use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::tag::{ItemKey, Tag, TagType};
use log::{debug, warn};

use crate::catalog::CoverArtSource;
use crate::errors::TrackFailure;
use crate::file_intake::CandidateTrack;
use crate::reconciler::TagSet;

const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];
const COVER_DESCRIPTION: &str = "Cover";
/// Tag blocks that would otherwise keep stale values next to the new ID3v2 tag.
const LEGACY_TAG_TYPES: [TagType; 2] = [TagType::Id3v1, TagType::Ape];

pub fn looks_like_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SIGNATURE)
}

fn build_front_cover(image_bytes: Vec<u8>) -> Picture {
    Picture::unchecked(image_bytes)
        .pic_type(PictureType::CoverFront)
        .mime_type(MimeType::Jpeg)
        .description(COVER_DESCRIPTION)
        .build()
}

/// Builds a fresh ID3v2 tag holding every reconciled field and the cover.
pub fn build_id3v2_tag(tag_set: &TagSet, cover_art: Vec<u8>) -> Tag {
    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_title(tag_set.title.clone());
    tag.set_artist(tag_set.performers.clone());
    tag.set_album(tag_set.album.clone());
    tag.insert_text(ItemKey::Composer, tag_set.composer.clone());
    tag.insert_text(ItemKey::AlbumArtist, tag_set.album_artist.clone());
    tag.set_track(tag_set.track_number);
    tag.set_track_total(tag_set.track_total);
    tag.insert_text(ItemKey::RecordingDate, tag_set.year.clone());
    tag.set_disk(tag_set.disc_number);
    tag.push_picture(build_front_cover(cover_art));
    tag
}

/// Downloads the cover, then replaces the file's ID3v2 block with the
/// reconciled fields and strips any ID3v1/APE block. A failed download leaves
/// the file untouched.
pub fn write_reconciled_track<A: CoverArtSource + ?Sized>(
    candidate: &CandidateTrack,
    tag_set: &TagSet,
    cover_source: &mut A,
) -> Result<(), TrackFailure> {
    let cover_art = cover_source
        .fetch_cover_art(&tag_set.cover_art_url)
        .map_err(TrackFailure::CoverArt)?;
    if !looks_like_jpeg(&cover_art) {
        warn!(
            "TagWriter: cover art is not JPEG, embedding as declared JPEG anyway url={}",
            tag_set.cover_art_url
        );
    }
    debug!(
        "TagWriter: writing path={} track={} disc={} cover_bytes={}",
        candidate.source_path.display(),
        tag_set.track_position(),
        tag_set.disc_position(),
        cover_art.len()
    );

    let tag = build_id3v2_tag(tag_set, cover_art);
    tag.save_to_path(
        &candidate.source_path,
        WriteOptions::default().use_id3v23(true),
    )
    .map_err(|error| TrackFailure::TagWrite(format!("Failed to write tags: {error}")))?;

    for legacy_type in LEGACY_TAG_TYPES {
        legacy_type
            .remove_from_path(&candidate.source_path)
            .map_err(|error| {
                TrackFailure::TagWrite(format!("Failed to remove {legacy_type:?} tag: {error}"))
            })?;
    }
    Ok(())
}
