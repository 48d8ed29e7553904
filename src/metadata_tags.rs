//! Existing-tag reader backed by `lofty`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use lofty::config::{ParseOptions, ParsingMode};
use lofty::file::{TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};
use log::debug;

const BEST_ATTEMPT_JUNK_LIMIT: usize = 1024;
const RELAXED_JUNK_LIMIT: usize = 64 * 1024;

fn existing_tag_parse_options(parsing_mode: ParsingMode, max_junk_bytes: usize) -> ParseOptions {
    ParseOptions::new()
        .read_properties(false)
        .read_cover_art(false)
        .parsing_mode(parsing_mode)
        .max_junk_bytes(max_junk_bytes)
}

/// File type from the extension, best-attempt parsing.
fn probe_by_extension(path: &Path) -> Result<TaggedFile, String> {
    Probe::open(path)
        .map_err(|err| format!("open failed: {err}"))?
        .options(existing_tag_parse_options(ParsingMode::BestAttempt, BEST_ATTEMPT_JUNK_LIMIT))
        .read()
        .map_err(|err| format!("best-attempt parse failed: {err}"))
}

/// File type guessed from content, relaxed parsing with a larger junk allowance.
fn probe_by_content(path: &Path) -> Result<TaggedFile, String> {
    let file = File::open(path).map_err(|err| format!("reopen failed: {err}"))?;
    Probe::new(BufReader::new(file))
        .options(existing_tag_parse_options(ParsingMode::Relaxed, RELAXED_JUNK_LIMIT))
        .guess_file_type()
        .map_err(|err| format!("content sniffing failed: {err}"))?
        .read()
        .map_err(|err| format!("relaxed parse failed: {err}"))
}

fn read_tagged_file(path: &Path) -> Option<TaggedFile> {
    let first_error = match probe_by_extension(path) {
        Ok(tagged_file) => return Some(tagged_file),
        Err(error) => error,
    };
    match probe_by_content(path) {
        Ok(tagged_file) => {
            debug!(
                "TagReader: recovered with relaxed parse path={} after {}",
                path.display(),
                first_error
            );
            Some(tagged_file)
        }
        Err(second_error) => {
            debug!(
                "TagReader: unreadable path={} ({}; {})",
                path.display(),
                first_error,
                second_error
            );
            None
        }
    }
}

/// Returns the file's ID3v2 tag, or `None` when the file has no readable
/// ID3v2 header.
pub fn read_id3v2_tag(path: &Path) -> Option<Tag> {
    let tagged_file = read_tagged_file(path)?;
    let tag = tagged_file.tag(TagType::Id3v2).cloned();
    if tag.is_none() {
        debug!("TagReader: no ID3v2 header present path={}", path.display());
    }
    tag
}

/// Reads the stored composer credit, if any.
pub fn read_existing_composer(path: &Path) -> Option<String> {
    let tag = read_id3v2_tag(path)?;
    tag.get_string(ItemKey::Composer)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
