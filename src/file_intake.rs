//! Selected-path intake: turns chosen files into candidate tracks.

use std::path::{Path, PathBuf};

use log::debug;

/// Literal file-name suffix accepted for tagging. Matched case-sensitively.
pub const SUPPORTED_AUDIO_EXTENSION: &str = ".mp3";

/// One selected file whose name is used as the catalog search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTrack {
    pub display_title: String,
    pub source_path: PathBuf,
}

/// Selected paths partitioned into the three intake buckets, input order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub candidates: Vec<CandidateTrack>,
    pub wrong_extension: Vec<PathBuf>,
    /// Paths with the right suffix whose title could not be derived.
    pub unprocessable: Vec<PathBuf>,
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Derives the search title from a file name: everything before the first
/// extension marker, trimmed. Returns `None` when nothing usable remains.
pub fn display_title_from_file_name(file_name: &str) -> Option<String> {
    let marker_index = file_name.find(SUPPORTED_AUDIO_EXTENSION)?;
    let title = file_name[..marker_index].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Splits selected paths into candidates, wrong-extension rejects, and
/// unprocessable names. Pure: the filesystem is not consulted.
pub fn partition_selected_paths(paths: &[PathBuf]) -> IntakeOutcome {
    let mut outcome = IntakeOutcome::default();

    for path in paths {
        let lossy_name = file_name_lossy(path);
        if !lossy_name.ends_with(SUPPORTED_AUDIO_EXTENSION) {
            debug!("Intake: wrong extension path={}", path.display());
            outcome.wrong_extension.push(path.clone());
            continue;
        }

        let title = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(display_title_from_file_name);
        match title {
            Some(display_title) => outcome.candidates.push(CandidateTrack {
                display_title,
                source_path: path.clone(),
            }),
            None => {
                debug!("Intake: no usable title path={}", path.display());
                outcome.unprocessable.push(path.clone());
            }
        }
    }

    outcome
}

/// Opens the native multi-file chooser. A cancelled dialog yields no paths.
pub fn pick_input_files() -> Vec<PathBuf> {
    debug!("Opening file dialog");
    rfd::FileDialog::new()
        .set_title("Select the MP3 file(s) to fill in metadata for")
        .add_filter("MP3 Files", &["mp3"])
        .add_filter("All Files", &["*"])
        .pick_files()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{
        display_title_from_file_name, partition_selected_paths, CandidateTrack,
        SUPPORTED_AUDIO_EXTENSION,
    };
    use std::path::PathBuf;

    #[test]
    fn test_display_title_strips_extension_and_whitespace() {
        assert_eq!(
            display_title_from_file_name("  Shape of You .mp3"),
            Some("Shape of You".to_string())
        );
    }

    #[test]
    fn test_display_title_cuts_at_first_extension_marker() {
        assert_eq!(
            display_title_from_file_name("Intro.mp3 (remix).mp3"),
            Some("Intro".to_string())
        );
    }

    #[test]
    fn test_display_title_rejects_bare_extension() {
        assert_eq!(display_title_from_file_name(".mp3"), None);
        assert_eq!(display_title_from_file_name("   .mp3"), None);
    }

    #[test]
    fn test_partition_keeps_input_order_in_every_bucket() {
        let paths = vec![
            PathBuf::from("/music/B Side.mp3"),
            PathBuf::from("/music/cover.jpg"),
            PathBuf::from("/music/A Side.mp3"),
            PathBuf::from("/music/.mp3"),
            PathBuf::from("/music/notes.txt"),
        ];

        let outcome = partition_selected_paths(&paths);

        assert_eq!(
            outcome.candidates,
            vec![
                CandidateTrack {
                    display_title: "B Side".to_string(),
                    source_path: PathBuf::from("/music/B Side.mp3"),
                },
                CandidateTrack {
                    display_title: "A Side".to_string(),
                    source_path: PathBuf::from("/music/A Side.mp3"),
                },
            ]
        );
        assert_eq!(
            outcome.wrong_extension,
            vec![
                PathBuf::from("/music/cover.jpg"),
                PathBuf::from("/music/notes.txt")
            ]
        );
        assert_eq!(outcome.unprocessable, vec![PathBuf::from("/music/.mp3")]);
    }

    #[test]
    fn test_partition_extension_check_is_case_sensitive() {
        let paths = vec![
            PathBuf::from("/music/LOUD.MP3"),
            PathBuf::from("/music/Mixed.Mp3"),
        ];

        let outcome = partition_selected_paths(&paths);

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.wrong_extension, paths);
    }

    #[test]
    fn test_partition_invariants_hold_for_mixed_input() {
        let paths: Vec<PathBuf> = [
            "a.mp3",
            " spaced out .mp3",
            "x.mp3.bak",
            "y.flac",
            "noext",
            "dir/z.mp3",
            "weird.mp3.mp3",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let outcome = partition_selected_paths(&paths);

        for candidate in &outcome.candidates {
            let name = candidate
                .source_path
                .file_name()
                .and_then(|name| name.to_str())
                .expect("candidate names are utf-8");
            assert!(name.ends_with(SUPPORTED_AUDIO_EXTENSION));
            assert!(!candidate.display_title.contains(SUPPORTED_AUDIO_EXTENSION));
            assert_eq!(candidate.display_title, candidate.display_title.trim());
        }
        for rejected in &outcome.wrong_extension {
            assert!(!rejected
                .to_string_lossy()
                .ends_with(SUPPORTED_AUDIO_EXTENSION));
        }
        assert_eq!(outcome.candidates.len(), 4);
        assert_eq!(outcome.wrong_extension.len(), 3);
    }

    #[test]
    fn test_empty_selection_yields_empty_outcome() {
        let outcome = partition_selected_paths(&[]);
        assert!(outcome.candidates.is_empty());
        assert!(outcome.wrong_extension.is_empty());
        assert!(outcome.unprocessable.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_with_extension_is_unprocessable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.mp3");
        let path = PathBuf::from("/music").join(name);

        let outcome = partition_selected_paths(std::slice::from_ref(&path));

        assert!(outcome.candidates.is_empty());
        assert!(outcome.wrong_extension.is_empty());
        assert_eq!(outcome.unprocessable, vec![path]);
    }
}
