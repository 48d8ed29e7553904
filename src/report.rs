//! End-of-run summary text.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::errors::FailureKind;
use crate::file_intake::IntakeOutcome;
use crate::pipeline::{BatchOutcome, FailedTrack};

#[derive(Debug, Default)]
pub struct RunReport {
    pub wrong_extension: Vec<PathBuf>,
    pub unprocessable: Vec<PathBuf>,
    pub failed: Vec<FailedTrack>,
    pub tagged: usize,
}

impl RunReport {
    pub fn from_parts(intake: IntakeOutcome, batch: BatchOutcome) -> Self {
        Self {
            wrong_extension: intake.wrong_extension,
            unprocessable: intake.unprocessable,
            failed: batch.failed,
            tagged: batch.tagged,
        }
    }

    fn failures_of_kind(&self, kind: FailureKind) -> impl Iterator<Item = &FailedTrack> {
        self.failed
            .iter()
            .filter(move |failed| failed.failure.kind() == kind)
    }

    pub fn has_problems(&self) -> bool {
        !self.wrong_extension.is_empty() || !self.unprocessable.is_empty() || !self.failed.is_empty()
    }

    /// Renders the summary; sections with nothing to list are left out.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Run complete! Tagged {} track(s), skipped {}.\n",
            self.tagged,
            self.failed.len()
        );

        if !self.wrong_extension.is_empty() {
            out.push_str(
                "One or more of the selected files are not MP3 files. Run again with only MP3 files:\n",
            );
            for path in &self.wrong_extension {
                let _ = writeln!(out, "{}", path.display());
            }
            out.push('\n');
        }

        if !self.unprocessable.is_empty() {
            out.push_str("A track title could not be read from these file names:\n");
            for path in &self.unprocessable {
                let _ = writeln!(out, "{}", path.display());
            }
            out.push('\n');
        }

        let mut unmatched = self.failures_of_kind(FailureKind::Unmatched).peekable();
        if unmatched.peek().is_some() {
            out.push_str(
                "Spotify was unable to find one or more of your songs, or was unable to get all \
                 relevant song data for those tracks. Skipped tracks:\n",
            );
            for failed in unmatched {
                let _ = writeln!(out, "{}", failed.candidate.display_title);
            }
            out.push('\n');
        }

        let mut io_failures = self.failures_of_kind(FailureKind::NetworkOrWrite).peekable();
        if io_failures.peek().is_some() {
            out.push_str("These tracks could not be tagged because of a network or file error:\n");
            for failed in io_failures {
                let _ = writeln!(
                    out,
                    "{} ({})",
                    failed.candidate.display_title, failed.failure
                );
            }
            out.push('\n');
        }

        out.push_str("Thank you for using the MP3 Metadata Autofiller.\n");
        out
    }
}
