//! Sequential per-track driver: reconcile, then write.

use log::{info, warn};

use crate::catalog::{CatalogSearch, CoverArtSource};
use crate::errors::TrackFailure;
use crate::file_intake::CandidateTrack;
use crate::reconciler::reconcile_track;
use crate::tag_writer::write_reconciled_track;

#[derive(Debug)]
pub struct FailedTrack {
    pub candidate: CandidateTrack,
    pub failure: TrackFailure,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub failed: Vec<FailedTrack>,
    pub tagged: usize,
}

fn process_track<C>(candidate: &CandidateTrack, catalog: &mut C) -> Result<(), TrackFailure>
where
    C: CatalogSearch + CoverArtSource + ?Sized,
{
    let tag_set = reconcile_track(candidate, catalog)?;
    write_reconciled_track(candidate, &tag_set, catalog)
}

/// Processes every candidate in order. A failed track is recorded and the
/// batch moves on.
pub fn run_batch<C>(candidates: Vec<CandidateTrack>, catalog: &mut C) -> BatchOutcome
where
    C: CatalogSearch + CoverArtSource + ?Sized,
{
    let mut outcome = BatchOutcome::default();
    let total = candidates.len();

    for (index, candidate) in candidates.into_iter().enumerate() {
        match process_track(&candidate, catalog) {
            Ok(()) => {
                println!(
                    "Added metadata to {} successfully!",
                    candidate.display_title
                );
                info!(
                    "Pipeline: tagged {}/{} path={}",
                    index + 1,
                    total,
                    candidate.source_path.display()
                );
                outcome.tagged += 1;
            }
            Err(failure) => {
                println!("Failed to add metadata to {}!", candidate.display_title);
                warn!(
                    "Pipeline: skipped {}/{} path={}: {}",
                    index + 1,
                    total,
                    candidate.source_path.display(),
                    failure
                );
                outcome.failed.push(FailedTrack { candidate, failure });
            }
        }
    }

    outcome
}
