//! Error taxonomy for catalog requests and per-track processing.

use thiserror::Error;

/// Failure talking to the remote catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("catalog rejected credentials (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("catalog returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("response could not be decoded: {0}")]
    Decode(String),
}

/// Report bucket a failed track is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The catalog had nothing usable for the title.
    Unmatched,
    /// A network read or the final tag write failed.
    NetworkOrWrite,
}

/// Reason a single track was skipped. Never aborts the batch.
#[derive(Debug, Error)]
pub enum TrackFailure {
    #[error("no catalog match found")]
    NoMatchFound,
    #[error("top catalog match is missing `{0}`")]
    IncompleteMatch(&'static str),
    #[error("catalog search failed: {0}")]
    Search(CatalogError),
    #[error("cover art download failed: {0}")]
    CoverArt(CatalogError),
    #[error("tag write failed: {0}")]
    TagWrite(String),
}

impl TrackFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoMatchFound | Self::IncompleteMatch(_) => FailureKind::Unmatched,
            Self::Search(_) | Self::CoverArt(_) | Self::TagWrite(_) => FailureKind::NetworkOrWrite,
        }
    }
}
