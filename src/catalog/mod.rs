//! Catalog collaborator abstractions and the concrete Spotify client.

pub mod spotify;

use serde_json::Value;

use crate::errors::CatalogError;

/// Number of ranked results requested per title; only the first is trusted.
pub const SEARCH_RESULT_LIMIT: usize = 1;

/// Credentials for the catalog's client-credentials authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl CatalogCredentials {
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

/// Ranked track search. Records are returned raw so field extraction stays
/// with the reconciler.
pub trait CatalogSearch {
    fn search_tracks(&mut self, query: &str, limit: usize) -> Result<Vec<Value>, CatalogError>;
}

/// Downloads cover-art bytes for a catalog image URL.
pub trait CoverArtSource {
    fn fetch_cover_art(&mut self, url: &str) -> Result<Vec<u8>, CatalogError>;
}
