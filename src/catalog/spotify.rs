//! Spotify Web API catalog client backed by `ureq`.

use std::io::Read;
use std::time::{Duration, Instant};

use log::{debug, info};
use serde_json::Value;

use crate::catalog::{CatalogCredentials, CatalogSearch, CoverArtSource};
use crate::config::{CatalogConfig, NetworkConfig};
use crate::errors::CatalogError;

/// Upper bound on a single cover-art download.
pub const MAX_COVER_ART_BYTES: u64 = 16 * 1024 * 1024;
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Authorized Spotify client used for track search and image downloads.
pub struct SpotifyCatalog {
    http_client: ureq::Agent,
    credentials: CatalogCredentials,
    token_endpoint: String,
    search_endpoint: String,
    access_token: Option<AccessToken>,
}

impl SpotifyCatalog {
    /// Creates a client; no request is made until `authorize` or the first search.
    pub fn new(
        credentials: CatalogCredentials,
        catalog: &CatalogConfig,
        network: &NetworkConfig,
    ) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(network.connect_timeout_secs))
            .timeout_read(Duration::from_secs(network.read_timeout_secs))
            .timeout_write(Duration::from_secs(network.write_timeout_secs))
            .build();
        Self {
            http_client,
            credentials,
            token_endpoint: catalog.token_endpoint.clone(),
            search_endpoint: catalog.search_endpoint.clone(),
            access_token: None,
        }
    }

    /// Exchanges client credentials for an access token.
    pub fn authorize(&mut self) -> Result<(), CatalogError> {
        let response = self
            .http_client
            .post(&self.token_endpoint)
            .send_form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .map_err(classify_ureq_failure)?;
        let payload: Value = response
            .into_json()
            .map_err(|err| CatalogError::Decode(format!("token response: {err}")))?;
        let (value, lifetime) = parse_token_response(&payload)?;
        info!(
            "SpotifyCatalog: authorized client_id={} lifetime={:?}",
            self.credentials.client_id, lifetime
        );
        self.access_token = Some(AccessToken {
            value,
            expires_at: Instant::now() + lifetime,
        });
        Ok(())
    }

    fn bearer_token(&mut self) -> Result<String, CatalogError> {
        let fresh = self
            .access_token
            .as_ref()
            .is_some_and(|token| token.is_fresh(Instant::now()));
        if !fresh {
            debug!("SpotifyCatalog: access token missing or expiring, re-authorizing");
            self.authorize()?;
        }
        self.access_token
            .as_ref()
            .map(|token| format!("Bearer {}", token.value))
            .ok_or_else(|| CatalogError::Decode("token exchange produced no token".to_string()))
    }
}

impl CatalogSearch for SpotifyCatalog {
    fn search_tracks(&mut self, query: &str, limit: usize) -> Result<Vec<Value>, CatalogError> {
        let authorization = self.bearer_token()?;
        let url = search_url(&self.search_endpoint, query, limit);
        debug!("SpotifyCatalog: search query={:?} limit={}", query, limit);
        let response = self
            .http_client
            .get(&url)
            .set("Authorization", &authorization)
            .call()
            .map_err(classify_ureq_failure)?;
        let payload: Value = response.into_json().map_err(|err| {
            if is_io_timeout(&err) {
                CatalogError::Timeout(format!("search body read: {err}"))
            } else {
                CatalogError::Decode(format!("search response: {err}"))
            }
        })?;
        search_items(payload)
    }
}

impl CoverArtSource for SpotifyCatalog {
    fn fetch_cover_art(&mut self, url: &str) -> Result<Vec<u8>, CatalogError> {
        debug!("SpotifyCatalog: downloading cover art url={}", url);
        let response = self
            .http_client
            .get(url)
            .call()
            .map_err(classify_ureq_failure)?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_COVER_ART_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| {
                if is_io_timeout(&err) {
                    CatalogError::Timeout(format!("image read: {err}"))
                } else {
                    CatalogError::Transport(format!("image read: {err}"))
                }
            })?;
        if bytes.is_empty() {
            return Err(CatalogError::Decode("image response was empty".to_string()));
        }
        if bytes.len() as u64 > MAX_COVER_ART_BYTES {
            return Err(CatalogError::Decode(format!(
                "image exceeds {MAX_COVER_ART_BYTES} bytes"
            )));
        }
        Ok(bytes)
    }
}

/// Builds the track-search URL for one title query.
pub fn search_url(endpoint: &str, query: &str, limit: usize) -> String {
    format!(
        "{}?q={}&type=track&limit={}",
        endpoint.trim().trim_end_matches('/'),
        urlencoding::encode(query),
        limit
    )
}

fn parse_token_response(payload: &Value) -> Result<(String, Duration), CatalogError> {
    let value = payload
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| CatalogError::Decode("token response missing access_token".to_string()))?;
    let lifetime_secs = payload
        .get("expires_in")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Ok((value.to_string(), Duration::from_secs(lifetime_secs)))
}

fn search_items(payload: Value) -> Result<Vec<Value>, CatalogError> {
    match payload
        .get("tracks")
        .and_then(|tracks| tracks.get("items"))
        .and_then(Value::as_array)
    {
        Some(items) => Ok(items.clone()),
        None => Err(CatalogError::Decode(
            "search response missing tracks.items".to_string(),
        )),
    }
}

/// Pulls a human-readable message out of either Spotify error body shape.
fn error_message_from_body(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let api_message = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str);
    let oauth_message = parsed
        .get("error_description")
        .and_then(Value::as_str)
        .or_else(|| parsed.get("error").and_then(Value::as_str));
    api_message
        .or(oauth_message)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

fn classify_ureq_failure(error: ureq::Error) -> CatalogError {
    match error {
        ureq::Error::Status(status, response) => {
            let message = error_message_from_body(&response.into_string().unwrap_or_default());
            match status {
                401 | 403 => CatalogError::Unauthorized { status, message },
                408 | 500 | 502 | 503 | 504 => {
                    CatalogError::Timeout(format!("HTTP {status}: {message}"))
                }
                _ => CatalogError::Status { status, message },
            }
        }
        ureq::Error::Transport(transport) => {
            let message = transport.to_string();
            let lowered = message.to_ascii_lowercase();
            if lowered.contains("timed out") || lowered.contains("timeout") {
                CatalogError::Timeout(message)
            } else {
                CatalogError::Transport(message)
            }
        }
    }
}

fn is_io_timeout(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    ) || error.to_string().to_ascii_lowercase().contains("timed out")
}
