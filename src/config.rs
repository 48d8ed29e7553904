//! Persistent configuration model, defaults, and loading.

use std::path::{Path, PathBuf};

use log::info;

pub const CONFIG_DIR_NAME: &str = "autofiller";
pub const CONFIG_FILE_NAME: &str = "config.toml";
const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 120;

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Catalog service account and endpoints.
    pub catalog: CatalogConfig,
    #[serde(default)]
    /// HTTP timeouts shared by every catalog request.
    pub network: NetworkConfig,
}

/// Catalog account and endpoint settings (the secret normally lives in the keyring).
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub client_id: String,
    /// Plain-text fallback; left empty when the OS keyring holds the secret.
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct NetworkConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_endpoint: default_token_endpoint(),
            search_endpoint: default_search_endpoint(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

fn default_token_endpoint() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_search_endpoint() -> String {
    "https://api.spotify.com/v1/search".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    15
}

fn default_write_timeout_secs() -> u64 {
    15
}

/// Commented template written when no config file exists yet.
pub fn system_config_template_text() -> &'static str {
    include_str!("../config/config.system.toml")
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|root| root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn trimmed_or_default(value: &str, default: fn() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default()
    } else {
        trimmed.to_string()
    }
}

pub fn sanitize_config(config: Config) -> Config {
    let clamp_timeout = |secs: u64| secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);

    Config {
        catalog: CatalogConfig {
            client_id: config.catalog.client_id.trim().to_string(),
            client_secret: config.catalog.client_secret.trim().to_string(),
            token_endpoint: trimmed_or_default(
                &config.catalog.token_endpoint,
                default_token_endpoint,
            ),
            search_endpoint: trimmed_or_default(
                &config.catalog.search_endpoint,
                default_search_endpoint,
            ),
        },
        network: NetworkConfig {
            connect_timeout_secs: clamp_timeout(config.network.connect_timeout_secs),
            read_timeout_secs: clamp_timeout(config.network.read_timeout_secs),
            write_timeout_secs: clamp_timeout(config.network.write_timeout_secs),
        },
    }
}

/// Reads the config at `path`, writing the default template first when the
/// file does not exist. An unparsable file is an error, not a silent reset.
pub fn load_or_create_config(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    err
                )
            })?;
        }
        info!(
            "Config file not found. Creating default config. path={}",
            path.display()
        );
        std::fs::write(path, system_config_template_text())
            .map_err(|err| format!("Failed to write config file {}: {}", path.display(), err))?;
    }

    let config_content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config file {}: {}", path.display(), err))?;
    let parsed = toml::from_str::<Config>(&config_content)
        .map_err(|err| format!("Failed to parse config file {}: {}", path.display(), err))?;
    Ok(sanitize_config(parsed))
}
