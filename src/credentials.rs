//! Catalog credential resolution and OS keyring storage for the client secret.

use keyring::Entry;
use log::debug;

use crate::catalog::CatalogCredentials;
use crate::config::CatalogConfig;

const CATALOG_SERVICE_NAME: &str = "autofiller.catalog.spotify";

fn catalog_entry(client_id: &str) -> Result<Entry, String> {
    Entry::new(CATALOG_SERVICE_NAME, client_id)
        .map_err(|err| keyring_failure("open", client_id, &err))
}

fn secret_store_hint(error: &keyring::Error) -> Option<&'static str> {
    match error {
        keyring::Error::NoStorageAccess(_) => {
            Some("the secret store is locked or unavailable; set [catalog].client_secret instead")
        }
        keyring::Error::PlatformFailure(inner)
            if inner.to_string().contains("org.freedesktop.DBus.Error.ServiceUnknown") =>
        {
            Some("no Secret Service provider is running; start GNOME Keyring or KeePassXC")
        }
        _ => None,
    }
}

fn keyring_failure(action: &str, client_id: &str, error: &keyring::Error) -> String {
    let message = format!(
        "could not {action} the client secret for '{client_id}' in the OS keyring: {error}"
    );
    match secret_store_hint(error) {
        Some(hint) => format!("{message} ({hint})"),
        None => message,
    }
}

/// Saves the catalog client secret for a client id into the OS keyring.
pub fn set_client_secret(client_id: &str, secret: &str) -> Result<(), String> {
    catalog_entry(client_id)?
        .set_password(secret)
        .map_err(|err| keyring_failure("save", client_id, &err))
}

/// Loads the catalog client secret for a client id. `Ok(None)` when nothing is stored.
pub fn get_client_secret(client_id: &str) -> Result<Option<String>, String> {
    match catalog_entry(client_id)?.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(keyring_failure("load", client_id, &err)),
    }
}

/// Builds credentials from config, consulting `keyring_lookup` only when the
/// config carries no secret.
pub fn resolve_credentials_with<F>(
    catalog: &CatalogConfig,
    keyring_lookup: F,
) -> Result<CatalogCredentials, String>
where
    F: FnOnce(&str) -> Result<Option<String>, String>,
{
    let client_id = catalog.client_id.trim();
    if client_id.is_empty() {
        return Err(
            "catalog client_id is not configured; set [catalog].client_id in the config file"
                .to_string(),
        );
    }

    let configured_secret = catalog.client_secret.trim();
    let client_secret = if configured_secret.is_empty() {
        debug!("Credentials: reading client secret from keyring client_id={client_id}");
        keyring_lookup(client_id)?.ok_or_else(|| {
            format!(
                "no client secret stored for client '{client_id}'; run with --store-client-secret <SECRET> or set [catalog].client_secret"
            )
        })?
    } else {
        configured_secret.to_string()
    };

    let credentials = CatalogCredentials {
        client_id: client_id.to_string(),
        client_secret,
    };
    if credentials.is_complete() {
        Ok(credentials)
    } else {
        Err(format!(
            "stored client secret for client '{client_id}' is empty"
        ))
    }
}

pub fn resolve_credentials(catalog: &CatalogConfig) -> Result<CatalogCredentials, String> {
    resolve_credentials_with(catalog, get_client_secret)
}
