//! CLI command implementations.

mod auth;

pub use auth::{change_password, login, logout, session, signup, status};

use anyhow::{Context, Result};
use credential_vault::{CredentialVault, FileStorage};
use pool_config::{Config, Paths};
use provider_client::HttpProvider;
use session_engine::SessionEngine;
use std::sync::Arc;

/// Build the session engine from validated configuration.
///
/// Fails fast when the pool or client identifier is missing, rather
/// than producing a client that silently talks to nothing.
pub fn build_engine() -> Result<SessionEngine> {
    let paths = Paths::new()?;
    let config = Config::load(&paths).context(
        "Invalid configuration. Set provider_url, pool_id and client_id in \
         ~/.userpool/config.json or via USERPOOL_* environment variables",
    )?;
    paths.ensure_dirs()?;

    tracing::debug!(
        provider_url = %config.provider_url,
        pool_id = %config.pool_id,
        "Configuration loaded"
    );

    let provider = Arc::new(HttpProvider::new(
        &config.provider_url,
        &config.pool_id,
        &config.client_id,
    ));
    let vault = CredentialVault::new(Box::new(FileStorage::new(paths.vault_file())));

    Ok(SessionEngine::new(provider, vault))
}
