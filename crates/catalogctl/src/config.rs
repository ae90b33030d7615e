//! CLI configuration: thin wrapper around `catalog_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --insecure, --timeout) and builds a connected `Catalog`.

use std::sync::Arc;

use catalog_api::{CatalogApi, CatalogClient};
use catalog_config::KeyringTier;
use catalog_core::{AuthState, Catalog, CoreError, CredentialTier};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use catalog_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The named profile with CLI flag overrides applied.
///
/// Without a stored profile, `--api-url` alone is enough to build one.
pub fn effective_profile(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    let mut profile = match (config.profiles.get(&name), global.api_url.as_ref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(_)) => Profile::default(),
        (None, None) if global.profile.is_some() => {
            return Err(catalog_config::ConfigError::UnknownProfile { profile: name }.into());
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok((name, profile))
}

/// A catalog bound to one profile, with its persisted session in the
/// system keyring.
pub struct Connection {
    pub catalog: Catalog,
    pub profile_name: String,
    pub profile: Profile,
}

/// Build the HTTP client and catalog for the active profile. Does not
/// touch the network.
pub fn connect(global: &GlobalOpts) -> Result<Connection, CliError> {
    let cfg = load_config_or_default();
    let (profile_name, profile) = effective_profile(global, &cfg)?;

    let url = catalog_config::api_url(&profile)?;
    let transport = catalog_config::profile_to_transport(&profile, &cfg.defaults);
    let store_config = catalog_config::profile_to_store_config(&profile, &cfg.defaults)?;

    let client = CatalogClient::new(url.as_str(), &transport).map_err(CoreError::from)?;
    let api: Arc<dyn CatalogApi> = Arc::new(client);
    let persisted: Arc<dyn CredentialTier> = Arc::new(KeyringTier::new(profile_name.clone()));

    tracing::debug!(profile = %profile_name, url = %url, "catalog configured");
    Ok(Connection {
        catalog: Catalog::new(api, store_config, persisted),
        profile_name,
        profile,
    })
}

impl Connection {
    /// Reuse the stored session, or sign in with configured credentials.
    pub async fn ensure_signed_in(&self) -> Result<(), CliError> {
        if self.catalog.auth_state() == AuthState::Authenticated {
            return Ok(());
        }
        let not_signed_in = || CliError::NotSignedIn {
            profile: self.profile_name.clone(),
        };
        let username = catalog_config::resolve_username(&self.profile, &self.profile_name)
            .map_err(|_| not_signed_in())?;
        let password = catalog_config::resolve_password(&self.profile, &self.profile_name)
            .map_err(|_| not_signed_in())?;

        tracing::debug!(username, "no stored session, signing in");
        self.catalog.sign_in(&username, &password).await?;
        Ok(())
    }
}
