//! Manifest loading and credential resolution.
//!
//! The manifest is TOML loaded through figment so individual fields can be
//! overridden from the environment (`GUILDCTL_GUILD_ID=... guildctl apply`
//! targets a staging guild without editing the file). The token resolution
//! chain is flag/env first, then the OS keyring.

use secrecy::SecretString;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};

use guildctl_core::{CoreError, DesiredState};

use crate::cli::GlobalOpts;
use crate::error::CliError;

const KEYRING_SERVICE: &str = "guildctl";
const KEYRING_ENTRY: &str = "bot-token";

/// Load and validate the guild manifest.
pub fn load_manifest(global: &GlobalOpts) -> Result<DesiredState, CliError> {
    let path = &global.manifest;
    if !path.is_file() {
        return Err(CliError::ManifestNotFound { path: path.clone() });
    }

    let figment = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("GUILDCTL_").only(&["guild_id", "admin_role"]));

    let state: DesiredState =
        figment
            .extract()
            .map_err(|e| CliError::ManifestInvalid {
                path: path.clone(),
                source: CoreError::Validation {
                    field: "manifest".into(),
                    reason: e.to_string(),
                },
            })?;

    state.validate().map_err(|source| CliError::ManifestInvalid {
        path: path.clone(),
        source,
    })?;

    Ok(state)
}

/// Resolve the bot token: `--token` flag / `DISCORD_BOT_TOKEN` env (clap
/// folds these together), then the OS keyring.
pub fn resolve_token(global: &GlobalOpts) -> Result<SecretString, CliError> {
    if let Some(ref token) = global.token {
        return Ok(SecretString::from(token.clone()));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    Err(CliError::NoToken)
}
