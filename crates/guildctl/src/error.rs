//! CLI error types with miette diagnostics.
//!
//! Maps api/core errors into user-facing diagnostics with actionable help
//! text and stable exit codes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const PARTIAL: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Manifest / configuration ─────────────────────────────────────

    #[error("Manifest not found: {path}")]
    #[diagnostic(
        code(guildctl::no_manifest),
        help("Point --manifest (-f) at your guild manifest, e.g. guild.toml")
    )]
    ManifestNotFound { path: PathBuf },

    #[error("Invalid manifest {path}")]
    #[diagnostic(
        code(guildctl::invalid_manifest),
        help("Fix the manifest and re-run `guildctl check`")
    )]
    ManifestInvalid {
        path: PathBuf,
        #[source]
        source: guildctl_core::CoreError,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("No bot token configured")]
    #[diagnostic(
        code(guildctl::no_token),
        help(
            "Set the DISCORD_BOT_TOKEN environment variable, pass --token,\n\
             or store it in the OS keyring under service 'guildctl'."
        )
    )]
    NoToken,

    #[error("Discord rejected the credentials")]
    #[diagnostic(
        code(guildctl::auth_failed),
        help("Check the bot token and that the bot is a member of the guild.")
    )]
    AuthFailed {
        #[source]
        source: guildctl_api::Error,
    },

    // ── Remote state ─────────────────────────────────────────────────

    #[error("Could not read the current guild state")]
    #[diagnostic(
        code(guildctl::snapshot_failed),
        help(
            "Reconciliation needs a fresh snapshot to avoid creating\n\
             duplicates. Check connectivity and bot permissions, then re-run."
        )
    )]
    SnapshotFailed {
        #[source]
        source: guildctl_core::CoreError,
    },

    // ── Outcome ──────────────────────────────────────────────────────

    #[error("Reconciliation finished with {failed} unresolved entities")]
    #[diagnostic(
        code(guildctl::partial),
        help("Re-running retries only the failed entities; resolved ones are adopted.")
    )]
    Partial { failed: u32 },

    #[error("Failed to write artifact {path}")]
    #[diagnostic(code(guildctl::artifact))]
    Artifact {
        path: PathBuf,
        #[source]
        source: guildctl_core::CoreError,
    },

    // ── Fallbacks ────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(guildctl::api))]
    Api(#[from] guildctl_api::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ManifestNotFound { .. } | Self::ManifestInvalid { .. } => exit_code::USAGE,
            Self::NoToken | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::SnapshotFailed { .. } => exit_code::CONNECTION,
            Self::Partial { .. } => exit_code::PARTIAL,
            Self::Artifact { .. } | Self::Api(_) => exit_code::GENERAL,
        }
    }
}
