//! `guildctl apply` — the full reconciliation run.
//!
//! Load + validate the manifest, snapshot the guild, converge, report,
//! persist the artifact. The artifact is written exactly once, at the end,
//! and contains only what resolved successfully.

use std::time::Duration;

use tracing::info;

use guildctl_api::{RestClient, TransportConfig};
use guildctl_core::{CoreError, Reconciler, RemoteState, artifact};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ApplyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Fail fast on configuration problems — nothing has been mutated yet.
    let desired = config::load_manifest(global)?;
    let token = config::resolve_token(global)?;

    let transport = TransportConfig::with_timeout(Duration::from_secs(global.timeout));
    let client = match global.api_base {
        Some(ref base) => RestClient::with_base_url(&token, &transport, base),
        None => RestClient::new(&token, &transport),
    }?;

    info!(guild = %desired.guild_id, entities = desired.entity_count(), "starting reconciliation");

    let remote = RemoteState::fetch(&client, &desired.guild_id)
        .await
        .map_err(map_fetch_error)?;

    let reconciler =
        Reconciler::new(&client, &desired, &remote).map_err(|source| CliError::ManifestInvalid {
            path: global.manifest.clone(),
            source,
        })?;
    let result = reconciler.run().await;

    output::print_output(&output::render_result(&global.output, &result), global.quiet);
    if !global.quiet {
        eprintln!("{}", output::render_summary(&result));
    }

    if !args.no_artifact {
        artifact::write(&result, &args.out).map_err(|source| CliError::Artifact {
            path: args.out.clone(),
            source,
        })?;
        if !global.quiet {
            eprintln!("wrote {}", args.out.display());
        }
    }

    if !result.is_converged() {
        return Err(CliError::Partial {
            failed: result.failed(),
        });
    }
    Ok(())
}

/// Distinguish bad credentials from everything else that can break the
/// snapshot fetch.
fn map_fetch_error(err: CoreError) -> CliError {
    match err {
        CoreError::Snapshot {
            source: source @ guildctl_api::Error::Authentication { .. },
        } => CliError::AuthFailed { source },
        other => CliError::SnapshotFailed { source: other },
    }
}
