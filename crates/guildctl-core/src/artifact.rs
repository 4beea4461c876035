// Output artifact: the persisted name → id mapping consumed by downstream
// tooling (role assignment, nickname setting) without re-querying Discord.
//
// Pure serialization — no network. Written once, after the run, and only
// with entries that resolved successfully.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;
use crate::result::ReconciliationResult;

/// Serialized view of a run's resolved ids. Failures are deliberately
/// excluded: the artifact records what exists, not what went wrong.
#[derive(Serialize)]
struct Artifact<'a> {
    guild_id: &'a str,
    roles: &'a IndexMap<String, String>,
    categories: &'a IndexMap<String, String>,
    channels: &'a IndexMap<String, String>,
}

/// Render the artifact as pretty-printed JSON.
pub fn to_json(result: &ReconciliationResult) -> Result<String, CoreError> {
    let artifact = Artifact {
        guild_id: &result.guild_id,
        roles: &result.roles,
        categories: &result.categories,
        channels: &result.channels,
    };
    Ok(serde_json::to_string_pretty(&artifact)?)
}

/// Serialize the resolved mapping and write it to `path`.
pub fn write(result: &ReconciliationResult, path: &Path) -> Result<(), CoreError> {
    let json = to_json(result)?;
    std::fs::write(path, json)?;
    Ok(())
}
