use thiserror::Error;

/// Error type for the `guildctl-core` crate.
///
/// `Validation` is raised before any network call and aborts the run —
/// no remote state has been touched yet. Snapshot failures are fatal too,
/// since reconciling against a stale or missing snapshot would create
/// duplicates. Per-entity failures during reconciliation are *not* errors;
/// they are collected in the [`ReconciliationResult`](crate::ReconciliationResult).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Desired-state validation failure (duplicate name, dangling reference).
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Manifest could not be parsed.
    #[error("manifest parse error: {0}")]
    Manifest(#[from] toml::de::Error),

    /// The remote snapshot could not be fetched.
    #[error("failed to fetch remote state: {source}")]
    Snapshot {
        #[source]
        source: guildctl_api::Error,
    },

    /// The remote snapshot contradicts a platform invariant.
    #[error("remote state integrity: {reason}")]
    SnapshotIntegrity { reason: String },

    /// API failure outside the per-entity isolation boundary.
    #[error(transparent)]
    Api(#[from] guildctl_api::Error),

    /// Output artifact could not be written.
    #[error("failed to write artifact: {0}")]
    Artifact(#[from] std::io::Error),

    /// Output artifact could not be serialized.
    #[error("failed to serialize artifact: {0}")]
    ArtifactEncoding(#[from] serde_json::Error),
}
