// Reconciliation outcome: every resolved name → id pair plus every
// per-entity failure, in declaration order.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Which phase of the pipeline an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Role,
    Category,
    Channel,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role => f.write_str("role"),
            Self::Category => f.write_str("category"),
            Self::Channel => f.write_str("channel"),
        }
    }
}

/// Why an entity was not resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FailureReason {
    /// The create request failed; later runs retry it via adoption.
    Create { message: String },
    /// A dependency (restricting role, parent category) did not resolve,
    /// so creation was never attempted.
    DependencySkipped { dependency: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { message } => write!(f, "creation failed: {message}"),
            Self::DependencySkipped { dependency } => {
                write!(f, "skipped: dependency {dependency:?} did not resolve")
            }
        }
    }
}

/// One entity that could not be resolved this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub name: String,
    pub stage: Stage,
    pub reason: FailureReason,
}

/// Aggregate outcome of one reconciliation run.
///
/// Maps preserve declaration order (manifest order), which keeps output
/// and the emitted artifact stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub guild_id: String,
    pub roles: IndexMap<String, String>,
    pub categories: IndexMap<String, String>,
    pub channels: IndexMap<String, String>,
    pub failures: Vec<Failure>,
    pub adopted: u32,
    pub created: u32,
}

impl ReconciliationResult {
    pub fn new(guild_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            roles: IndexMap::new(),
            categories: IndexMap::new(),
            channels: IndexMap::new(),
            failures: Vec::new(),
            adopted: 0,
            created: 0,
        }
    }

    pub fn record_adopted(&mut self, stage: Stage, name: &str, id: &str) {
        self.map_for(stage).insert(name.to_owned(), id.to_owned());
        self.adopted += 1;
    }

    pub fn record_created(&mut self, stage: Stage, name: &str, id: &str) {
        self.map_for(stage).insert(name.to_owned(), id.to_owned());
        self.created += 1;
    }

    pub fn record_failure(&mut self, stage: Stage, name: &str, reason: FailureReason) {
        self.failures.push(Failure {
            name: name.to_owned(),
            stage,
            reason,
        });
    }

    /// Number of entities that failed to resolve.
    pub fn failed(&self) -> u32 {
        u32::try_from(self.failures.len()).unwrap_or(u32::MAX)
    }

    /// True when every desired entity resolved.
    pub fn is_converged(&self) -> bool {
        self.failures.is_empty()
    }

    fn map_for(&mut self, stage: Stage) -> &mut IndexMap<String, String> {
        match stage {
            Stage::Role => &mut self.roles,
            Stage::Category => &mut self.categories,
            Stage::Channel => &mut self.channels,
        }
    }
}
