// guildctl-core: desired-state model and reconciliation engine.
//
// The pipeline is three explicit phases — roles, then categories, then
// channels — each consuming only the resolved ids of the phases before it.
// Everything here is additive: entities already present remotely are
// adopted by name, never modified.

pub mod artifact;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod result;
pub mod snapshot;

pub use error::CoreError;
pub use model::{CategorySpec, ChannelSpec, DesiredState, RoleSpec};
pub use reconcile::Reconciler;
pub use result::{Failure, FailureReason, ReconciliationResult, Stage};
pub use snapshot::RemoteState;
