// Remote state snapshot: the guild as Discord currently reports it.
//
// One roles fetch, one channels fetch, both indexed by name for the
// adopt-or-create lookups. A failed fetch is fatal to the run — a false
// negative here would cause duplicate creation downstream.

use std::collections::HashMap;

use tracing::{debug, warn};

use guildctl_api::RestClient;
use guildctl_api::types::{Channel, Role};

use crate::error::CoreError;

/// Read-only snapshot of the guild's roles and channels, keyed by name.
///
/// Discord allows duplicate names; on collision the later entry wins,
/// matching the name-as-identity adoption policy.
#[derive(Debug)]
pub struct RemoteState {
    pub roles: HashMap<String, Role>,
    pub channels: HashMap<String, Channel>,
    /// Resolved id of the guild's base `@everyone` role.
    pub everyone_role_id: String,
}

impl RemoteState {
    /// Fetch a fresh snapshot for the guild.
    pub async fn fetch(client: &RestClient, guild_id: &str) -> Result<Self, CoreError> {
        let roles = client
            .list_roles(guild_id)
            .await
            .map_err(|source| CoreError::Snapshot { source })?;
        let channels = client
            .list_channels(guild_id)
            .await
            .map_err(|source| CoreError::Snapshot { source })?;

        Self::from_parts(guild_id, roles, channels)
    }

    /// Build a snapshot from already-fetched collections.
    ///
    /// The platform convention is that the `@everyone` role id equals the
    /// guild id. That convention is verified against the response rather
    /// than assumed: the role must exist in the fetched list, and a name
    /// mismatch is logged for the operator.
    pub fn from_parts(
        guild_id: &str,
        roles: Vec<Role>,
        channels: Vec<Channel>,
    ) -> Result<Self, CoreError> {
        let everyone = roles
            .iter()
            .find(|r| r.id == guild_id)
            .ok_or_else(|| CoreError::SnapshotIntegrity {
                reason: format!("no role with id {guild_id} (expected the @everyone role)"),
            })?;
        if everyone.name != "@everyone" {
            warn!(
                role = %everyone.name,
                "role matching the guild id is not named @everyone"
            );
        }
        let everyone_role_id = everyone.id.clone();

        debug!(
            roles = roles.len(),
            channels = channels.len(),
            "indexed remote snapshot"
        );

        Ok(Self {
            roles: roles.into_iter().map(|r| (r.name.clone(), r)).collect(),
            channels: channels.into_iter().map(|c| (c.name.clone(), c)).collect(),
            everyone_role_id,
        })
    }
}
