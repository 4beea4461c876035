// Diff-and-converge engine.
//
// Three phases in hard dependency order: roles, then categories, then
// channels. Channel creation embeds the already-resolved ids of its parent
// category and any restricting role — there is no deferred patch step, so
// a phase never starts before the previous one finished.
//
// Per-entity failures never abort the run. They are recorded and the run
// continues, so the operator sees the complete picture; the next run
// retries only the failed entities (adoption covers the rest).

use tracing::{info, warn};

use guildctl_api::RestClient;
use guildctl_api::types::{
    CreateChannel, CreateRole, PermissionOverwrite, SEND_MESSAGES, VIEW_CHANNEL,
};

use crate::error::CoreError;
use crate::model::{ChannelSpec, DesiredState};
use crate::result::{FailureReason, ReconciliationResult, Stage};
use crate::snapshot::RemoteState;

/// Converges remote state toward a validated [`DesiredState`].
pub struct Reconciler<'a> {
    client: &'a RestClient,
    desired: &'a DesiredState,
    remote: &'a RemoteState,
}

impl<'a> Reconciler<'a> {
    /// Re-validates the desired state so an unvalidated model can never
    /// reach the network.
    pub fn new(
        client: &'a RestClient,
        desired: &'a DesiredState,
        remote: &'a RemoteState,
    ) -> Result<Self, CoreError> {
        desired.validate()?;
        Ok(Self {
            client,
            desired,
            remote,
        })
    }

    /// Run the full pipeline. Always completes; per-entity failures are
    /// collected in the returned result.
    pub async fn run(&self) -> ReconciliationResult {
        let mut result = ReconciliationResult::new(&self.desired.guild_id);

        self.resolve_roles(&mut result).await;
        self.resolve_categories(&mut result).await;
        self.resolve_channels(&mut result).await;

        info!(
            adopted = result.adopted,
            created = result.created,
            failed = result.failed(),
            "reconciliation finished"
        );
        result
    }

    // ── Phase 1: roles ───────────────────────────────────────────────

    async fn resolve_roles(&self, result: &mut ReconciliationResult) {
        for spec in &self.desired.roles {
            if let Some(existing) = self.remote.roles.get(&spec.name) {
                info!(role = %spec.name, id = %existing.id, "adopted role");
                result.record_adopted(Stage::Role, &spec.name, &existing.id);
                continue;
            }

            let body = CreateRole {
                name: spec.name.clone(),
                color: spec.color,
                permissions: spec.permissions,
                hoist: spec.hoist,
                mentionable: spec.mentionable,
            };
            match self.client.create_role(&self.desired.guild_id, &body).await {
                Ok(role) => {
                    info!(role = %spec.name, id = %role.id, "created role");
                    result.record_created(Stage::Role, &spec.name, &role.id);
                }
                Err(err) => {
                    warn!(role = %spec.name, %err, "role creation failed");
                    result.record_failure(
                        Stage::Role,
                        &spec.name,
                        FailureReason::Create {
                            message: err.to_string(),
                        },
                    );
                }
            }
        }
    }

    // ── Phase 2: categories ──────────────────────────────────────────

    async fn resolve_categories(&self, result: &mut ReconciliationResult) {
        for spec in &self.desired.categories {
            // Categories live in the channel namespace.
            if let Some(existing) = self.remote.channels.get(&spec.name) {
                info!(category = %spec.name, id = %existing.id, "adopted category");
                result.record_adopted(Stage::Category, &spec.name, &existing.id);
                continue;
            }

            let body = CreateChannel::category(&spec.name);
            match self
                .client
                .create_channel(&self.desired.guild_id, &body)
                .await
            {
                Ok(channel) => {
                    info!(category = %spec.name, id = %channel.id, "created category");
                    result.record_created(Stage::Category, &spec.name, &channel.id);
                }
                Err(err) => {
                    warn!(category = %spec.name, %err, "category creation failed");
                    result.record_failure(
                        Stage::Category,
                        &spec.name,
                        FailureReason::Create {
                            message: err.to_string(),
                        },
                    );
                }
            }
        }
    }

    // ── Phase 3: channels ────────────────────────────────────────────

    async fn resolve_channels(&self, result: &mut ReconciliationResult) {
        for category in &self.desired.categories {
            let parent_id = result.categories.get(&category.name).cloned();

            for spec in &category.channels {
                let Some(ref parent_id) = parent_id else {
                    result.record_failure(
                        Stage::Channel,
                        &spec.name,
                        FailureReason::DependencySkipped {
                            dependency: category.name.clone(),
                        },
                    );
                    continue;
                };

                // Existing channels are adopted as-is; their overwrites are
                // trusted (hand-curated or previously correct).
                if let Some(existing) = self.remote.channels.get(&spec.name) {
                    info!(channel = %spec.name, id = %existing.id, "adopted channel");
                    result.record_adopted(Stage::Channel, &spec.name, &existing.id);
                    continue;
                }

                let overwrites = match self.overwrites_for(spec, result) {
                    Ok(ow) => ow,
                    Err(dependency) => {
                        result.record_failure(
                            Stage::Channel,
                            &spec.name,
                            FailureReason::DependencySkipped { dependency },
                        );
                        continue;
                    }
                };

                let body =
                    CreateChannel::text(&spec.name, parent_id, spec.topic.clone(), overwrites);
                match self
                    .client
                    .create_channel(&self.desired.guild_id, &body)
                    .await
                {
                    Ok(channel) => {
                        info!(channel = %spec.name, id = %channel.id, "created channel");
                        result.record_created(Stage::Channel, &spec.name, &channel.id);
                    }
                    Err(err) => {
                        warn!(channel = %spec.name, %err, "channel creation failed");
                        result.record_failure(
                            Stage::Channel,
                            &spec.name,
                            FailureReason::Create {
                                message: err.to_string(),
                            },
                        );
                    }
                }
            }
        }
    }

    /// Compute the overwrite list for a new channel.
    ///
    /// Unrestricted channels get none. Restricted channels get exactly:
    /// deny VIEW for `@everyone`, allow VIEW|SEND for the restricting role,
    /// and allow VIEW|SEND for the admin role when one is configured and
    /// resolved. Returns the unresolved dependency name on failure.
    fn overwrites_for(
        &self,
        spec: &ChannelSpec,
        result: &ReconciliationResult,
    ) -> Result<Vec<PermissionOverwrite>, String> {
        let Some(ref role_name) = spec.restricted_to else {
            return Ok(Vec::new());
        };

        let role_id = result.roles.get(role_name).ok_or_else(|| role_name.clone())?;

        let mut overwrites = vec![
            PermissionOverwrite::role(&self.remote.everyone_role_id, 0, VIEW_CHANNEL),
            PermissionOverwrite::role(role_id, VIEW_CHANNEL | SEND_MESSAGES, 0),
        ];

        if let Some(ref admin) = self.desired.admin_role {
            // The admin role may itself have failed to create this run;
            // it is added only when resolved, same as the source of truth
            // for the restricting role above.
            if admin != role_name {
                if let Some(admin_id) = result.roles.get(admin) {
                    overwrites.push(PermissionOverwrite::role(
                        admin_id,
                        VIEW_CHANNEL | SEND_MESSAGES,
                        0,
                    ));
                }
            }
        }

        Ok(overwrites)
    }
}
