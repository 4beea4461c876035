// Desired-state model: the declarative target topology.
//
// Deserialized from the TOML manifest and validated before any network
// call. Name-as-identity is the matching rule throughout, so validation
// rejects duplicate names (within each entity class) and dangling role
// references up front — a configuration error, never a runtime one.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::CoreError;

// ── Specs ───────────────────────────────────────────────────────────

/// A role to ensure in the guild. `name` is the unique key.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub permissions: u64,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub mentionable: bool,
}

/// A text channel to ensure under its category.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSpec {
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    /// When set, visibility narrows to this role (plus the admin role).
    /// Must name a declared [`RoleSpec`].
    #[serde(default)]
    pub restricted_to: Option<String>,
}

/// A category and its ordered channels. Categories share the guild channel
/// namespace, so their names are unique keys there too.
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<ChannelSpec>,
}

// ── DesiredState ────────────────────────────────────────────────────

/// The full declarative topology for one guild.
#[derive(Debug, Clone, Deserialize)]
pub struct DesiredState {
    pub guild_id: String,
    /// Role granted access to every restricted channel, e.g. the operator
    /// role. Must name a declared [`RoleSpec`] when set.
    #[serde(default)]
    pub admin_role: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleSpec>,
    #[serde(default)]
    pub categories: Vec<CategorySpec>,
}

impl DesiredState {
    /// Parse a TOML manifest and validate it.
    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let state: Self = toml::from_str(raw)?;
        state.validate()?;
        Ok(state)
    }

    /// Reject duplicate names and dangling role references.
    ///
    /// Runs before reconciliation issues any request, so a rejected
    /// manifest never mutates remote state.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.guild_id.is_empty() {
            return Err(validation("guild_id", "must not be empty"));
        }

        let mut role_names = HashSet::new();
        for role in &self.roles {
            if !role_names.insert(role.name.as_str()) {
                return Err(validation(
                    "roles",
                    format!("duplicate role name {:?}", role.name),
                ));
            }
        }

        let mut category_names = HashSet::new();
        let mut channel_names = HashSet::new();
        for category in &self.categories {
            if !category_names.insert(category.name.as_str())
                || channel_names.contains(category.name.as_str())
            {
                return Err(validation(
                    "categories",
                    format!("duplicate category name {:?}", category.name),
                ));
            }
            for channel in &category.channels {
                // Channels share one guild-wide namespace with categories.
                if channel_names.contains(channel.name.as_str())
                    || category_names.contains(channel.name.as_str())
                {
                    return Err(validation(
                        "channels",
                        format!("duplicate channel name {:?}", channel.name),
                    ));
                }
                channel_names.insert(channel.name.as_str());

                if let Some(ref role) = channel.restricted_to {
                    if !role_names.contains(role.as_str()) {
                        return Err(validation(
                            "channels",
                            format!(
                                "channel {:?} restricted to undeclared role {:?}",
                                channel.name, role
                            ),
                        ));
                    }
                }
            }
        }

        if let Some(ref admin) = self.admin_role {
            if !role_names.contains(admin.as_str()) {
                return Err(validation(
                    "admin_role",
                    format!("undeclared role {admin:?}"),
                ));
            }
        }

        Ok(())
    }

    /// Total number of entities this manifest declares.
    pub fn entity_count(&self) -> usize {
        self.roles.len()
            + self.categories.len()
            + self
                .categories
                .iter()
                .map(|c| c.channels.len())
                .sum::<usize>()
    }
}

fn validation(field: &str, reason: impl Into<String>) -> CoreError {
    CoreError::Validation {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const MANIFEST: &str = r#"
        guild_id = "832250938571227217"
        admin_role = "Human"

        [[roles]]
        name = "Human"
        color = 0x3498db
        permissions = 8
        hoist = true
        mentionable = true

        [[roles]]
        name = "Project: CAMPPS"
        color = 0x2ecc71

        [[categories]]
        name = "PROJECTS"

        [[categories.channels]]
        name = "campps-dev"
        topic = "CAMPPS code, architecture, database design"
        restricted_to = "Project: CAMPPS"

        [[categories.channels]]
        name = "architecture"
    "#;

    #[test]
    fn parses_and_validates_manifest() {
        let state = DesiredState::from_toml_str(MANIFEST).unwrap();
        assert_eq!(state.roles.len(), 2);
        assert_eq!(state.roles[0].permissions, 8);
        assert!(state.roles[0].hoist);
        assert_eq!(state.categories[0].channels.len(), 2);
        assert_eq!(
            state.categories[0].channels[0].restricted_to.as_deref(),
            Some("Project: CAMPPS")
        );
        assert_eq!(state.entity_count(), 5);
    }

    #[test]
    fn rejects_duplicate_role_names() {
        let state = DesiredState {
            guild_id: "1".into(),
            admin_role: None,
            roles: vec![role("Human"), role("Human")],
            categories: vec![],
        };
        let err = state.validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "roles"));
    }

    #[test]
    fn rejects_channel_name_colliding_with_category() {
        let state = DesiredState {
            guild_id: "1".into(),
            admin_role: None,
            roles: vec![],
            categories: vec![
                CategorySpec {
                    name: "general".into(),
                    channels: vec![],
                },
                CategorySpec {
                    name: "TOOLS".into(),
                    channels: vec![channel("general", None)],
                },
            ],
        };
        assert!(state.validate().is_err());
    }

    #[test]
    fn rejects_dangling_restricted_to() {
        let state = DesiredState {
            guild_id: "1".into(),
            admin_role: None,
            roles: vec![role("Human")],
            categories: vec![CategorySpec {
                name: "PROJECTS".into(),
                channels: vec![channel("mimir-dev", Some("Project: Mimir"))],
            }],
        };
        let err = state.validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "channels"));
    }

    #[test]
    fn rejects_dangling_admin_role() {
        let state = DesiredState {
            guild_id: "1".into(),
            admin_role: Some("Operators".into()),
            roles: vec![role("Human")],
            categories: vec![],
        };
        let err = state.validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "admin_role"));
    }

    fn role(name: &str) -> RoleSpec {
        RoleSpec {
            name: name.into(),
            color: 0,
            permissions: 0,
            hoist: false,
            mentionable: false,
        }
    }

    fn channel(name: &str, restricted_to: Option<&str>) -> ChannelSpec {
        ChannelSpec {
            name: name.into(),
            topic: None,
            restricted_to: restricted_to.map(Into::into),
        }
    }
}
