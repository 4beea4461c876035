// Wire types for the Discord REST routes used by guild provisioning.
//
// Discord serializes permission bitmasks as decimal strings; the
// `perm_string` serde module handles that translation so the rest of the
// workspace works in plain `u64` bitmasks.

use serde::{Deserialize, Serialize};

// ── Permission bits ─────────────────────────────────────────────────

pub const ADMINISTRATOR: u64 = 1 << 3;
pub const VIEW_CHANNEL: u64 = 1 << 10;
pub const SEND_MESSAGES: u64 = 1 << 11;

// ── Channel kinds (Discord `type` field) ────────────────────────────

pub const CHANNEL_TEXT: u8 = 0;
pub const CHANNEL_CATEGORY: u8 = 4;

// ── Overwrite target kinds ──────────────────────────────────────────

pub const OVERWRITE_ROLE: u8 = 0;
pub const OVERWRITE_MEMBER: u8 = 1;

// ── Serde helper: u64 bitmask <-> decimal string ────────────────────

pub mod perm_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u64, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(de)?;
        raw.parse()
            .map_err(|_| de::Error::custom(format!("invalid permission bitmask: {raw:?}")))
    }
}

// ── Roles ───────────────────────────────────────────────────────────

/// A guild role as reported by `GET /guilds/{id}/roles`. Read-only snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(with = "perm_string")]
    pub permissions: u64,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub mentionable: bool,
}

/// Request body for `POST /guilds/{id}/roles`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRole {
    pub name: String,
    pub color: u32,
    #[serde(with = "perm_string")]
    pub permissions: u64,
    pub hoist: bool,
    pub mentionable: bool,
}

// ── Channels ────────────────────────────────────────────────────────

/// A per-channel access-control entry. `kind` maps to Discord's `type`
/// discriminator: 0 for roles, 1 for members.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PermissionOverwrite {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(with = "perm_string", default)]
    pub allow: u64,
    #[serde(with = "perm_string", default)]
    pub deny: u64,
}

impl PermissionOverwrite {
    /// Role-targeted overwrite.
    pub fn role(id: impl Into<String>, allow: u64, deny: u64) -> Self {
        Self {
            id: id.into(),
            kind: OVERWRITE_ROLE,
            allow,
            deny,
        }
    }
}

/// A guild channel as reported by `GET /guilds/{id}/channels`.
///
/// Categories share this shape and namespace; they are distinguished by
/// `kind == CHANNEL_CATEGORY` and a null `parent_id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl Channel {
    pub fn is_category(&self) -> bool {
        self.kind == CHANNEL_CATEGORY
    }
}

/// Request body for `POST /guilds/{id}/channels`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateChannel {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannel {
    /// A category container (no parent, no overwrites).
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CHANNEL_CATEGORY,
            parent_id: None,
            topic: None,
            permission_overwrites: Vec::new(),
        }
    }

    /// A text channel under the given category.
    pub fn text(
        name: impl Into<String>,
        parent_id: impl Into<String>,
        topic: Option<String>,
        permission_overwrites: Vec<PermissionOverwrite>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: CHANNEL_TEXT,
            parent_id: Some(parent_id.into()),
            topic,
            permission_overwrites,
        }
    }
}

// ── Members ─────────────────────────────────────────────────────────

/// Request body for `PATCH /guilds/{id}/members/{user_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ModifyMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
}

// ── Rate limiting ───────────────────────────────────────────────────

/// Body of a 429 response. `retry_after` is in seconds and may be fractional.
#[derive(Debug, Deserialize)]
pub struct RateLimitBody {
    #[serde(default)]
    pub retry_after: f64,
    #[serde(default)]
    pub global: bool,
}
