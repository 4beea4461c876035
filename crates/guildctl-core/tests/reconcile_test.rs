// Reconciler integration tests against a wiremock Discord.
//
// Covers convergence on an empty guild, adoption idempotence (zero create
// calls on the second run), dependent skips when a role fails to create,
// and the adopt-don't-overwrite policy for pre-existing channels.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guildctl_core::{
    CategorySpec, ChannelSpec, DesiredState, FailureReason, Reconciler, RemoteState, RoleSpec,
    Stage, artifact,
};
use guildctl_api::RestClient;

const GUILD: &str = "832250938571227217";

// ── Helpers ─────────────────────────────────────────────────────────

fn desired() -> DesiredState {
    DesiredState {
        guild_id: GUILD.into(),
        admin_role: None,
        roles: vec![RoleSpec {
            name: "Admins".into(),
            color: 0x3498db,
            permissions: 8,
            hoist: true,
            mentionable: true,
        }],
        categories: vec![CategorySpec {
            name: "TEAM".into(),
            channels: vec![ChannelSpec {
                name: "announcements".into(),
                topic: Some("Team announcements".into()),
                restricted_to: Some("Admins".into()),
            }],
        }],
    }
}

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = RestClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

/// Mount the two snapshot fetches.
async fn mount_snapshot(server: &MockServer, roles: serde_json::Value, channels: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/guilds/{GUILD}/roles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(roles))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/guilds/{GUILD}/channels")))
        .respond_with(ResponseTemplate::new(200).set_body_json(channels))
        .mount(server)
        .await;
}

fn everyone_only() -> serde_json::Value {
    json!([{ "id": GUILD, "name": "@everyone", "permissions": "104324673" }])
}

// ── End-to-end: empty guild ─────────────────────────────────────────

#[tokio::test]
async fn test_empty_guild_creates_everything_in_order() {
    let (server, client) = setup().await;
    mount_snapshot(&server, everyone_only(), json!([])).await;

    Mock::given(method("POST"))
        .and(path(format!("/guilds/{GUILD}/roles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "R1", "name": "Admins", "permissions": "8",
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Category create: type 4, no parent.
    Mock::given(method("POST"))
        .and(path(format!("/guilds/{GUILD}/channels")))
        .and(body_partial_json(json!({ "name": "TEAM", "type": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "C1", "name": "TEAM", "type": 4,
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Channel create: embeds the resolved category id and the computed
    // overwrite pair (deny view for @everyone, allow view+send for R1).
    Mock::given(method("POST"))
        .and(path(format!("/guilds/{GUILD}/channels")))
        .and(body_partial_json(json!({
            "name": "announcements",
            "type": 0,
            "parent_id": "C1",
            "topic": "Team announcements",
            "permission_overwrites": [
                { "id": GUILD, "type": 0, "allow": "0", "deny": "1024" },
                { "id": "R1", "type": 0, "allow": "3072", "deny": "0" },
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "CH1", "name": "announcements", "type": 0, "parent_id": "C1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let desired = desired();
    let remote = RemoteState::fetch(&client, GUILD).await.unwrap();
    let result = Reconciler::new(&client, &desired, &remote)
        .unwrap()
        .run()
        .await;

    assert!(result.is_converged(), "failures: {:?}", result.failures);
    assert_eq!(result.roles["Admins"], "R1");
    assert_eq!(result.categories["TEAM"], "C1");
    assert_eq!(result.channels["announcements"], "CH1");
    assert_eq!(result.created, 3);
    assert_eq!(result.adopted, 0);
}

// ── Idempotence: converged guild issues zero creates ────────────────

#[tokio::test]
async fn test_second_run_is_pure_adoption() {
    let (server, client) = setup().await;
    mount_snapshot(
        &server,
        json!([
            { "id": GUILD, "name": "@everyone", "permissions": "104324673" },
            { "id": "R1", "name": "Admins", "permissions": "8" },
        ]),
        json!([
            { "id": "C1", "name": "TEAM", "type": 4 },
            { "id": "CH1", "name": "announcements", "type": 0, "parent_id": "C1" },
        ]),
    )
    .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let desired = desired();
    let remote = RemoteState::fetch(&client, GUILD).await.unwrap();

    let first = Reconciler::new(&client, &desired, &remote)
        .unwrap()
        .run()
        .await;
    let second = Reconciler::new(&client, &desired, &remote)
        .unwrap()
        .run()
        .await;

    assert_eq!(first, second);
    assert!(first.is_converged());
    assert_eq!(first.created, 0);
    assert_eq!(first.adopted, 3);
    assert_eq!(first.roles["Admins"], "R1");
}

// ── Ordering: failed role dependency skips the channel ──────────────

#[tokio::test]
async fn test_failed_role_skips_dependent_channel() {
    let (server, client) = setup().await;
    mount_snapshot(&server, everyone_only(), json!([])).await;

    // Role creation fails outright.
    Mock::given(method("POST"))
        .and(path(format!("/guilds/{GUILD}/roles")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    // Category still gets created...
    Mock::given(method("POST"))
        .and(path(format!("/guilds/{GUILD}/channels")))
        .and(body_partial_json(json!({ "type": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "C1", "name": "TEAM", "type": 4,
        })))
        .expect(1)
        .mount(&server)
        .await;

    // ...but the restricted channel is never attempted with a missing
    // role id.
    Mock::given(method("POST"))
        .and(path(format!("/guilds/{GUILD}/channels")))
        .and(body_partial_json(json!({ "type": 0 })))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let desired = desired();
    let remote = RemoteState::fetch(&client, GUILD).await.unwrap();
    let result = Reconciler::new(&client, &desired, &remote)
        .unwrap()
        .run()
        .await;

    assert_eq!(result.failed(), 2);
    assert_eq!(result.failures[0].stage, Stage::Role);
    assert_eq!(result.failures[0].name, "Admins");
    assert!(matches!(
        result.failures[0].reason,
        FailureReason::Create { .. }
    ));
    assert_eq!(result.failures[1].stage, Stage::Channel);
    assert_eq!(
        result.failures[1].reason,
        FailureReason::DependencySkipped {
            dependency: "Admins".into()
        }
    );
    assert_eq!(result.categories["TEAM"], "C1");
}

// ── Adoption leaves existing overwrites alone ───────────────────────

#[tokio::test]
async fn test_adopted_channel_overwrites_untouched() {
    let (server, client) = setup().await;
    mount_snapshot(
        &server,
        json!([
            { "id": GUILD, "name": "@everyone", "permissions": "104324673" },
            { "id": "R1", "name": "Admins", "permissions": "8" },
        ]),
        json!([
            { "id": "C1", "name": "TEAM", "type": 4 },
            {
                "id": "C9", "name": "announcements", "type": 0, "parent_id": "C1",
                "permission_overwrites": [
                    { "id": "777", "type": 1, "allow": "1024", "deny": "0" },
                ],
            },
        ]),
    )
    .await;

    // No update of any kind may touch the adopted channel.
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let desired = desired();
    let remote = RemoteState::fetch(&client, GUILD).await.unwrap();
    let result = Reconciler::new(&client, &desired, &remote)
        .unwrap()
        .run()
        .await;

    assert!(result.is_converged());
    assert_eq!(result.channels["announcements"], "C9");
}

// ── Artifact round trip ─────────────────────────────────────────────

#[tokio::test]
async fn test_artifact_written_after_run() {
    let (server, client) = setup().await;
    mount_snapshot(
        &server,
        json!([
            { "id": GUILD, "name": "@everyone", "permissions": "104324673" },
            { "id": "R1", "name": "Admins", "permissions": "8" },
        ]),
        json!([
            { "id": "C1", "name": "TEAM", "type": 4 },
            { "id": "CH1", "name": "announcements", "type": 0, "parent_id": "C1" },
        ]),
    )
    .await;

    let desired = desired();
    let remote = RemoteState::fetch(&client, GUILD).await.unwrap();
    let result = Reconciler::new(&client, &desired, &remote)
        .unwrap()
        .run()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("discord_config.json");
    artifact::write(&result, &out).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["guild_id"], GUILD);
    assert_eq!(json["roles"]["Admins"], "R1");
    assert_eq!(json["categories"]["TEAM"], "C1");
    assert_eq!(json["channels"]["announcements"], "CH1");
}
