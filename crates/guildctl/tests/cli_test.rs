//! Integration tests for the `guildctl` binary.
//!
//! Validates argument parsing, manifest checking, shell completions, and
//! error exit codes — all without a live Discord guild.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `guildctl` binary with env isolation.
fn guildctl_cmd() -> Command {
    let mut cmd = Command::cargo_bin("guildctl").unwrap();
    cmd.env_remove("DISCORD_BOT_TOKEN")
        .env_remove("GUILDCTL_MANIFEST")
        .env_remove("GUILDCTL_API_BASE")
        .env_remove("GUILDCTL_GUILD_ID")
        .env_remove("GUILDCTL_ADMIN_ROLE");
    cmd
}

/// Write a manifest to a temp file and return the (dir, path) pair.
fn manifest_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guild.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

const VALID_MANIFEST: &str = r#"
guild_id = "832250938571227217"
admin_role = "Human"

[[roles]]
name = "Human"
permissions = 8
hoist = true

[[roles]]
name = "Project: CAMPPS"

[[categories]]
name = "PROJECTS"

[[categories.channels]]
name = "campps-dev"
topic = "CAMPPS code"
restricted_to = "Project: CAMPPS"
"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = guildctl_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "expected exit code 2");
    let text = String::from_utf8_lossy(&output.stderr).to_string()
        + &String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Usage"), "expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    guildctl_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Discord guild")
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("check")),
    );
}

#[test]
fn test_version_flag() {
    guildctl_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("guildctl"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    guildctl_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    guildctl_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Manifest checking ───────────────────────────────────────────────

#[test]
fn test_check_valid_manifest() {
    let (_dir, path) = manifest_file(VALID_MANIFEST);

    guildctl_cmd()
        .args(["-f", path.to_str().unwrap(), "check"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("manifest ok")
                .and(predicate::str::contains("2 roles"))
                .and(predicate::str::contains("1 categories"))
                .and(predicate::str::contains("1 channels")),
        );
}

#[test]
fn test_check_rejects_duplicate_role_names() {
    let (_dir, path) = manifest_file(
        r#"
        guild_id = "1"
        [[roles]]
        name = "Human"
        [[roles]]
        name = "Human"
        "#,
    );

    let output = guildctl_cmd()
        .args(["-f", path.to_str().unwrap(), "check"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate"), "stderr:\n{stderr}");
}

#[test]
fn test_check_rejects_dangling_restriction() {
    let (_dir, path) = manifest_file(
        r#"
        guild_id = "1"
        [[categories]]
        name = "PROJECTS"
        [[categories.channels]]
        name = "mimir-dev"
        restricted_to = "Project: Mimir"
        "#,
    );

    guildctl_cmd()
        .args(["-f", path.to_str().unwrap(), "check"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("undeclared role"));
}

#[test]
fn test_check_missing_manifest() {
    guildctl_cmd()
        .args(["-f", "/nonexistent/guild.toml", "check"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Manifest not found"));
}

// ── Credential resolution ───────────────────────────────────────────

#[test]
fn test_apply_without_token_is_an_auth_error() {
    let (_dir, path) = manifest_file(VALID_MANIFEST);

    guildctl_cmd()
        .args(["-f", path.to_str().unwrap(), "apply"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("token"));
}
