//! Command surface integration tests
//!
//! Each test serves the full router on a local port over an in-memory
//! platform and a temporary snapshot directory.
//!
//! Run with: cargo test -p nick-integration-tests --test api_tests

use nick_core::Permissions;
use nick_integration_tests::{
    assert_error, assert_json, InMemoryPlatform, TestServer, BOT_ID, TEST_TOKEN,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

const GUILD: &str = "42";
const ADMIN: &str = "500";
const SNAPSHOT: &str = "/api/v1/guilds/42/nicknames/snapshot";
const MASS: &str = "/api/v1/guilds/42/nicknames/mass";
const RESTORE: &str = "/api/v1/guilds/42/nicknames/restore";
const RESTORE_REMOTE: &str = "/api/v1/guilds/42/nicknames/restore/remote";

/// Bot at rank 10, an administrator above it, two members below it
fn platform() -> InMemoryPlatform {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_admin(GUILD, ADMIN, 20)
        .add_member(GUILD, "1", Some("Bob"), 1)
        .add_member(GUILD, "2", None, 1)
        .add_member(GUILD, "3", Some("Pleb"), 20);
    platform
}

async fn server() -> TestServer {
    TestServer::start(platform())
        .await
        .expect("Failed to start server")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = server().await;
    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ok");
}

// ============================================================================
// Command gate
// ============================================================================

#[tokio::test]
async fn test_missing_credential() {
    let server = server().await;
    let response = server.get(SNAPSHOT).await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "MISSING_AUTHORIZATION")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_wrong_credential() {
    let server = server().await;
    let response = server
        .client
        .get(server.url(SNAPSHOT))
        .header("Authorization", "Bot not-the-token")
        .header("X-Actor-Id", ADMIN)
        .send()
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bearer_credential_is_accepted() {
    let server = server().await;
    let response = server
        .client
        .get(server.url(SNAPSHOT))
        .bearer_auth(TEST_TOKEN)
        .header("X-Actor-Id", ADMIN)
        .send()
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["active"], false);
}

#[tokio::test]
async fn test_missing_actor() {
    let server = server().await;
    let response = server
        .client
        .get(server.url(SNAPSHOT))
        .header("Authorization", format!("Bot {TEST_TOKEN}"))
        .send()
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "MISSING_ACTOR")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_admin_is_denied() {
    let server = server().await;
    let response = server.command_post(RESTORE, "1", None).await.unwrap();
    let error = assert_error(response, StatusCode::FORBIDDEN, "NOT_ADMINISTRATOR")
        .await
        .unwrap();
    assert_eq!(
        error["message"],
        "1 is not in the sudoers file (this incident will be reported)"
    );
    assert!(server.engine.platform.renames().is_empty());
}

#[tokio::test]
async fn test_stranger_is_denied() {
    let server = server().await;
    let response = server.command_get(SNAPSHOT, "31337").await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "NOT_ADMINISTRATOR")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bot_caller_is_ignored() {
    let platform = platform();
    platform.add_bot_account(GUILD, "600", 30);
    let server = TestServer::start(platform).await.unwrap();

    let response = server.command_post(SNAPSHOT, "600", None).await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "BOT_CALLER_IGNORED")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_self_call_is_rejected() {
    let server = server().await;
    let response = server.command_post(SNAPSHOT, BOT_ID, None).await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "SELF_CALL")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_owner_passes_the_gate() {
    let platform = platform();
    platform.set_owner(GUILD, "3");
    let server = TestServer::start(platform).await.unwrap();

    let response = server.command_get(SNAPSHOT, "3").await.unwrap();
    assert_json::<Value>(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_invalid_guild_id() {
    let server = server().await;
    let response = server
        .command_get("/api/v1/guilds/not%20an%20id/nicknames/snapshot", ADMIN)
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_PATH_PARAMETER")
        .await
        .unwrap();
}

// ============================================================================
// Snapshots
// ============================================================================

#[tokio::test]
async fn test_capture_and_status() {
    let server = server().await;

    let response = server.command_post(SNAPSHOT, ADMIN, None).await.unwrap();
    let body: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(body["captured"], true);
    assert_eq!(body["entries"], 2);
    assert_eq!(body["snapshot"], json!({"1": "Bob", "2": null}));

    let response = server.command_get(SNAPSHOT, ADMIN).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["active"], true);
    assert_eq!(body["entries"], 2);
    assert_eq!(body["archives"], json!([]));
}

#[tokio::test]
async fn test_capture_with_nobody_eligible() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 1)
        .add_admin(GUILD, ADMIN, 20);
    let server = TestServer::start(platform).await.unwrap();

    let response = server.command_post(SNAPSHOT, ADMIN, None).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body, json!({"captured": false, "guild_id": GUILD}));
    assert!(!server.engine.active_path(GUILD).exists());
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_restore_without_snapshot() {
    let server = server().await;
    let response = server.command_post(RESTORE, ADMIN, None).await.unwrap();
    assert_error(response, StatusCode::NOT_FOUND, "NO_ACTIVE_SNAPSHOT")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_mass_rename_then_restore() {
    let server = server().await;

    let response = server
        .command_post(MASS, ADMIN, Some(json!({"nickname": "Potato"})))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["recorded"], 2);
    assert_eq!(body["summary"]["applied"], 2);
    assert_eq!(
        server.engine.platform.nickname_of(GUILD, "1").as_deref(),
        Some("Potato")
    );
    assert_eq!(
        server.engine.platform.nickname_of(GUILD, "3").as_deref(),
        Some("Pleb")
    );

    let response = server.command_post(RESTORE, ADMIN, None).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["source"], "local");
    assert_eq!(
        body["summary"],
        json!({
            "total": 2,
            "applied": 2,
            "unchanged": 0,
            "insufficient_privilege": 0,
            "failed": 0
        })
    );
    assert_eq!(
        body["entries"],
        json!([
            {"member_id": "1", "outcome": "applied"},
            {"member_id": "2", "outcome": "applied"}
        ])
    );
    assert!(body["archived"].is_string());
    assert_eq!(
        server.engine.platform.nickname_of(GUILD, "1").as_deref(),
        Some("Bob")
    );

    let response = server.command_get(SNAPSHOT, ADMIN).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["active"], false);
    assert_eq!(body["archives"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_restore_reports_failures_per_member() {
    let server = server().await;
    server.command_post(SNAPSHOT, ADMIN, None).await.unwrap();
    server.engine.platform.set_live_nickname(GUILD, "1", Some("X"));
    server.engine.platform.fail_renames_of(GUILD, "1");
    server.engine.platform.remove_member(GUILD, "2");

    let response = server.command_post(RESTORE, ADMIN, None).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["summary"]["failed"], 2);
    assert_eq!(body["entries"][0]["outcome"], "failed");
    assert_eq!(body["entries"][0]["failure"], "rename_rejected");
    assert_eq!(body["entries"][1]["failure"], "unresolved");
}

#[tokio::test]
async fn test_remote_restore() {
    let server = server().await;
    server
        .engine
        .documents
        .serve("https://paste.example/raw/1", r#"{"1":"Remote"}"#);

    let response = server
        .command_post(
            RESTORE_REMOTE,
            ADMIN,
            Some(json!({"url": "https://paste.example/raw/1"})),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["source"], "remote");
    assert_eq!(body["summary"]["applied"], 1);
    assert!(body.get("archived").is_none());
}

#[tokio::test]
async fn test_remote_restore_rejects_bad_url() {
    let server = server().await;
    let response = server
        .command_post(RESTORE_REMOTE, ADMIN, Some(json!({"url": "not a url"})))
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remote_restore_malformed_document() {
    let server = server().await;
    server.command_post(SNAPSHOT, ADMIN, None).await.unwrap();
    server
        .engine
        .documents
        .serve("https://paste.example/raw/bad", "<html></html>");

    let response = server
        .command_post(
            RESTORE_REMOTE,
            ADMIN,
            Some(json!({"url": "https://paste.example/raw/bad"})),
        )
        .await
        .unwrap();
    assert_error(
        response,
        StatusCode::UNPROCESSABLE_ENTITY,
        "INVALID_REMOTE_DOCUMENT",
    )
    .await
    .unwrap();

    assert!(server.engine.active_path(GUILD).exists());
    assert!(server.engine.archive_names().is_empty());
}

#[tokio::test]
async fn test_remote_restore_fetch_failure() {
    let server = server().await;
    let response = server
        .command_post(
            RESTORE_REMOTE,
            ADMIN,
            Some(json!({"url": "https://paste.example/raw/missing"})),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_GATEWAY, "REMOTE_FETCH_FAILED")
        .await
        .unwrap();
}

// ============================================================================
// Audit
// ============================================================================

#[tokio::test]
async fn test_audit() {
    let platform = platform();
    platform
        .add_guild("43", 10)
        .set_everyone_permissions("43", Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES);
    let server = TestServer::start(platform).await.unwrap();

    let response = server.get("/api/v1/audit").await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "MISSING_AUTHORIZATION")
        .await
        .unwrap();

    let response = server
        .client
        .get(server.url("/api/v1/audit"))
        .bearer_auth(TEST_TOKEN)
        .send()
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(
        body["guilds"],
        json!([
            {"guild_id": "42", "status": "good"},
            {
                "guild_id": "43",
                "status": "bad",
                "missing": ["ATTACH_FILES", "MANAGE_NICKNAMES", "MANAGE_ROLES"]
            }
        ])
    );
}
