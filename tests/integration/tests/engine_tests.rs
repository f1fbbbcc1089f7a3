//! Engine integration tests
//!
//! The snapshot and restore services against an on-disk snapshot store.
//!
//! Run with: cargo test -p nick-integration-tests --test engine_tests

use nick_core::{DomainError, GuildId, NicknameSnapshot, SnapshotStore};
use nick_integration_tests::{member_id, Engine, InMemoryPlatform, BOT_ID};
use nick_service::dto::{MemberFailure, RestoreOutcome};
use nick_service::{
    MassRenameService, RestoreService, ServiceError, SnapshotCaptureService, StateCommitter,
    MASS_RENAME_REASON, RESTORE_REASON,
};

const GUILD: &str = "77";

fn guild() -> GuildId {
    GuildId::parse(GUILD).unwrap()
}

fn engine(platform: InMemoryPlatform) -> Engine {
    Engine::new(platform).expect("Failed to create engine")
}

fn domain(err: ServiceError) -> DomainError {
    match err {
        ServiceError::Domain(e) => e,
        other => panic!("expected domain error, got {other:?}"),
    }
}

/// `state_77.temp.json_YYMMDD-HHMMSS[-N].archive`
fn is_archive_name(name: &str) -> bool {
    let Some(stamp) = name
        .strip_prefix(&format!("state_{GUILD}.temp.json_"))
        .and_then(|rest| rest.strip_suffix(".archive"))
    else {
        return false;
    };
    fn digits(s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
    }
    match stamp.split('-').collect::<Vec<_>>().as_slice() {
        [date, time] => date.len() == 6 && time.len() == 6 && digits(date) && digits(time),
        [date, time, attempt] => {
            date.len() == 6 && time.len() == 6 && digits(date) && digits(time) && digits(attempt)
        }
        _ => false,
    }
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_capture_then_local_restore() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1)
        .add_member(GUILD, "2", None, 1);
    let engine = engine(platform);

    SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        engine.active_bytes(GUILD).unwrap(),
        br#"{"1":"Bob","2":null}"#
    );

    engine.platform.set_live_nickname(GUILD, "1", Some("X"));
    engine.platform.set_live_nickname(GUILD, "2", Some("X"));

    let report = RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap();

    assert_eq!(report.outcome_of(&member_id("1")), Some(&RestoreOutcome::Applied));
    assert_eq!(report.outcome_of(&member_id("2")), Some(&RestoreOutcome::Applied));
    assert_eq!(engine.platform.nickname_of(GUILD, "1").as_deref(), Some("Bob"));
    assert_eq!(engine.platform.nickname_of(GUILD, "2"), None);

    assert!(!engine.store.exists(&guild()).await.unwrap());
    let archives = engine.archive_names();
    assert_eq!(archives.len(), 1);
    assert!(is_archive_name(&archives[0]), "unexpected archive name {}", archives[0]);

    let archived = std::fs::read(engine.dir().join(&archives[0])).unwrap();
    assert_eq!(archived, br#"{"1":"Bob","2":null}"#);
    assert!(engine
        .platform
        .renames()
        .iter()
        .all(|r| r.reason == RESTORE_REASON));
}

// ============================================================================
// Capture
// ============================================================================

#[tokio::test]
async fn test_capture_twice_is_idempotent() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1)
        .add_member(GUILD, "2", None, 3)
        .add_member(GUILD, "3", Some("Boss"), 20);
    let engine = engine(platform);
    let service = SnapshotCaptureService::new(&engine.ctx);

    service.capture(&guild()).await.unwrap();
    let first = engine.active_bytes(GUILD).unwrap();
    service.capture(&guild()).await.unwrap();
    let second = engine.active_bytes(GUILD).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, br#"{"1":"Bob","2":null}"#);
}

#[tokio::test]
async fn test_capture_merges_without_overwriting() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("A"), 1);
    let engine = engine(platform);
    let service = SnapshotCaptureService::new(&engine.ctx);

    service.capture(&guild()).await.unwrap();
    engine.platform.set_live_nickname(GUILD, "1", Some("B"));
    engine.platform.add_member(GUILD, "2", Some("New"), 1);
    service.capture(&guild()).await.unwrap();

    assert_eq!(
        engine.active_bytes(GUILD).unwrap(),
        br#"{"1":"A","2":"New"}"#
    );
}

#[tokio::test]
async fn test_capture_with_nobody_below_bot_writes_nothing() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 5)
        .add_member(GUILD, "1", Some("Peer"), 5)
        .add_member(GUILD, "2", Some("Boss"), 9);
    let engine = engine(platform);

    let result = SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(!engine.active_path(GUILD).exists());
}

// ============================================================================
// Commit
// ============================================================================

#[tokio::test]
async fn test_peer_is_restored_but_not_captured() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Peer"), 10)
        .add_member(GUILD, "2", Some("Low"), 1);
    let engine = engine(platform);

    let captured = SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap()
        .unwrap();
    assert!(!captured.contains(&member_id("1")));

    // The peer was recorded before the bot lost its lead
    let mut seeded = NicknameSnapshot::new();
    seeded.record(member_id("1"), Some("Old".to_string()));
    engine.store.save(&guild(), &seeded).await.unwrap();

    let report = RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap();
    assert_eq!(report.outcome_of(&member_id("1")), Some(&RestoreOutcome::Applied));
    assert_eq!(engine.platform.nickname_of(GUILD, "1").as_deref(), Some("Old"));
}

#[tokio::test]
async fn test_failed_rename_does_not_stop_the_batch() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("X"), 1)
        .add_member(GUILD, "2", Some("X"), 1)
        .add_member(GUILD, "3", Some("C"), 1);
    platform.fail_renames_of(GUILD, "2");
    let engine = engine(platform);

    let snapshot: NicknameSnapshot = [
        (member_id("1"), Some("A".to_string())),
        (member_id("2"), Some("B".to_string())),
        (member_id("3"), Some("C".to_string())),
    ]
    .into_iter()
    .collect();

    let results = StateCommitter::new(&engine.ctx)
        .commit(&guild(), &snapshot, RESTORE_REASON)
        .await
        .unwrap();

    let outcomes: Vec<_> = results.iter().map(|r| r.outcome.clone()).collect();
    assert_eq!(outcomes[0], RestoreOutcome::Applied);
    assert!(matches!(
        outcomes[1],
        RestoreOutcome::Failed(MemberFailure::RenameRejected { .. })
    ));
    assert_eq!(outcomes[2], RestoreOutcome::SkippedUnchanged);
    assert_eq!(engine.platform.nickname_of(GUILD, "1").as_deref(), Some("A"));
}

#[tokio::test]
async fn test_uncached_member_is_fetched_for_restore() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1);
    let engine = engine(platform);

    SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap();
    engine.platform.set_live_nickname(GUILD, "1", Some("X"));
    engine.platform.make_remote_only(GUILD, "1");

    let report = RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap();

    assert_eq!(report.summary().applied, 1);
    assert_eq!(engine.platform.fetched(), vec![member_id("1")]);
}

#[tokio::test]
async fn test_promotion_between_capture_and_restore() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 5);
    let engine = engine(platform);

    SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap();
    engine.platform.set_live_nickname(GUILD, "1", Some("X"));
    engine.platform.set_position(GUILD, "1", 15);

    let report = RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap();
    assert_eq!(
        report.outcome_of(&member_id("1")),
        Some(&RestoreOutcome::SkippedInsufficientPrivilege)
    );

    // The snapshot was consumed all the same
    assert!(!engine.store.exists(&guild()).await.unwrap());
    assert_eq!(engine.platform.nickname_of(GUILD, "1").as_deref(), Some("X"));
}

#[tokio::test]
async fn test_departed_member_is_reported_unresolved() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1)
        .add_member(GUILD, "2", Some("Al"), 1);
    let engine = engine(platform);

    SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap();
    engine.platform.remove_member(GUILD, "1");
    engine.platform.set_live_nickname(GUILD, "2", None);

    let report = RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap();
    assert_eq!(
        report.outcome_of(&member_id("1")),
        Some(&RestoreOutcome::Failed(MemberFailure::Unresolved))
    );
    assert_eq!(report.outcome_of(&member_id("2")), Some(&RestoreOutcome::Applied));
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_local_restore_without_snapshot() {
    let platform = InMemoryPlatform::new();
    platform.add_guild(GUILD, 10);
    let engine = engine(platform);

    let err = RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap_err();

    assert!(matches!(domain(err), DomainError::NoActiveSnapshot(_)));
    assert!(engine.archive_names().is_empty());
}

#[tokio::test]
async fn test_corrupt_snapshot_touches_nothing() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("X"), 1);
    let engine = engine(platform);
    std::fs::write(engine.active_path(GUILD), b"{\"1\": ").unwrap();

    let err = RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap_err();

    assert!(matches!(domain(err), DomainError::CorruptSnapshot { .. }));
    assert!(engine.platform.renames().is_empty());
    assert!(engine.active_path(GUILD).exists());
    assert!(engine.archive_names().is_empty());
}

#[tokio::test]
async fn test_malformed_remote_document_touches_nothing() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1);
    let engine = engine(platform);

    SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap();
    engine.platform.set_live_nickname(GUILD, "1", Some("X"));

    for (location, body) in [
        ("https://paste.example/raw/html", "<!doctype html><p>gone</p>"),
        ("https://paste.example/raw/list", r#"[["1","Bob"]]"#),
        ("https://paste.example/raw/nested", r#"{"1":{"nick":"Bob"}}"#),
    ] {
        engine.documents.serve(location, body);
        let err = RestoreService::new(&engine.ctx)
            .restore_remote(&guild(), location)
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::InvalidRemoteDocument(_)));
    }

    assert!(engine.platform.renames().is_empty());
    assert_eq!(engine.platform.nickname_of(GUILD, "1").as_deref(), Some("X"));
    assert!(engine.store.exists(&guild()).await.unwrap());
    assert!(engine.archive_names().is_empty());
}

#[tokio::test]
async fn test_remote_restore_archives_existing_snapshot() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1)
        .add_member(GUILD, "2", None, 1);
    let engine = engine(platform);

    SnapshotCaptureService::new(&engine.ctx)
        .capture(&guild())
        .await
        .unwrap();
    engine
        .documents
        .serve("https://paste.example/raw/ok", r#"{"1":"Remote","2":"Two"}"#);

    let report = RestoreService::new(&engine.ctx)
        .restore_remote(&guild(), "https://paste.example/raw/ok")
        .await
        .unwrap();

    assert_eq!(report.summary().applied, 2);
    assert!(report.archived.is_some());
    assert!(!engine.store.exists(&guild()).await.unwrap());
    assert_eq!(engine.archive_names().len(), 1);
}

#[tokio::test]
async fn test_remote_restore_without_local_snapshot() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("X"), 1);
    let engine = engine(platform);
    engine
        .documents
        .serve("https://paste.example/raw/ok", r#"{"1":null}"#);

    let report = RestoreService::new(&engine.ctx)
        .restore_remote(&guild(), "https://paste.example/raw/ok")
        .await
        .unwrap();

    assert_eq!(report.summary().applied, 1);
    assert!(report.archived.is_none());
    assert_eq!(engine.platform.nickname_of(GUILD, "1"), None);
    assert!(engine.archive_names().is_empty());
}

#[tokio::test]
async fn test_repeated_restores_keep_every_archive() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1);
    let engine = engine(platform);
    let capture = SnapshotCaptureService::new(&engine.ctx);
    let restore = RestoreService::new(&engine.ctx);

    for _ in 0..3 {
        capture.capture(&guild()).await.unwrap();
        restore.restore_local(&guild()).await.unwrap();
    }

    let archives = engine.archive_names();
    assert_eq!(archives.len(), 3);
    assert!(archives.iter().all(|name| is_archive_name(name)));
    assert_eq!(engine.store.archives(&guild()).await.unwrap().len(), 3);
}

// ============================================================================
// Mass rename
// ============================================================================

#[tokio::test]
async fn test_mass_rename_then_restore() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1)
        .add_member(GUILD, "2", None, 2)
        .add_member(GUILD, "3", Some("Boss"), 20);
    let engine = engine(platform);

    let report = MassRenameService::new(&engine.ctx)
        .rename_all(&guild(), Some("Potato"), MASS_RENAME_REASON)
        .await
        .unwrap();
    assert_eq!(report.summary.applied, 2);
    assert_eq!(engine.platform.nickname_of(GUILD, "2").as_deref(), Some("Potato"));
    assert_eq!(engine.platform.nickname_of(GUILD, "3").as_deref(), Some("Boss"));
    assert_eq!(engine.platform.nickname_of(GUILD, BOT_ID), None);

    // The undo record stays active until a restore consumes it
    assert_eq!(
        engine.active_bytes(GUILD).unwrap(),
        br#"{"1":"Bob","2":null}"#
    );

    RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap();
    assert_eq!(engine.platform.nickname_of(GUILD, "1").as_deref(), Some("Bob"));
    assert_eq!(engine.platform.nickname_of(GUILD, "2"), None);

    let reasons: Vec<_> = engine
        .platform
        .renames()
        .into_iter()
        .map(|r| r.reason)
        .collect();
    assert_eq!(
        reasons,
        vec![
            MASS_RENAME_REASON,
            MASS_RENAME_REASON,
            RESTORE_REASON,
            RESTORE_REASON
        ]
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_commands_on_one_guild_are_serialized() {
    let platform = InMemoryPlatform::new();
    platform.add_guild(GUILD, 10);
    for id in 1..=20 {
        platform.add_member(GUILD, &id.to_string(), Some(&format!("n{id}")), 1);
    }
    let engine = engine(platform);
    let capture = SnapshotCaptureService::new(&engine.ctx);
    let rename = MassRenameService::new(&engine.ctx);

    let g1 = guild();
    let g2 = guild();
    let (captured, renamed) = tokio::join!(
        capture.capture(&g1),
        rename.rename_all(&g2, Some("Same"), MASS_RENAME_REASON)
    );
    captured.unwrap();
    renamed.unwrap();

    // Whichever ran first, the undo record holds the original names
    let snapshot = engine.store.load(&guild()).await.unwrap();
    assert_eq!(snapshot.len(), 20);
    assert_eq!(snapshot.get(&member_id("7")), Some(Some("n7")));
}

#[tokio::test]
async fn test_guilds_are_independent() {
    let platform = InMemoryPlatform::new();
    platform
        .add_guild(GUILD, 10)
        .add_member(GUILD, "1", Some("Bob"), 1);
    platform
        .add_guild("88", 10)
        .add_member("88", "1", Some("Robert"), 1);
    let engine = engine(platform);
    let capture = SnapshotCaptureService::new(&engine.ctx);
    let other = GuildId::parse("88").unwrap();

    let g = guild();
    let (a, b) = tokio::join!(capture.capture(&g), capture.capture(&other));
    a.unwrap();
    b.unwrap();

    RestoreService::new(&engine.ctx)
        .restore_local(&guild())
        .await
        .unwrap();

    assert!(!engine.store.exists(&guild()).await.unwrap());
    assert_eq!(engine.active_bytes("88").unwrap(), br#"{"1":"Robert"}"#);
}
