use tracker_core::Provider;
use tracker_db::SyncBatch;

mod support;

use support::{make_session, make_upsert, setup_db};

#[test]
fn needs_reparse_tracks_mtime_and_size() {
    let test_db = setup_db();
    let db = &test_db.db;
    assert!(db.needs_reparse("/logs/a.jsonl", 10, 100).expect("untracked"));

    db.upsert_file_record("/logs/a.jsonl", Provider::Claude, 10, 100)
        .expect("upsert");
    assert!(!db.needs_reparse("/logs/a.jsonl", 10, 100).expect("same"));
    assert!(db.needs_reparse("/logs/a.jsonl", 11, 100).expect("mtime"));
    assert!(db.needs_reparse("/logs/a.jsonl", 10, 101).expect("size"));

    let record = db
        .get_file_record("/logs/a.jsonl")
        .expect("get")
        .expect("present");
    assert_eq!(record.provider, Provider::Claude);
    assert!(record.last_parsed_at > 0);
}

#[test]
fn tracked_paths_are_scoped_by_provider() {
    let test_db = setup_db();
    let db = &test_db.db;
    db.upsert_file_record("/c/a.jsonl", Provider::Claude, 1, 1)
        .expect("claude");
    db.upsert_file_record("/x/b.jsonl", Provider::Codex, 1, 1)
        .expect("codex");

    let claude = db.list_tracked_paths(Provider::Claude).expect("paths");
    assert_eq!(claude.len(), 1);
    assert!(claude.contains("/c/a.jsonl"));
    assert!(db.list_tracked_paths(Provider::Gemini).expect("empty").is_empty());

    let records = db.list_file_records(Provider::Codex).expect("records");
    assert_eq!(records["/x/b.jsonl"].mtime, 1);
}

#[test]
fn upsert_session_replaces_previous_row() {
    let test_db = setup_db();
    let db = &test_db.db;
    let mut session = make_session(Provider::Codex, "/x/a.jsonl", Some("2025-01-01T00:00:00.000Z"));
    db.upsert_session(&session).expect("insert");

    session.messages = 9;
    session.cache_read_tokens = Some(7);
    db.upsert_session(&session).expect("update");

    let stored = db.list_sessions(Provider::Codex).expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], session);
}

#[test]
fn sessions_order_newest_first_with_undated_last() {
    let test_db = setup_db();
    let db = &test_db.db;
    db.upsert_session(&make_session(Provider::Claude, "/c/old.jsonl", Some("2025-01-01T00:00:00.000Z")))
        .expect("old");
    db.upsert_session(&make_session(Provider::Claude, "/c/none.jsonl", None))
        .expect("none");
    db.upsert_session(&make_session(Provider::Claude, "/c/new.jsonl", Some("2025-03-01T00:00:00.000Z")))
        .expect("new");
    db.upsert_session(&make_session(Provider::Gemini, "/g/mid.jsonl", Some("2025-02-01T00:00:00.000Z")))
        .expect("gemini");

    let paths: Vec<String> = db
        .list_sessions(Provider::Claude)
        .expect("list")
        .into_iter()
        .map(|s| s.path)
        .collect();
    assert_eq!(paths, vec!["/c/new.jsonl", "/c/old.jsonl", "/c/none.jsonl"]);

    let all = db.list_all_sessions().expect("all");
    assert_eq!(all.len(), 4);
    assert_eq!(all[1].path, "/g/mid.jsonl");
}

#[test]
fn delete_removes_record_and_session() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    db.upsert_file_record("/c/a.jsonl", Provider::Claude, 1, 1)
        .expect("record");
    db.upsert_session(&make_session(Provider::Claude, "/c/a.jsonl", None))
        .expect("session");

    assert!(db.delete_file_and_session("/c/a.jsonl").expect("delete"));
    assert!(db.get_file_record("/c/a.jsonl").expect("get").is_none());
    assert!(db.get_session("/c/a.jsonl").expect("get").is_none());
    assert!(!db.delete_file_and_session("/c/a.jsonl").expect("again"));
}

#[test]
fn sync_batch_applies_upserts_and_deletions_together() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    db.upsert_file_record("/c/gone.jsonl", Provider::Claude, 1, 1)
        .expect("record");
    db.upsert_session(&make_session(Provider::Claude, "/c/gone.jsonl", None))
        .expect("session");

    let batch = SyncBatch {
        upserts: vec![
            make_upsert(make_session(Provider::Claude, "/c/a.jsonl", None), 5, 50),
            make_upsert(make_session(Provider::Claude, "/c/b.jsonl", None), 6, 60),
        ],
        deletions: vec!["/c/gone.jsonl".to_string()],
    };
    db.apply_sync_batch(&batch).expect("apply");

    let records = db.list_file_records(Provider::Claude).expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records["/c/b.jsonl"].size, 60);
    assert!(db.get_session("/c/gone.jsonl").expect("get").is_none());
    assert_eq!(db.list_sessions(Provider::Claude).expect("list").len(), 2);

    db.apply_sync_batch(&SyncBatch::default()).expect("empty batch");
    assert_eq!(db.stats().expect("stats").session_count, 2);
}

#[test]
fn clear_all_keeps_settings() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    db.set_setting("theme", "dark").expect("setting");
    db.apply_sync_batch(&SyncBatch {
        upserts: vec![make_upsert(make_session(Provider::Gemini, "/g/a.jsonl", None), 1, 1)],
        deletions: Vec::new(),
    })
    .expect("apply");

    let before = db.stats().expect("stats");
    assert_eq!(before.session_count, 1);
    assert_eq!(before.file_count, 1);
    assert!(before.storage_bytes > 0);

    db.clear_all().expect("clear");
    let after = db.stats().expect("stats");
    assert_eq!(after.session_count, 0);
    assert_eq!(after.file_count, 0);
    assert_eq!(db.get_setting("theme", "light").expect("get"), "dark");
}

#[test]
fn missing_setting_returns_default() {
    let test_db = setup_db();
    assert_eq!(
        test_db.db.get_setting("absent", "fallback").expect("get"),
        "fallback"
    );
    assert_eq!(test_db.db.setting_updated_at("absent").expect("get"), None);
}
