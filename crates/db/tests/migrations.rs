use rusqlite::Connection;
use tracker_core::Provider;

mod support;

use support::{make_session, setup_db};

#[test]
fn migrate_is_idempotent() {
    let mut test_db = setup_db();
    test_db.db.migrate().expect("second migrate");
    test_db.db.migrate().expect("third migrate");
    let stats = test_db.db.stats().expect("stats");
    assert_eq!(stats.session_count, 0);
    assert_eq!(stats.file_count, 0);
}

#[test]
fn fresh_store_tracks_setting_update_time() {
    let test_db = setup_db();
    let conn = Connection::open(&test_db.path).expect("open conn");
    let columns: Vec<String> = conn
        .prepare("PRAGMA table_info(app_setting)")
        .expect("prepare")
        .query_map([], |row| row.get::<_, String>(1))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("columns");
    assert_eq!(columns, vec!["key", "value", "updated_at"]);

    assert_eq!(test_db.db.setting_updated_at("theme").expect("missing"), None);
    test_db.db.set_setting("theme", "dark").expect("set");
    let updated = test_db
        .db
        .setting_updated_at("theme")
        .expect("updated_at")
        .expect("present");
    assert!(updated > 0);
}

#[test]
fn data_survives_reopen() {
    let support::TestDb {
        _dir: _guard,
        mut db,
        path,
    } = setup_db();
    db.upsert_file_record("/logs/a.jsonl", Provider::Claude, 1_000, 64)
        .expect("file record");
    db.upsert_session(&make_session(
        Provider::Claude,
        "/logs/a.jsonl",
        Some("2025-01-02T00:00:00.000Z"),
    ))
    .expect("session");
    db.set_setting("theme", "dark").expect("setting");
    db.migrate().expect("migrate again");
    db.close().expect("close");

    let reopened = tracker_db::Db::open_and_migrate(&path).expect("reopen");
    assert_eq!(reopened.list_all_sessions().expect("sessions").len(), 1);
    assert!(reopened.get_file_record("/logs/a.jsonl").expect("record").is_some());
    assert_eq!(reopened.get_setting("theme", "light").expect("get"), "dark");
}
