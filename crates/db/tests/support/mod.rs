#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use tracker_core::{Provider, SessionRecord};
use tracker_db::{Db, SessionUpsert};

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn make_session(provider: Provider, path: &str, last_message: Option<&str>) -> SessionRecord {
    let mut session = SessionRecord::empty(provider, path, "session-1");
    session.project = Some("code/app".to_string());
    session.messages = 3;
    session.user_messages = 1;
    session.assistant_messages = 2;
    session.tool_uses = 1;
    session.input_tokens = 120;
    session.output_tokens = 40;
    session.cost_usd = 0.25;
    session.model = Some("claude-sonnet-4".to_string());
    session.first_message = Some("2025-01-01T00:00:00.000Z".to_string());
    session.last_message = last_message.map(str::to_string);
    session
}

pub fn make_upsert(session: SessionRecord, mtime: i64, size: u64) -> SessionUpsert {
    SessionUpsert {
        session,
        mtime,
        size,
    }
}
