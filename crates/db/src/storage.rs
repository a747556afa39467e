use chrono::Utc;
use tracker_core::DbStats;

use crate::Db;
use crate::error::Result;
use crate::files::{delete_file_and_session_in, upsert_file_record_in};
use crate::sessions::upsert_session_in;
use crate::types::SyncBatch;

impl Db {
    /// Writes one provider pass in a single transaction: every upsert lands or none do.
    pub fn apply_sync_batch(&mut self, batch: &SyncBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let parsed_at = Utc::now().timestamp_millis();
        let tx = self.conn.transaction()?;
        for upsert in &batch.upserts {
            let session = &upsert.session;
            upsert_file_record_in(
                &tx,
                &session.path,
                session.provider,
                upsert.mtime,
                upsert.size,
                parsed_at,
            )?;
            upsert_session_in(&tx, session)?;
        }
        for path in &batch.deletions {
            delete_file_and_session_in(&tx, path)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn stats(&self) -> Result<DbStats> {
        let session_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM session", [], |row| row.get(0))?;
        let file_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM file_record", [], |row| row.get(0))?;
        let page_count: i64 = self
            .conn
            .query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = self
            .conn
            .query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok(DbStats {
            session_count: session_count.max(0) as u64,
            file_count: file_count.max(0) as u64,
            storage_bytes: page_count.saturating_mul(page_size).max(0) as u64,
        })
    }

    /// Removes every file record and session. Settings are kept.
    pub fn clear_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM session", [])?;
        tx.execute("DELETE FROM file_record", [])?;
        tx.commit()?;
        Ok(())
    }
}
