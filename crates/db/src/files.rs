use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracker_core::{FileRecord, Provider};

use crate::Db;
use crate::error::Result;
use crate::sessions::provider_from_row;

pub(crate) fn row_to_file_record(row: &Row<'_>) -> std::result::Result<FileRecord, rusqlite::Error> {
    Ok(FileRecord {
        path: row.get(0)?,
        provider: provider_from_row(row, 1)?,
        mtime: row.get(2)?,
        size: row.get::<_, i64>(3)?.max(0) as u64,
        last_parsed_at: row.get(4)?,
    })
}

pub(crate) fn upsert_file_record_in(
    conn: &Connection,
    path: &str,
    provider: Provider,
    mtime: i64,
    size: u64,
    parsed_at: i64,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO file_record (path, provider, mtime, size, last_parsed_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(path) DO UPDATE SET
          provider = excluded.provider,
          mtime = excluded.mtime,
          size = excluded.size,
          last_parsed_at = excluded.last_parsed_at
        "#,
        params![path, provider.as_str(), mtime, size as i64, parsed_at],
    )?;
    Ok(())
}

pub(crate) fn delete_file_and_session_in(conn: &Connection, path: &str) -> Result<usize> {
    let removed = conn.execute("DELETE FROM file_record WHERE path = ?1", [path])?;
    conn.execute("DELETE FROM session WHERE path = ?1", [path])?;
    Ok(removed)
}

impl Db {
    pub fn get_file_record(&self, path: &str) -> Result<Option<FileRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT path, provider, mtime, size, last_parsed_at
                FROM file_record
                WHERE path = ?1
                "#,
                [path],
                row_to_file_record,
            )
            .optional()?)
    }

    pub fn upsert_file_record(
        &self,
        path: &str,
        provider: Provider,
        mtime: i64,
        size: u64,
    ) -> Result<()> {
        upsert_file_record_in(
            &self.conn,
            path,
            provider,
            mtime,
            size,
            Utc::now().timestamp_millis(),
        )
    }

    pub fn list_tracked_paths(&self, provider: Provider) -> Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM file_record WHERE provider = ?1")?;
        let rows = stmt.query_map([provider.as_str()], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<HashSet<_>, _>>()?)
    }

    /// All tracking records of a provider keyed by path, for bulk change detection.
    pub fn list_file_records(&self, provider: Provider) -> Result<HashMap<String, FileRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT path, provider, mtime, size, last_parsed_at
            FROM file_record
            WHERE provider = ?1
            "#,
        )?;
        let rows = stmt.query_map([provider.as_str()], row_to_file_record)?;
        let mut records = HashMap::new();
        for record in rows {
            let record = record?;
            records.insert(record.path.clone(), record);
        }
        Ok(records)
    }

    /// True when the file was never tracked or its stored mtime/size differ.
    pub fn needs_reparse(&self, path: &str, mtime: i64, size: u64) -> Result<bool> {
        Ok(match self.get_file_record(path)? {
            Some(record) => !record.is_current(mtime, size),
            None => true,
        })
    }

    pub fn delete_file_and_session(&mut self, path: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let removed = delete_file_and_session_in(&tx, path)?;
        tx.commit()?;
        Ok(removed > 0)
    }
}
