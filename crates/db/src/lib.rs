mod error;
mod files;
mod migrations;
mod sessions;
mod settings;
mod storage;
mod types;

use std::path::Path;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use types::{SessionUpsert, SyncBatch};

/// Persistent store for file tracking records, parsed sessions and settings.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        Ok(Self { conn })
    }

    /// Opens the store and applies pending migrations.
    pub fn open_and_migrate(path: impl AsRef<Path>) -> Result<Self> {
        let mut db = Self::open(path)?;
        db.migrate()?;
        Ok(db)
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| DbError::from(err))
    }
}
