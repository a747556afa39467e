use tracing::info;
use tracker_core::DbStats;

use crate::error::Result;
use crate::services::{SharedDb, SyncAllReport, SyncService, lock_db};

#[derive(Clone)]
pub struct StorageService {
    db: SharedDb,
    sync: SyncService,
}

impl StorageService {
    pub(super) fn new(db: SharedDb, sync: SyncService) -> Self {
        Self { db, sync }
    }

    pub fn stats(&self) -> Result<DbStats> {
        let db = lock_db(&self.db)?;
        Ok(db.stats()?)
    }

    /// Drops every tracked file and session, then re-ingests from disk. Settings survive.
    pub fn rebuild(&self) -> Result<SyncAllReport> {
        let report = self.sync.rebuild()?;
        info!(elapsed_ms = report.elapsed_ms, "rebuilt session store");
        Ok(report)
    }
}
