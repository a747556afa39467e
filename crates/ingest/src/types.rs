use serde::Serialize;
use thiserror::Error;
use tracker_core::Provider;

/// Outcome of one provider sync pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub provider: Provider,
    pub available: bool,
    pub files_scanned: usize,
    pub skipped: usize,
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub issues: Vec<SyncIssue>,
}

impl SyncStats {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            available: false,
            files_scanned: 0,
            skipped: 0,
            added: 0,
            updated: 0,
            deleted: 0,
            issues: Vec::new(),
        }
    }

    /// True when the pass wrote anything to the store.
    pub fn has_changes(&self) -> bool {
        self.added + self.updated + self.deleted > 0
    }
}

/// Non-fatal issues encountered during a sync pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncIssue {
    pub file_path: String,
    pub message: String,
}

/// Errors emitted by the ingest pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("db error: {0}")]
    Db(#[from] tracker_db::DbError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
