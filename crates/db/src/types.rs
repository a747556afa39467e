use tracker_core::SessionRecord;

/// A parsed session together with the file stamp it was parsed from.
#[derive(Debug, Clone)]
pub struct SessionUpsert {
    pub session: SessionRecord,
    pub mtime: i64,
    pub size: u64,
}

/// Every store mutation produced by one provider sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncBatch {
    pub upserts: Vec<SessionUpsert>,
    pub deletions: Vec<String>,
}

impl SyncBatch {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }
}
