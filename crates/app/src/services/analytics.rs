use chrono::Utc;
use tracker_core::{ProviderSessions, UsageSnapshot, compute_usage};

use crate::error::Result;
use crate::services::SyncService;

#[derive(Clone)]
pub struct AnalyticsService {
    sync: SyncService,
}

impl AnalyticsService {
    pub(super) fn new(sync: SyncService) -> Self {
        Self { sync }
    }

    /// Syncs every provider, ignoring the debounce window, and folds the result.
    pub fn usage(&self) -> Result<UsageSnapshot> {
        let (_, loaded) = self.sync.sync_and_load_all()?;
        let inputs: Vec<ProviderSessions<'_>> = loaded
            .iter()
            .map(|entry| ProviderSessions {
                provider: entry.provider,
                available: entry.available,
                sessions: entry.sessions.as_slice(),
            })
            .collect();
        Ok(compute_usage(&inputs, Utc::now()))
    }

    /// Drops the read cache, then syncs and aggregates.
    pub fn refresh(&self) -> Result<UsageSnapshot> {
        self.sync.invalidate()?;
        self.usage()
    }
}
