use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use tracker_core::{Provider, SessionRecord};

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, SharedDb, lock_db};
use ingest::SyncStats;
use tracker_db::Db;

/// One provider's sessions as read right after a sync.
#[derive(Debug)]
pub struct CachedSessions {
    pub synced_at: Instant,
    pub sessions: Arc<Vec<SessionRecord>>,
}

/// A provider's freshly synced sessions and whether its root exists.
#[derive(Debug, Clone)]
pub struct LoadedSessions {
    pub provider: Provider,
    pub available: bool,
    pub sessions: Arc<Vec<SessionRecord>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAllReport {
    pub providers: Vec<SyncStats>,
    pub elapsed_ms: u64,
}

type SessionCache = RwLock<HashMap<Provider, Arc<CachedSessions>>>;

fn poisoned() -> AppError {
    AppError::Message("session cache lock poisoned".to_string())
}

/// Runs provider syncs against the shared store and keeps a debounced
/// per-provider read cache. Entries are replaced, never mutated.
#[derive(Clone)]
pub struct SyncService {
    config: SharedConfig,
    db: SharedDb,
    cache: Arc<SessionCache>,
}

impl SyncService {
    pub(super) fn new(config: SharedConfig, db: SharedDb) -> Self {
        Self {
            config,
            db,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Root directory exists right now, even if it holds no sessions.
    pub fn is_available(&self, provider: Provider) -> bool {
        self.config.provider_roots.get(provider).is_dir()
    }

    pub fn sync_provider(&self, provider: Provider) -> Result<SyncStats> {
        let stats = {
            let mut db = lock_db(&self.db)?;
            ingest::sync_provider(&mut db, provider, self.config.provider_roots.get(provider))?
        };
        if stats.has_changes() {
            self.invalidate_provider(provider)?;
        }
        Ok(stats)
    }

    /// Syncs every provider in fixed order.
    pub fn sync_all(&self) -> Result<SyncAllReport> {
        let start = Instant::now();
        let providers = Provider::ALL
            .into_iter()
            .map(|provider| self.sync_provider(provider))
            .collect::<Result<Vec<_>>>()?;
        Ok(SyncAllReport {
            providers,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Sessions of `provider`, newest first. Within the debounce window of the
    /// last cached sync the cached list is returned without touching disk.
    pub fn sessions(&self, provider: Provider) -> Result<Arc<Vec<SessionRecord>>> {
        if let Some(entry) = self.cached(provider)?
            && entry.synced_at.elapsed() < self.config.debounce
        {
            debug!(%provider, "serving cached sessions");
            return Ok(entry.sessions.clone());
        }
        let mut db = lock_db(&self.db)?;
        let (_, entry) = self.load(&mut db, provider)?;
        Ok(entry.sessions.clone())
    }

    /// Syncs every provider and reads each one back, all under one hold of
    /// the store lock. The read cache is replaced with what was read.
    pub fn sync_and_load_all(&self) -> Result<(SyncAllReport, Vec<LoadedSessions>)> {
        let mut db = lock_db(&self.db)?;
        self.load_all(&mut db)
    }

    pub fn invalidate(&self) -> Result<()> {
        self.cache.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    /// Drops the cache and resyncs every provider regardless of the window.
    pub fn refresh(&self) -> Result<SyncAllReport> {
        self.invalidate()?;
        let (report, _) = self.sync_and_load_all()?;
        Ok(report)
    }

    /// Empties tracked files and sessions and re-ingests every provider.
    /// Readers wait on the store lock, so they never see the emptied store.
    pub fn rebuild(&self) -> Result<SyncAllReport> {
        let mut db = lock_db(&self.db)?;
        db.clear_all()?;
        self.invalidate()?;
        let (report, _) = self.load_all(&mut db)?;
        Ok(report)
    }

    fn cached(&self, provider: Provider) -> Result<Option<Arc<CachedSessions>>> {
        let cache = self.cache.read().map_err(|_| poisoned())?;
        Ok(cache.get(&provider).cloned())
    }

    fn invalidate_provider(&self, provider: Provider) -> Result<()> {
        self.cache.write().map_err(|_| poisoned())?.remove(&provider);
        Ok(())
    }

    fn load_all(&self, db: &mut Db) -> Result<(SyncAllReport, Vec<LoadedSessions>)> {
        let start = Instant::now();
        let mut providers = Vec::with_capacity(Provider::ALL.len());
        let mut loaded = Vec::with_capacity(Provider::ALL.len());
        for provider in Provider::ALL {
            let (stats, entry) = self.load(db, provider)?;
            loaded.push(LoadedSessions {
                provider,
                available: self.is_available(provider),
                sessions: entry.sessions.clone(),
            });
            providers.push(stats);
        }
        let report = SyncAllReport {
            providers,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        Ok((report, loaded))
    }

    /// Syncs and reads back through the caller's store guard, then swaps in a new entry.
    fn load(&self, db: &mut Db, provider: Provider) -> Result<(SyncStats, Arc<CachedSessions>)> {
        let stats = ingest::sync_provider(db, provider, self.config.provider_roots.get(provider))?;
        let sessions = db.list_sessions(provider)?;
        let entry = Arc::new(CachedSessions {
            synced_at: Instant::now(),
            sessions: Arc::new(sessions),
        });
        self.cache
            .write()
            .map_err(|_| poisoned())?
            .insert(provider, entry.clone());
        Ok((stats, entry))
    }
}
