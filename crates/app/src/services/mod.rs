mod analytics;
mod settings;
mod storage;
mod sync;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::app::AppConfig;
use crate::error::{AppError, Result};
use tracker_db::Db;

pub use analytics::AnalyticsService;
pub use settings::SettingsService;
pub use storage::StorageService;
pub use sync::{CachedSessions, LoadedSessions, SyncAllReport, SyncService};

type SharedConfig = Arc<AppConfig>;
type SharedDb = Arc<Mutex<Db>>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub sync: SyncService,
    pub analytics: AnalyticsService,
    pub settings: SettingsService,
    pub storage: StorageService,
}

impl AppServices {
    pub(crate) fn new(config: SharedConfig, db: SharedDb) -> Self {
        let sync = SyncService::new(config, db.clone());
        Self {
            analytics: AnalyticsService::new(sync.clone()),
            settings: SettingsService::new(db.clone()),
            storage: StorageService::new(db, sync.clone()),
            sync,
        }
    }
}

/// Takes the single-writer lock on the store.
fn lock_db(db: &SharedDb) -> Result<MutexGuard<'_, Db>> {
    db.lock()
        .map_err(|_| AppError::Message("store lock poisoned".to_string()))
}
