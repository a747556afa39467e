use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ingest::ProviderRoots;
use tracker_db::Db;

use crate::error::{AppError, Result};
use crate::services::AppServices;

/// Window within which repeated session reads are served from the cache.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// Paths and tuning needed to run the local tracker.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub provider_roots: ProviderRoots,
    pub debounce: Duration,
}

impl AppConfig {
    /// Store at `db_path`, provider roots from the environment, default debounce.
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            provider_roots: ProviderRoots::from_env(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Application state shared by frontends. Owns the single store connection.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: AppServices,
    db: Arc<Mutex<Db>>,
}

impl AppState {
    /// Creates the data directory, opens the store and applies migrations.
    pub fn open(config: AppConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|err| AppError::Message(format!("create data dir: {}", err)))?;
        }
        let db = Db::open_and_migrate(&config.db_path)
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        let config = Arc::new(config);
        let db = Arc::new(Mutex::new(db));
        let services = AppServices::new(config.clone(), db.clone());
        Ok(Self {
            config,
            services,
            db,
        })
    }

    /// Closes the store. Fails if another clone of this state is still alive.
    pub fn close(self) -> Result<()> {
        let Self { services, db, .. } = self;
        drop(services);
        let mutex = Arc::try_unwrap(db)
            .map_err(|_| AppError::Message("store is still in use".to_string()))?;
        let db = mutex
            .into_inner()
            .map_err(|_| AppError::Message("store lock poisoned".to_string()))?;
        Ok(db.close()?)
    }
}
