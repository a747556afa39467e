pub mod app;
pub mod error;
pub mod services;
pub mod startup;

pub use app::{AppConfig, AppState, DEFAULT_DEBOUNCE};
pub use error::{AppError, Result};
pub use ingest::{ProviderRoots, SyncIssue, SyncStats};
pub use services::{AppServices, CachedSessions, LoadedSessions, SyncAllReport};
pub use startup::{AppPaths, DB_FILE_NAME, ensure_app_data_dir};
