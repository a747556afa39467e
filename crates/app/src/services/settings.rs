use crate::error::{AppError, Result};
use crate::services::{SharedDb, lock_db};

#[derive(Clone)]
pub struct SettingsService {
    db: SharedDb,
}

fn validate_key(key: &str) -> Result<&str> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::InvalidInput("setting key is required".to_string()));
    }
    Ok(key)
}

impl SettingsService {
    pub(super) fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn get(&self, key: &str, default: &str) -> Result<String> {
        let key = validate_key(key)?;
        let db = lock_db(&self.db)?;
        Ok(db.get_setting(key, default)?)
    }

    pub fn save(&self, key: &str, value: &str) -> Result<()> {
        let key = validate_key(key)?;
        let db = lock_db(&self.db)?;
        db.set_setting(key, value)?;
        Ok(())
    }
}
