use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;

impl Db {
    pub fn get_setting(&self, key: &str, default: &str) -> Result<String> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_setting WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value.unwrap_or_else(|| default.to_string()))
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_setting (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
              value = excluded.value,
              updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    /// Epoch millis of the last save for `key`, if it was ever saved.
    pub fn setting_updated_at(&self, key: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT updated_at FROM app_setting WHERE key = ?1",
                [key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?)
    }
}
