use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracker_core::{Provider, SessionRecord};

use crate::Db;
use crate::error::Result;

const SESSION_COLUMNS: &str = r#"
  path, provider, session_id, project, messages, user_messages, assistant_messages,
  tool_uses, input_tokens, output_tokens, cache_read_tokens, cache_creation_tokens,
  cost_usd, model, first_message, last_message, duration_ms
"#;

pub(crate) fn provider_from_row(
    row: &Row<'_>,
    idx: usize,
) -> std::result::Result<Provider, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    raw.parse::<Provider>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn get_u64(row: &Row<'_>, idx: usize) -> std::result::Result<u64, rusqlite::Error> {
    Ok(row.get::<_, i64>(idx)?.max(0) as u64)
}

fn get_opt_u64(row: &Row<'_>, idx: usize) -> std::result::Result<Option<u64>, rusqlite::Error> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|value| value.max(0) as u64))
}

pub(crate) fn row_to_session(row: &Row<'_>) -> std::result::Result<SessionRecord, rusqlite::Error> {
    Ok(SessionRecord {
        path: row.get(0)?,
        provider: provider_from_row(row, 1)?,
        session_id: row.get(2)?,
        project: row.get(3)?,
        messages: get_u64(row, 4)?,
        user_messages: get_u64(row, 5)?,
        assistant_messages: get_u64(row, 6)?,
        tool_uses: get_u64(row, 7)?,
        input_tokens: get_u64(row, 8)?,
        output_tokens: get_u64(row, 9)?,
        cache_read_tokens: get_opt_u64(row, 10)?,
        cache_creation_tokens: get_opt_u64(row, 11)?,
        cost_usd: row.get(12)?,
        model: row.get(13)?,
        first_message: row.get(14)?,
        last_message: row.get(15)?,
        duration_ms: get_u64(row, 16)?,
    })
}

pub(crate) fn upsert_session_in(conn: &Connection, session: &SessionRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO session (
          path, provider, session_id, project, messages, user_messages, assistant_messages,
          tool_uses, input_tokens, output_tokens, cache_read_tokens, cache_creation_tokens,
          cost_usd, model, first_message, last_message, duration_ms
        ) VALUES (
          ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17
        )
        "#,
        params![
            session.path,
            session.provider.as_str(),
            session.session_id,
            session.project,
            session.messages as i64,
            session.user_messages as i64,
            session.assistant_messages as i64,
            session.tool_uses as i64,
            session.input_tokens as i64,
            session.output_tokens as i64,
            session.cache_read_tokens.map(|value| value as i64),
            session.cache_creation_tokens.map(|value| value as i64),
            session.cost_usd,
            session.model,
            session.first_message,
            session.last_message,
            session.duration_ms as i64,
        ],
    )?;
    Ok(())
}

impl Db {
    pub fn upsert_session(&self, session: &SessionRecord) -> Result<()> {
        upsert_session_in(&self.conn, session)
    }

    pub fn get_session(&self, path: &str) -> Result<Option<SessionRecord>> {
        let sql = format!("SELECT {} FROM session WHERE path = ?1", SESSION_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [path], row_to_session)
            .optional()?)
    }

    /// Sessions of one provider, newest `last_message` first, undated last.
    pub fn list_sessions(&self, provider: Provider) -> Result<Vec<SessionRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM session
            WHERE provider = ?1
            ORDER BY last_message IS NULL, last_message DESC, path ASC
            "#,
            SESSION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([provider.as_str()], row_to_session)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn list_all_sessions(&self) -> Result<Vec<SessionRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM session
            ORDER BY last_message IS NULL, last_message DESC, path ASC
            "#,
            SESSION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_session)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
