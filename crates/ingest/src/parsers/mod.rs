mod claude;
mod codex;
mod gemini;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracker_core::{Provider, SessionRecord};

pub use claude::ClaudeParser;
pub use codex::CodexParser;
pub use gemini::GeminiParser;

/// Turns one provider log file into a [`SessionRecord`].
///
/// Parsing never fails. Malformed lines are skipped and an unreadable file
/// yields a zero-valued record, which callers discard.
pub trait SessionParser: Send + Sync {
    fn provider(&self) -> Provider;

    fn parse(&self, path: &Path) -> SessionRecord;
}

pub fn parser_for(provider: Provider) -> &'static dyn SessionParser {
    match provider {
        Provider::Claude => &ClaudeParser,
        Provider::Codex => &CodexParser,
        Provider::Gemini => &GeminiParser,
    }
}

pub fn parse_session(provider: Provider, path: &Path) -> SessionRecord {
    parser_for(provider).parse(path)
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub(crate) fn find_value<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| {
        path.iter()
            .try_fold(value, |current, key| current.get(*key))
            .filter(|found| !found.is_null())
    })
}

pub(crate) fn find_string<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths
        .iter()
        .find_map(|path| find_value(value, &[*path]).and_then(Value::as_str))
}

/// Non-negative integer from a JSON number or numeric string.
pub(crate) fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)),
        Value::String(raw) => raw.trim().parse::<u64>().ok(),
        _ => None,
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn u64_at(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(value_to_u64).unwrap_or(0)
}

fn from_epoch(value: i64) -> Option<String> {
    // Values past year 5138 in seconds are read as millis.
    let dt = if value.abs() > 99_999_999_999 {
        DateTime::<Utc>::from_timestamp_millis(value)?
    } else {
        DateTime::<Utc>::from_timestamp(value, 0)?
    };
    Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub(crate) fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, format) {
            let dt = DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc);
            return Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true));
        }
    }
    if !raw.is_empty()
        && raw.chars().all(|ch| ch.is_ascii_digit())
        && let Ok(value) = raw.parse::<i64>()
    {
        return from_epoch(value);
    }
    None
}

pub(crate) fn extract_timestamp(value: &Value) -> Option<String> {
    let raw = find_value(value, &[&["timestamp"], &["ts"], &["time"]])?;
    match raw {
        Value::String(text) => normalize_timestamp(text),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|v| v as i64))
            .and_then(from_epoch),
        _ => None,
    }
}

/// First and last timestamps in file order.
#[derive(Debug, Default)]
pub(crate) struct Timeline {
    first: Option<String>,
    last: Option<String>,
}

impl Timeline {
    pub(crate) fn observe(&mut self, value: &Value) {
        if let Some(ts) = extract_timestamp(value) {
            if self.first.is_none() {
                self.first = Some(ts.clone());
            }
            self.last = Some(ts);
        }
    }

    pub(crate) fn apply(self, record: &mut SessionRecord) {
        record.duration_ms = match (self.first.as_deref(), self.last.as_deref()) {
            (Some(first), Some(last)) => {
                let millis = |raw: &str| {
                    DateTime::parse_from_rfc3339(raw)
                        .map(|dt| dt.timestamp_millis())
                        .unwrap_or(0)
                };
                (millis(last) - millis(first)).max(0) as u64
            }
            _ => 0,
        };
        record.first_message = self.first;
        record.last_message = self.last;
    }
}

pub(crate) fn parse_json_line(line: &[u8]) -> Option<Value> {
    let trimmed = line.trim_ascii();
    if trimmed.first() != Some(&b'{') {
        return None;
    }
    serde_json::from_slice::<Value>(trimmed)
        .ok()
        .filter(Value::is_object)
}

/// Calls `visit` for every JSON-object line of a JSONL file.
pub(crate) fn for_each_json_line(path: &Path, mut visit: impl FnMut(&Value)) -> io::Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.split(b'\n') {
        if let Some(value) = parse_json_line(&line?) {
            visit(&value);
        }
    }
    Ok(())
}

pub(crate) fn add_optional(slot: &mut Option<u64>, amount: u64) {
    *slot = Some(slot.unwrap_or(0).saturating_add(amount));
}
