use std::path::Path;

use serde_json::Value;
use tracing::warn;
use tracker_core::{Provider, SessionRecord, cost_for};

use super::{
    SessionParser, Timeline, add_optional, file_stem, find_string, find_value, for_each_json_line,
    path_string, u64_at,
};

const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const GENERIC_STEMS: &[&str] = &["logs", "chat", "session"];

/// Gemini CLI session logs: flat `*.jsonl` files under `<root>`, additive usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiParser;

fn session_id_for(path: &Path) -> String {
    let stem = file_stem(path);
    if GENERIC_STEMS.contains(&stem.as_str())
        && let Some(parent) = path.parent().and_then(Path::file_name)
    {
        return parent.to_string_lossy().to_string();
    }
    stem
}

fn visit(record: &mut SessionRecord, timeline: &mut Timeline, line: &Value) {
    timeline.observe(line);

    match find_string(line, &[&["role"], &["type"]]) {
        Some("user") => {
            record.messages += 1;
            record.user_messages += 1;
        }
        Some("model" | "gemini" | "assistant") => {
            record.messages += 1;
            record.assistant_messages += 1;
        }
        _ => {}
    }

    if let Some(calls) = line.get("toolCalls").and_then(Value::as_array) {
        record.tool_uses += calls.len() as u64;
    }

    if let Some(usage) = line.get("usageMetadata").filter(|usage| usage.is_object()) {
        add_usage(
            record,
            u64_at(usage, "promptTokenCount"),
            u64_at(usage, "candidatesTokenCount"),
            u64_at(usage, "cachedContentTokenCount"),
        );
    } else if let Some(tokens) = line.get("tokens").filter(|tokens| tokens.is_object()) {
        add_usage(
            record,
            u64_at(tokens, "input"),
            u64_at(tokens, "output"),
            u64_at(tokens, "cached"),
        );
    }

    if let Some(model) = find_value(line, &[&["model"], &["modelVersion"]])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|model| !model.is_empty())
    {
        record.model = Some(model.to_string());
    }
}

fn add_usage(record: &mut SessionRecord, input: u64, output: u64, cached: u64) {
    record.input_tokens = record.input_tokens.saturating_add(input);
    record.output_tokens = record.output_tokens.saturating_add(output);
    add_optional(&mut record.cache_read_tokens, cached);
}

impl SessionParser for GeminiParser {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn parse(&self, path: &Path) -> SessionRecord {
        let session_id = session_id_for(path);
        let mut record = SessionRecord::empty(Provider::Gemini, &path_string(path), &session_id);
        let mut timeline = Timeline::default();
        if let Err(err) = for_each_json_line(path, |line| visit(&mut record, &mut timeline, line)) {
            warn!(path = %path.display(), error = %err, "failed to read gemini session");
            return SessionRecord::empty(Provider::Gemini, &path_string(path), &session_id);
        }

        let model = record
            .model
            .get_or_insert_with(|| DEFAULT_MODEL.to_string())
            .clone();
        record.cost_usd = cost_for(record.input_tokens, record.output_tokens, Some(&model));
        timeline.apply(&mut record);
        record
    }
}
