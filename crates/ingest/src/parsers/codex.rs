use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::warn;
use tracker_core::{Provider, SessionRecord, cost_for, project_label_from_path};

use super::{
    SessionParser, Timeline, file_stem, find_string, parse_json_line, path_string, u64_at,
};

const TOOL_CALL_TYPES: &[&str] = &["function_call", "custom_tool_call", "local_shell_call"];
const ROLLOUT_PREFIX: &str = "rollout-";
const ROLLOUT_TIMESTAMP_LEN: usize = 19;

/// Codex rollouts: `<root>/YYYY/MM/DD/rollout-<timestamp>-<uuid>.jsonl`, cumulative usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodexParser;

/// `rollout-2025-01-01T00-00-00-<uuid>` becomes `<uuid>`; other stems pass through.
pub(crate) fn session_id_from_stem(stem: &str) -> String {
    stem.strip_prefix(ROLLOUT_PREFIX)
        .and_then(|rest| rest.get(ROLLOUT_TIMESTAMP_LEN..))
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|id| !id.is_empty())
        .unwrap_or(stem)
        .to_string()
}

/// Splits a rollout into events. Handles JSON arrays, `{"items": [...]}` and JSONL.
fn read_events(bytes: &[u8]) -> Vec<Value> {
    let first = bytes.iter().find(|byte| !byte.is_ascii_whitespace());
    if matches!(first, Some(b'[') | Some(b'{'))
        && let Ok(document) = serde_json::from_slice::<Value>(bytes)
    {
        match document {
            Value::Array(items) => return items,
            Value::Object(mut object) => {
                if let Some(Value::Array(items)) = object.remove("items") {
                    return items;
                }
                return vec![Value::Object(object)];
            }
            _ => return Vec::new(),
        }
    }
    bytes.split(|byte| *byte == b'\n').filter_map(parse_json_line).collect()
}

#[derive(Default)]
struct CodexState {
    timeline: Timeline,
    meta_id: Option<String>,
    meta_cwd: Option<String>,
    context_cwd: Option<String>,
}

impl CodexState {
    fn visit(&mut self, record: &mut SessionRecord, event: &Value) {
        self.timeline.observe(event);
        let kind = event.get("type").and_then(Value::as_str).unwrap_or("");
        let payload = event.get("payload").unwrap_or(event);
        let subtype = payload.get("type").and_then(Value::as_str).unwrap_or("");

        match kind {
            "session_meta" => {
                if let Some(id) = non_empty(payload.get("id")) {
                    self.meta_id = Some(id.to_string());
                }
                if let Some(cwd) = non_empty(payload.get("cwd")) {
                    self.meta_cwd = Some(cwd.to_string());
                }
                set_model(record, payload.get("model"));
            }
            "turn_context" => {
                if let Some(cwd) = non_empty(payload.get("cwd")) {
                    self.context_cwd = Some(cwd.to_string());
                }
                set_model(record, payload.get("model"));
            }
            "event_msg" => match subtype {
                "user_message" => {
                    record.messages += 1;
                    record.user_messages += 1;
                }
                "agent_message" => {
                    record.messages += 1;
                    record.assistant_messages += 1;
                }
                "token_count" => {
                    if let Some(info) = payload.get("info").filter(|info| info.is_object()) {
                        apply_token_count(record, info);
                        set_model(record, info.get("model"));
                    }
                }
                other if TOOL_CALL_TYPES.contains(&other) => count_tool_call(record),
                _ => {}
            },
            "response_item" => visit_item(record, subtype, payload),
            // Legacy rollouts carry response items without an envelope.
            _ => visit_item(record, kind, payload),
        }
    }
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn set_model(record: &mut SessionRecord, value: Option<&Value>) {
    if let Some(model) = non_empty(value) {
        record.model = Some(model.to_string());
    }
}

fn count_tool_call(record: &mut SessionRecord) {
    record.messages += 1;
    record.tool_uses += 1;
}

fn visit_item(record: &mut SessionRecord, item_type: &str, item: &Value) {
    if item_type == "message" {
        match find_string(item, &[&["role"]]) {
            Some("user") => {
                record.messages += 1;
                record.user_messages += 1;
            }
            Some("assistant") => {
                record.messages += 1;
                record.assistant_messages += 1;
            }
            _ => {}
        }
    } else if TOOL_CALL_TYPES.contains(&item_type) {
        count_tool_call(record);
    }
}

/// `total_token_usage` is a running total, so the latest value replaces the previous one.
fn apply_token_count(record: &mut SessionRecord, info: &Value) {
    let Some(total) = info.get("total_token_usage").filter(|total| total.is_object()) else {
        return;
    };
    record.input_tokens = u64_at(total, "input_tokens");
    record.output_tokens = u64_at(total, "output_tokens");
    record.cache_read_tokens = Some(u64_at(total, "cached_input_tokens"));
}

impl SessionParser for CodexParser {
    fn provider(&self) -> Provider {
        Provider::Codex
    }

    fn parse(&self, path: &Path) -> SessionRecord {
        let stem = file_stem(path);
        let mut record =
            SessionRecord::empty(Provider::Codex, &path_string(path), &session_id_from_stem(&stem));
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read codex rollout");
                return record;
            }
        };

        let mut state = CodexState::default();
        for event in read_events(&bytes) {
            state.visit(&mut record, &event);
        }

        if let Some(id) = state.meta_id.take() {
            record.session_id = id;
        }
        record.project = state
            .meta_cwd
            .take()
            .or(state.context_cwd.take())
            .and_then(|cwd| project_label_from_path(&cwd));
        record.cost_usd = cost_for(record.input_tokens, record.output_tokens, record.model.as_deref());
        state.timeline.apply(&mut record);
        record
    }
}
