use std::path::Path;

use serde_json::Value;
use tracing::warn;
use tracker_core::{Provider, SessionRecord, cost_for};

use super::{
    SessionParser, Timeline, add_optional, file_stem, find_string, find_value, for_each_json_line,
    path_string, u64_at, value_to_f64,
};

const MESSAGE_TYPES: &[&str] = &["user", "assistant", "system", "tool_use", "tool_result"];
const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Claude Code transcripts: `<root>/<encoded-project>/<session>.jsonl`, additive usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeParser;

/// Decodes a project directory such as `-Users-alice-code-app` to `code/app`.
pub(crate) fn decode_project_dir(name: &str) -> String {
    let Some(encoded) = name.strip_prefix('-') else {
        return name.to_string();
    };
    let segments: Vec<&str> = encoded.split('-').filter(|part| !part.is_empty()).collect();
    match segments.as_slice() {
        [] => name.to_string(),
        [only] => (*only).to_string(),
        [.., parent, last] => format!("{}/{}", parent, last),
    }
}

fn count_content_tool_uses(line: &Value) -> u64 {
    line.get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("type").and_then(Value::as_str) == Some("tool_use"))
                .count() as u64
        })
        .unwrap_or(0)
}

#[derive(Default)]
struct ClaudeState {
    timeline: Timeline,
    embedded_cost: f64,
}

impl ClaudeState {
    fn visit(&mut self, record: &mut SessionRecord, line: &Value) {
        self.timeline.observe(line);
        let kind = line.get("type").and_then(Value::as_str).unwrap_or("");

        if MESSAGE_TYPES.contains(&kind) {
            record.messages += 1;
            if matches!(kind, "user" | "assistant") {
                match find_string(line, &[&["message", "role"]]).unwrap_or(kind) {
                    "user" => record.user_messages += 1,
                    "assistant" => record.assistant_messages += 1,
                    _ => {}
                }
            }
        }

        record.tool_uses += if kind == "tool_use" {
            1
        } else {
            count_content_tool_uses(line)
        };

        if let Some(usage) = find_value(line, &[&["message", "usage"], &["usage"]])
            .filter(|usage| usage.is_object())
        {
            record.input_tokens = record
                .input_tokens
                .saturating_add(u64_at(usage, "input_tokens"));
            record.output_tokens = record
                .output_tokens
                .saturating_add(u64_at(usage, "output_tokens"));
            add_optional(
                &mut record.cache_read_tokens,
                u64_at(usage, "cache_read_input_tokens"),
            );
            add_optional(
                &mut record.cache_creation_tokens,
                u64_at(usage, "cache_creation_input_tokens"),
            );
        }

        if let Some(model) = find_string(line, &[&["message", "model"], &["model"]])
            .map(str::trim)
            .filter(|model| !model.is_empty() && *model != SYNTHETIC_MODEL)
        {
            record.model = Some(model.to_string());
        }

        if let Some(cost) = find_value(line, &[&["costUSD"], &["cost_usd"]]).and_then(value_to_f64)
        {
            self.embedded_cost += cost;
        }
    }
}

impl SessionParser for ClaudeParser {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    fn parse(&self, path: &Path) -> SessionRecord {
        let mut record = SessionRecord::empty(Provider::Claude, &path_string(path), &file_stem(path));
        let mut state = ClaudeState::default();
        if let Err(err) = for_each_json_line(path, |line| state.visit(&mut record, line)) {
            warn!(path = %path.display(), error = %err, "failed to read claude session");
            return SessionRecord::empty(Provider::Claude, &path_string(path), &file_stem(path));
        }

        record.project = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| decode_project_dir(&name.to_string_lossy()));
        record.cost_usd = if state.embedded_cost == 0.0 && record.total_tokens() > 0 {
            cost_for(record.input_tokens, record.output_tokens, record.model.as_deref())
        } else {
            state.embedded_cost
        };
        state.timeline.apply(&mut record);
        record
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_session(dir: &Path, project: &str, name: &str, body: &str) -> std::path::PathBuf {
        let project_dir = dir.join(project);
        fs::create_dir_all(&project_dir).expect("create project dir");
        let path = project_dir.join(name);
        fs::write(&path, body.trim_start()).expect("write session");
        path
    }

    #[test]
    fn decodes_project_directory_names() {
        assert_eq!(decode_project_dir("-Users-alice-code-app"), "code/app");
        assert_eq!(decode_project_dir("-tmp"), "tmp");
        assert_eq!(decode_project_dir("---"), "---");
        assert_eq!(decode_project_dir("plain-name"), "plain-name");
    }

    #[test]
    fn sums_additive_usage_and_counts_roles() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_session(
            dir.path(),
            "-Users-alice-code-app",
            "abc-123.jsonl",
            r#"
{"type":"summary","summary":"Refactor"}
{"type":"user","timestamp":"2025-01-01T10:00:00Z","message":{"role":"user","content":"hi"}}
{"type":"assistant","timestamp":"2025-01-01T10:00:02Z","message":{"role":"assistant","model":"claude-sonnet-4-20250514","content":[{"type":"text"},{"type":"tool_use"}],"usage":{"input_tokens":10,"output_tokens":5,"cache_read_input_tokens":3}}}
not json at all
{"type":"assistant","timestamp":"2025-01-01T10:00:04Z","message":{"role":"assistant","model":"<synthetic>","usage":{"input_tokens":20,"output_tokens":8}}}
{"type":"tool_result","timestamp":"2025-01-01T10:00:05Z","usage":{"input_tokens":5,"output_tokens":2,"cache_creation_input_tokens":4}}
"#,
        );

        let record = ClaudeParser.parse(&path);
        assert_eq!(record.session_id, "abc-123");
        assert_eq!(record.project.as_deref(), Some("code/app"));
        assert_eq!(record.messages, 4);
        assert_eq!(record.user_messages, 1);
        assert_eq!(record.assistant_messages, 2);
        assert_eq!(record.tool_uses, 1);
        assert_eq!(record.input_tokens, 35);
        assert_eq!(record.output_tokens, 15);
        assert_eq!(record.cache_read_tokens, Some(3));
        assert_eq!(record.cache_creation_tokens, Some(4));
        assert_eq!(record.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(record.first_message.as_deref(), Some("2025-01-01T10:00:00.000Z"));
        assert_eq!(record.last_message.as_deref(), Some("2025-01-01T10:00:05.000Z"));
        assert_eq!(record.duration_ms, 5_000);
        let expected = cost_for(35, 15, Some("claude-sonnet-4-20250514"));
        assert!((record.cost_usd - expected).abs() < 1e-12);
    }

    #[test]
    fn embedded_cost_wins_over_lookup() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_session(
            dir.path(),
            "-work-repo",
            "s.jsonl",
            r#"
{"type":"assistant","costUSD":0.25,"message":{"role":"assistant","usage":{"input_tokens":1000,"output_tokens":10}}}
{"type":"assistant","cost_usd":"0.5","message":{"role":"assistant","usage":{"input_tokens":1,"output_tokens":1}}}
"#,
        );
        let record = ClaudeParser.parse(&path);
        assert!((record.cost_usd - 0.75).abs() < 1e-12);
        assert_eq!(record.project.as_deref(), Some("work/repo"));
        assert_eq!(record.cache_read_tokens, Some(0));
    }

    #[test]
    fn zero_embedded_cost_falls_back_to_lookup() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_session(
            dir.path(),
            "-work-repo",
            "z.jsonl",
            r#"
{"type":"assistant","costUSD":0,"message":{"role":"assistant","model":"claude-opus-4","usage":{"input_tokens":2000,"output_tokens":400}}}
{"type":"assistant","costUSD":0.0,"message":{"role":"assistant","model":"claude-opus-4","usage":{"input_tokens":1000,"output_tokens":100}}}
"#,
        );
        let record = ClaudeParser.parse(&path);
        let expected = cost_for(3000, 500, Some("claude-opus-4"));
        assert!(expected > 0.0);
        assert!((record.cost_usd - expected).abs() < 1e-12);
    }

    #[test]
    fn counts_standalone_tool_use_lines() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_session(
            dir.path(),
            "proj",
            "t.jsonl",
            r#"
{"type":"tool_use","message":{"content":[{"type":"tool_use"}]}}
{"type":"user","message":{"content":"no role field"}}
"#,
        );
        let record = ClaudeParser.parse(&path);
        assert_eq!(record.messages, 2);
        assert_eq!(record.tool_uses, 1);
        assert_eq!(record.user_messages, 1);
        assert_eq!(record.project.as_deref(), Some("proj"));
        assert_eq!(record.cache_read_tokens, None);
        assert_eq!(record.cost_usd, 0.0);
        assert_eq!(record.last_message, None);
    }

    #[test]
    fn unreadable_file_yields_empty_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let record = ClaudeParser.parse(&dir.path().join("missing.jsonl"));
        assert_eq!(record.messages, 0);
        assert_eq!(record.session_id, "missing");
    }
}
