pub mod aggregate;
pub mod pricing;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use aggregate::{ProviderSessions, RECENT_LIMIT, RECENT_PER_PROVIDER, compute_usage};
pub use pricing::{ModelPrice, PriceResolution, PriceSource, cost_for, price_for, price_resolution};

/// AI-assistant CLI tools whose local session logs are ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    Codex,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Claude, Provider::Codex, Provider::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }

    /// File extensions (without the dot) that hold session logs for this provider.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Claude => &["jsonl"],
            Self::Codex => &["jsonl", "json"],
            Self::Gemini => &["jsonl"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: {}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "codex" => Ok(Self::Codex),
            "gemini" => Ok(Self::Gemini),
            _ => Err(UnknownProvider(value.to_string())),
        }
    }
}

/// Tracking metadata for a log file that has been ingested at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub path: String,
    pub provider: Provider,
    pub mtime: i64,
    pub size: u64,
    pub last_parsed_at: i64,
}

impl FileRecord {
    /// Same mtime and size as when last parsed. Content is not compared.
    pub fn is_current(&self, mtime: i64, size: u64) -> bool {
        self.mtime == mtime && self.size == size
    }
}

/// One parsed session, derived from a single log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub path: String,
    pub provider: Provider,
    pub session_id: String,
    pub project: Option<String>,
    pub messages: u64,
    pub user_messages: u64,
    pub assistant_messages: u64,
    pub tool_uses: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: Option<u64>,
    pub cache_creation_tokens: Option<u64>,
    pub cost_usd: f64,
    pub model: Option<String>,
    pub first_message: Option<String>,
    pub last_message: Option<String>,
    pub duration_ms: u64,
}

impl SessionRecord {
    pub fn empty(provider: Provider, path: &str, session_id: &str) -> Self {
        Self {
            path: path.to_string(),
            provider,
            session_id: session_id.to_string(),
            project: None,
            messages: 0,
            user_messages: 0,
            assistant_messages: 0,
            tool_uses: 0,
            input_tokens: 0,
            output_tokens: 0,
            cache_read_tokens: None,
            cache_creation_tokens: None,
            cost_usd: 0.0,
            model: None,
            first_message: None,
            last_message: None,
            duration_ms: 0,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    pub session_count: u64,
    pub file_count: u64,
    pub storage_bytes: u64,
}

/// Summed counters over a set of sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    pub sessions: u64,
    pub messages: u64,
    pub user_messages: u64,
    pub assistant_messages: u64,
    pub tool_uses: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
}

impl UsageTotals {
    pub fn add_session(&mut self, session: &SessionRecord) {
        self.sessions += 1;
        self.messages = self.messages.saturating_add(session.messages);
        self.user_messages = self.user_messages.saturating_add(session.user_messages);
        self.assistant_messages = self
            .assistant_messages
            .saturating_add(session.assistant_messages);
        self.tool_uses = self.tool_uses.saturating_add(session.tool_uses);
        self.input_tokens = self.input_tokens.saturating_add(session.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(session.output_tokens);
        self.cache_read_tokens = self
            .cache_read_tokens
            .saturating_add(session.cache_read_tokens.unwrap_or(0));
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(session.cache_creation_tokens.unwrap_or(0));
        self.total_tokens = self.input_tokens.saturating_add(self.output_tokens);
        self.cost_usd += session.cost_usd;
    }

    pub fn merge(&mut self, other: &UsageTotals) {
        self.sessions += other.sessions;
        self.messages = self.messages.saturating_add(other.messages);
        self.user_messages = self.user_messages.saturating_add(other.user_messages);
        self.assistant_messages = self
            .assistant_messages
            .saturating_add(other.assistant_messages);
        self.tool_uses = self.tool_uses.saturating_add(other.tool_uses);
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.cache_read_tokens = self.cache_read_tokens.saturating_add(other.cache_read_tokens);
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(other.cache_creation_tokens);
        self.total_tokens = self.input_tokens.saturating_add(self.output_tokens);
        self.cost_usd += other.cost_usd;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUsage {
    pub available: bool,
    #[serde(flatten)]
    pub totals: UsageTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    pub model: String,
    pub sessions: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub date: String,
    pub sessions: u64,
    pub messages: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUsage {
    pub project: String,
    pub providers: Vec<Provider>,
    pub sessions: u64,
    pub messages: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
    pub last_activity: Option<String>,
}

/// Read-time projection over every stored session. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub providers: std::collections::BTreeMap<Provider, ProviderUsage>,
    pub totals: UsageTotals,
    pub by_model: Vec<ModelUsage>,
    pub by_date: Vec<DailyUsage>,
    pub by_project: Vec<ProjectUsage>,
    pub recent_sessions: Vec<SessionRecord>,
    pub generated_at: String,
}

/// Last two segments of a filesystem path joined by `/`, or the single last one.
pub fn project_label_from_path(path: &str) -> Option<String> {
    let segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect();
    match segments.as_slice() {
        [] => None,
        [only] => Some((*only).to_string()),
        [.., parent, last] => Some(format!("{}/{}", parent, last)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>(), Ok(provider));
        }
        assert_eq!(" Codex ".parse::<Provider>(), Ok(Provider::Codex));
        assert!("cursor".parse::<Provider>().is_err());
    }

    #[test]
    fn provider_serializes_lowercase() {
        let json = serde_json::to_string(&Provider::Gemini).expect("serialize");
        assert_eq!(json, "\"gemini\"");
    }

    #[test]
    fn project_label_uses_last_two_segments() {
        assert_eq!(
            project_label_from_path("/Users/alice/code/app").as_deref(),
            Some("code/app")
        );
        assert_eq!(project_label_from_path("/app").as_deref(), Some("app"));
        assert_eq!(
            project_label_from_path("C:\\work\\repo").as_deref(),
            Some("work/repo")
        );
        assert_eq!(project_label_from_path("/"), None);
    }

    #[test]
    fn totals_track_input_plus_output() {
        let mut session = SessionRecord::empty(Provider::Claude, "/tmp/a.jsonl", "a");
        session.input_tokens = 10;
        session.output_tokens = 5;
        session.cache_read_tokens = Some(3);
        session.messages = 2;
        let mut totals = UsageTotals::default();
        totals.add_session(&session);
        totals.add_session(&session);
        assert_eq!(totals.sessions, 2);
        assert_eq!(totals.total_tokens, 30);
        assert_eq!(totals.cache_read_tokens, 6);
        assert_eq!(totals.cache_creation_tokens, 0);
    }
}
