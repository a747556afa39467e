use std::env;
use std::path::{Path, PathBuf};

use tracker_core::Provider;

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn env_dir(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn under_home(dot_dir: &str) -> PathBuf {
    match home_dir() {
        Some(home) => home.join(dot_dir),
        None => PathBuf::from(dot_dir),
    }
}

/// Default session-log root for a provider.
///
/// `CLAUDE_CONFIG_DIR` and `CODEX_HOME` replace the tool's dot directory;
/// `GEMINI_CLI_HOME` replaces the home directory that holds `.gemini`.
pub fn default_root(provider: Provider) -> PathBuf {
    match provider {
        Provider::Claude => env_dir("CLAUDE_CONFIG_DIR")
            .unwrap_or_else(|| under_home(".claude"))
            .join("projects"),
        Provider::Codex => env_dir("CODEX_HOME")
            .unwrap_or_else(|| under_home(".codex"))
            .join("sessions"),
        Provider::Gemini => env_dir("GEMINI_CLI_HOME")
            .map(|home| home.join(".gemini"))
            .unwrap_or_else(|| under_home(".gemini"))
            .join("tmp"),
    }
}

/// Session-log root directory of every provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRoots {
    pub claude: PathBuf,
    pub codex: PathBuf,
    pub gemini: PathBuf,
}

impl ProviderRoots {
    pub fn from_env() -> Self {
        Self {
            claude: default_root(Provider::Claude),
            codex: default_root(Provider::Codex),
            gemini: default_root(Provider::Gemini),
        }
    }

    pub fn get(&self, provider: Provider) -> &Path {
        match provider {
            Provider::Claude => &self.claude,
            Provider::Codex => &self.codex,
            Provider::Gemini => &self.gemini,
        }
    }

    pub fn set(&mut self, provider: Provider, root: PathBuf) {
        match provider {
            Provider::Claude => self.claude = root,
            Provider::Codex => self.codex = root,
            Provider::Gemini => self.gemini = root,
        }
    }
}

impl Default for ProviderRoots {
    fn default() -> Self {
        Self::from_env()
    }
}
