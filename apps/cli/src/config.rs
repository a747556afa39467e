use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use app_api::expand_home_path;
use serde::{Deserialize, Serialize};
use tracker_app::{AppConfig, DEFAULT_DEBOUNCE, ProviderRoots};
use tracker_core::Provider;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Optional per-provider log roots. `~` is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
}

impl RootsConfig {
    fn get(&self, provider: Provider) -> Option<&str> {
        let raw = match provider {
            Provider::Claude => self.claude.as_deref(),
            Provider::Codex => self.codex.as_deref(),
            Provider::Gemini => self.gemini.as_deref(),
        };
        raw.map(str::trim).filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub debounce_secs: u64,
    pub roots: RootsConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            debounce_secs: DEFAULT_DEBOUNCE.as_secs(),
            roots: RootsConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn to_app_config(&self, db_path: PathBuf) -> AppConfig {
        let mut provider_roots = ProviderRoots::from_env();
        for provider in Provider::ALL {
            if let Some(raw) = self.roots.get(provider) {
                provider_roots.set(provider, expand_home_path(raw));
            }
        }
        AppConfig {
            db_path,
            provider_roots,
            debounce: Duration::from_secs(self.debounce_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub file: PathBuf,
    pub created: bool,
}

/// Reads the config file, writing one with defaults if it does not exist yet.
pub fn load_or_create(file: &Path) -> Result<ConfigLoad> {
    if file.exists() {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("read config {}", file.display()))?;
        let config: CliConfig = toml::from_str(&contents)
            .with_context(|| format!("parse config {}", file.display()))?;
        return Ok(ConfigLoad {
            config,
            file: file.to_path_buf(),
            created: false,
        });
    }

    if let Some(dir) = file.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("create config dir {}", dir.display()))?;
    }
    let config = CliConfig::default();
    let contents = toml::to_string_pretty(&config).context("serialize config")?;
    fs::write(file, contents).with_context(|| format!("write config {}", file.display()))?;

    Ok(ConfigLoad {
        config,
        file: file.to_path_buf(),
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_default_config_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let first = load_or_create(&file).expect("create");
        assert!(first.created);
        assert_eq!(first.config, CliConfig::default());
        assert!(file.is_file());

        let second = load_or_create(&file).expect("load");
        assert!(!second.created);
        assert_eq!(second.config.debounce_secs, 5);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&file, "[roots]\ncodex = \"/srv/codex/sessions\"\n").expect("write");

        let loaded = load_or_create(&file).expect("load");
        assert_eq!(loaded.config.debounce_secs, 5);
        let app = loaded.config.to_app_config(dir.path().join("db.sqlite"));
        assert_eq!(
            app.provider_roots.get(Provider::Codex),
            Path::new("/srv/codex/sessions")
        );
        assert_eq!(app.debounce, Duration::from_secs(5));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&file, "debounce_secs = \"soon\"").expect("write");
        assert!(load_or_create(&file).is_err());
    }
}
