use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

const DATA_DIR_NAME: &str = "agent-usage";
const FALLBACK_DIR_NAME: &str = ".agent-usage";

/// Per-user data directory: the explicit override, the platform data dir, or `~/.agent-usage`.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(base) = dirs::data_dir() {
        return Ok(base.join(DATA_DIR_NAME));
    }
    dirs::home_dir()
        .map(|home| home.join(FALLBACK_DIR_NAME))
        .ok_or_else(|| anyhow!("cannot resolve a data directory; pass --data-dir"))
}
