use std::path::PathBuf;

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path == "~"
        && let Some(home) = home_dir()
    {
        return home;
    }
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\"))
        && let Some(home) = home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
