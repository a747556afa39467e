use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::debug;
use tracker_core::FileRecord;
use walkdir::WalkDir;

/// Modification time (epoch millis) and byte size of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub mtime: i64,
    pub size: u64,
}

impl FileStamp {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0);
        Self {
            mtime,
            size: metadata.len(),
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|value| value.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted)))
}

/// Session files under `root`, newest first. Symlinks are not followed.
pub fn list_files(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(path = ?err.path(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        // A failed stat sorts as epoch 0 rather than dropping the file.
        let mtime = entry
            .metadata()
            .map(|metadata| FileStamp::from_metadata(&metadata).mtime)
            .unwrap_or(0);
        files.push((mtime, entry.into_path()));
    }
    files.sort_by(|(a_mtime, a_path), (b_mtime, b_path)| {
        b_mtime.cmp(a_mtime).then_with(|| a_path.cmp(b_path))
    });
    files.into_iter().map(|(_, path)| path).collect()
}

/// True when the file is untracked or its mtime or size moved. Content is never hashed.
pub fn needs_reparse(existing: Option<&FileRecord>, mtime: i64, size: u64) -> bool {
    existing.is_none_or(|record| !record.is_current(mtime, size))
}
