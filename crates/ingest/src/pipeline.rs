use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use tracker_core::{Provider, SessionRecord};
use tracker_db::{Db, SessionUpsert, SyncBatch};

use crate::discovery::{FileStamp, list_files, needs_reparse};
use crate::parsers::parser_for;
use crate::types::{Result, SyncIssue, SyncStats};

struct FileTask {
    path: PathBuf,
    stamp: FileStamp,
    is_new: bool,
}

struct ParsedFile {
    session: SessionRecord,
    stamp: FileStamp,
    is_new: bool,
    parse_duration: Duration,
}

fn parse_file(task: FileTask, provider: Provider) -> ParsedFile {
    let file_start = Instant::now();
    let session = parser_for(provider).parse(&task.path);
    ParsedFile {
        session,
        stamp: task.stamp,
        is_new: task.is_new,
        parse_duration: file_start.elapsed(),
    }
}

/// Brings the store in line with one provider's log directory.
///
/// Only files whose mtime or size moved are parsed. Every resulting upsert and
/// deletion is committed in one transaction.
pub fn sync_provider(db: &mut Db, provider: Provider, root: &Path) -> Result<SyncStats> {
    let sync_start = Instant::now();
    let mut stats = SyncStats::new(provider);
    if !root.is_dir() {
        debug!(%provider, root = %root.display(), "provider root missing");
        return Ok(stats);
    }
    stats.available = true;

    let files = list_files(root, provider.extensions());
    stats.files_scanned = files.len();
    let records = db.list_file_records(provider)?;

    let mut current = HashSet::with_capacity(files.len());
    let mut tasks = Vec::new();
    for path in files {
        let file_path = path.to_string_lossy().to_string();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %file_path, error = %err, "failed to stat session file");
                stats.issues.push(SyncIssue {
                    file_path: file_path.clone(),
                    message: err.to_string(),
                });
                current.insert(file_path);
                continue;
            }
        };
        let stamp = FileStamp::from_metadata(&metadata);
        let existing = records.get(&file_path);
        if needs_reparse(existing, stamp.mtime, stamp.size) {
            tasks.push(FileTask {
                path,
                stamp,
                is_new: existing.is_none(),
            });
        }
        current.insert(file_path);
    }

    let parsed_files = tasks
        .into_par_iter()
        .map(|task| parse_file(task, provider))
        .collect::<Vec<_>>();

    let mut batch = SyncBatch::default();
    let mut parse_total = Duration::ZERO;
    for parsed in parsed_files {
        parse_total += parsed.parse_duration;
        if parsed.session.messages == 0 {
            debug!(path = %parsed.session.path, "discarding session without messages");
            stats.skipped += 1;
            continue;
        }
        if parsed.is_new {
            stats.added += 1;
        } else {
            stats.updated += 1;
        }
        batch.upserts.push(SessionUpsert {
            session: parsed.session,
            mtime: parsed.stamp.mtime,
            size: parsed.stamp.size,
        });
    }

    batch.deletions = records
        .into_keys()
        .filter(|path| !current.contains(path))
        .collect();
    batch.deletions.sort();
    stats.deleted = batch.deletions.len();

    let db_start = Instant::now();
    db.apply_sync_batch(&batch)?;

    debug!(
        %provider,
        parse_ms = parse_total.as_millis() as u64,
        db_ms = db_start.elapsed().as_millis() as u64,
        total_ms = sync_start.elapsed().as_millis() as u64,
        "sync timing"
    );
    if stats.has_changes() {
        info!(
            %provider,
            added = stats.added,
            updated = stats.updated,
            deleted = stats.deleted,
            skipped = stats.skipped,
            "synced sessions"
        );
    }
    Ok(stats)
}
