//! Initial scan of the storage tree.
//!
//! [`scan`] is a lazy walk yielding one result per candidate file; skips come
//! back as values so the walk itself never logs or aborts.
//! [`collect_chronological`] is the caller that logs skips and sorts.

use crate::model::{is_message_name, MessageFile, ScanSkip};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walk `root` recursively, yielding every message file with its mtime.
///
/// Only regular files whose base name starts with `$` are yielded. Directories,
/// symlinks and non-message files are dropped silently. Entries the walker
/// cannot read, and message files that cannot be stat'ed, are yielded as
/// [`ScanSkip`].
pub fn scan(root: &Path) -> impl Iterator<Item = Result<MessageFile, ScanSkip>> {
    let walk_root = root.to_path_buf();

    WalkDir::new(root)
        .into_iter()
        .filter_map(move |entry| match entry {
            Err(err) => Some(Err(ScanSkip::Walk {
                path: err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| walk_root.clone()),
                reason: err.to_string(),
            })),
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    return None;
                }
                // Non-UTF-8 names cannot start with the sigil we compare against.
                let name = entry.file_name().to_str()?;
                if !is_message_name(name) {
                    return None;
                }

                let modified = entry
                    .metadata()
                    .map_err(|e| e.to_string())
                    .and_then(|meta| meta.modified().map_err(|e| e.to_string()));

                Some(match modified {
                    Ok(modified) => Ok(MessageFile::new(entry.into_path(), modified)),
                    Err(reason) => Err(ScanSkip::Metadata {
                        path: entry.into_path(),
                        reason,
                    }),
                })
            }
        })
}

/// Scan `root` and return its message files oldest first.
///
/// Skips are logged and dropped. The sort is stable, so files sharing an
/// mtime keep their discovery order.
pub fn collect_chronological(root: &Path) -> Vec<MessageFile> {
    let mut files: Vec<MessageFile> = scan(root)
        .filter_map(|result| match result {
            Ok(file) => Some(file),
            Err(skip) => {
                warn!(path = %skip.path().display(), error = %skip, "Skipping entry during scan");
                None
            }
        })
        .collect();

    files.sort_by_key(|file| file.modified);
    debug!(root = %root.display(), count = files.len(), "Initial scan complete");
    files
}
