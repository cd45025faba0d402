use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::config::{Layout, to_slash};
use crate::error::{Error, Result};
use crate::shim::CreationTime;

/// One source recording as seen by the forward pass.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Absolute (or source-dir-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the source directory, `/`-separated.
    pub rel: String,
    pub file_name: String,
    pub size: u64,
    /// Best-known creation time.
    pub created: DateTime<Utc>,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn walk_error(root: &Path, e: walkdir::Error) -> Error {
    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    Error::Io {
        op: "walk",
        path,
        source: e.into(),
    }
}

/// Lazily enumerate source recordings under `layout.source_dir`, in file
/// name order. Re-invoke to restart the walk.
pub fn source_entries<'a>(
    layout: &'a Layout,
    clock: &'a dyn CreationTime,
) -> impl Iterator<Item = Result<SourceEntry>> + 'a {
    let root = layout.source_dir.as_path();
    let include_hidden = layout.include_hidden;

    WalkDir::new(root)
        .follow_links(layout.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => return Some(Err(walk_error(root, e))),
            };
            if !entry.file_type().is_file() || !layout.is_source_file(entry.path()) {
                return None;
            }
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => return Some(Err(walk_error(root, e))),
            };
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            Some(Ok(SourceEntry {
                path: entry.path().to_path_buf(),
                rel: to_slash(rel),
                file_name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                created: clock.best_creation_time(&meta),
            }))
        })
}
