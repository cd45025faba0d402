use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::Layout;
use crate::error::{IoContext, Result};

/// Remove everything in the publish directory except `assets/`, creating
/// `assets/audio` if needed.
pub fn clear_except_assets(layout: &Layout) -> Result<()> {
    let audio = layout.assets_audio_dir();
    fs::create_dir_all(&audio).io_context("create directory", &audio)?;

    let root = &layout.publish_dir;
    for entry in fs::read_dir(root).io_context("read directory", root)? {
        let entry = entry.io_context("read directory", root)?;
        if entry.file_name() == "assets" {
            continue;
        }
        let path = entry.path();
        debug!("removing {}", path.display());
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let removed = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.io_context("remove", &path)?;
    }
    Ok(())
}

/// Copy the static directory into the publish directory verbatim.
/// Failures are logged. Returns the number of files copied.
pub fn copy_static(static_dir: &Path, publish_dir: &Path) -> usize {
    if !static_dir.is_dir() {
        debug!("no static directory at {}", static_dir.display());
        return 0;
    }

    let mut copied = 0;
    for entry in WalkDir::new(static_dir).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("error walking static assets: {e}");
                continue;
            }
        };
        let rel = entry.path().strip_prefix(static_dir).unwrap_or(entry.path());
        let dest = publish_dir.join(rel);
        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
        } else {
            copy_file(entry.path(), &dest).map(|_| copied += 1)
        };
        if let Err(e) = result {
            warn!("could not copy static asset {}: {e}", entry.path().display());
        }
    }
    copied
}

fn copy_file(src: &Path, dest: &Path) -> std::io::Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)
}

/// Whether `dest` already holds an up-to-date copy of `src`: same size
/// and not older.
fn is_current_copy(src: &fs::Metadata, dest: &Path) -> bool {
    let Ok(dest) = fs::metadata(dest) else {
        return false;
    };
    match (src.modified(), dest.modified()) {
        (Ok(s), Ok(d)) => dest.len() == src.len() && d >= s,
        _ => false,
    }
}

/// Copy a cache artifact into the publish tree. Returns the size of the
/// published file in bytes.
pub fn stage(cache: &Path, dest: &Path) -> Result<u64> {
    let meta = fs::metadata(cache).io_context("stat", cache)?;
    if is_current_copy(&meta, dest) {
        debug!("{} already published", dest.display());
        return Ok(meta.len());
    }
    copy_file(cache, dest).io_context("copy", dest)
}

/// Delete files under `assets_dir` that are not in `keep`, then any
/// directories left empty. Failures are logged. Returns the number of
/// files removed.
pub fn prune_assets(assets_dir: &Path, keep: &HashSet<PathBuf>) -> usize {
    let mut removed = 0;
    for entry in WalkDir::new(assets_dir).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("error walking {}: {e}", assets_dir.display());
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_dir() {
            // only succeeds when empty
            if fs::remove_dir(path).is_ok() {
                debug!("removed empty directory {}", path.display());
            }
            continue;
        }
        if keep.contains(path) {
            continue;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                debug!("pruned stale asset {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("could not prune {}: {e}", path.display()),
        }
    }
    removed
}
