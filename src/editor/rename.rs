use std::fs;
use std::path::{Component, Path};

use log::{info, warn};

use crate::config::to_slash;
use crate::error::{Error, IoContext, Result};
use crate::store::AudioRecord;

use super::Editor;

/// A rename target must be a relative path inside the source tree with a
/// source extension.
fn check_target(editor: &Editor<'_>, target: &str) -> Result<String> {
    let path = Path::new(target.trim());
    let inside = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if target.trim().is_empty() || !inside {
        return Err(Error::Config(format!(
            "{target:?} is not a path inside the source directory"
        )));
    }
    if !editor.layout.is_source_file(path) {
        return Err(Error::Config(format!(
            "{target:?} does not have a source extension ({})",
            editor.layout.extensions.join(", ")
        )));
    }
    Ok(to_slash(path))
}

fn rename_with_parents(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(from, to)
}

impl Editor<'_> {
    /// Move a recording from `old` to `new` (both relative source paths).
    ///
    /// The source file and the document move together or not at all. The
    /// cache artifact follows on a best-effort basis.
    pub fn rename_record(&self, old: &str, new: &str) -> Result<AudioRecord> {
        let new = check_target(self, new)?;
        let mut record = self.store.get_by_source(old)?;
        if new == old {
            return Ok(record);
        }

        let layout = self.layout;
        let same_document = layout.document_rel(old) == layout.document_rel(&new);
        let old_doc = layout.document_path(old);
        let new_doc = layout.document_path(&new);
        if !same_document && new_doc.exists() {
            return Err(Error::AlreadyExists(new_doc.display().to_string()));
        }

        let old_src = layout.source_path(old);
        let new_src = layout.source_path(&new);
        let moved_source = if old_src.is_file() {
            if new_src.exists() {
                return Err(Error::AlreadyExists(new_src.display().to_string()));
            }
            rename_with_parents(&old_src, &new_src).io_context("rename", &old_src)?;
            true
        } else {
            warn!("source {old} is missing, moving its document only");
            false
        };

        record.source_path = new.clone();
        record.compressed_path = layout.compressed_path(&new);
        let saved = self.store.save(&new_doc, &record).and_then(|()| {
            if same_document {
                Ok(false)
            } else {
                self.store.remove_if_exists(&old_doc)
            }
        });
        if let Err(e) = saved {
            if moved_source {
                if let Err(back) = fs::rename(&new_src, &old_src) {
                    warn!("could not move {} back: {back}", new_src.display());
                }
            }
            return Err(e);
        }

        let old_cache = layout.cache_path(old);
        let new_cache = layout.cache_path(&new);
        if old_cache != new_cache && old_cache.is_file() {
            if let Err(e) = rename_with_parents(&old_cache, &new_cache) {
                warn!("could not rename cache {}: {e}", old_cache.display());
            }
        }

        info!("renamed {old} to {new}");
        Ok(record)
    }
}
