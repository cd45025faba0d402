use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, warn};

use crate::config::Layout;
use crate::error::{IoContext, Result};
use crate::shim::set_file_times;

use super::transcode::Transcoder;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheState {
    Missing,
    /// Present but older than the source.
    Stale,
    Fresh,
}

impl CacheState {
    pub fn needs_encode(self) -> bool {
        self != CacheState::Fresh
    }
}

/// A cache artifact is fresh when it is not older than its source.
pub fn freshness(source_modified: SystemTime, cache_modified: Option<SystemTime>) -> CacheState {
    match cache_modified {
        None => CacheState::Missing,
        Some(c) if c < source_modified => CacheState::Stale,
        Some(_) => CacheState::Fresh,
    }
}

/// Whether a cache artifact exists for the document at `document_rel`
/// (relative to the metadata directory), regardless of its freshness.
pub fn artifact_exists(layout: &Layout, document_rel: &Path) -> bool {
    layout.cache_path_for_document(document_rel).is_file()
}

pub struct CacheManager<'a> {
    layout: &'a Layout,
    transcoder: &'a dyn Transcoder,
    sync_times: bool,
}

impl<'a> CacheManager<'a> {
    pub fn new(layout: &'a Layout, transcoder: &'a dyn Transcoder, sync_times: bool) -> Self {
        Self {
            layout,
            transcoder,
            sync_times,
        }
    }

    pub fn cache_path(&self, source: &str) -> PathBuf {
        self.layout.cache_path(source)
    }

    /// Whether any cache artifact exists for `source`, fresh or not.
    pub fn exists(&self, source: &str) -> bool {
        self.cache_path(source).is_file()
    }

    pub fn state(&self, source: &str) -> Result<CacheState> {
        let src = self.layout.source_path(source);
        let source_modified = fs::metadata(&src)
            .and_then(|m| m.modified())
            .io_context("stat", &src)?;
        let cache_modified = fs::metadata(self.cache_path(source))
            .and_then(|m| m.modified())
            .ok();
        Ok(freshness(source_modified, cache_modified))
    }

    /// Make sure a fresh cache artifact exists for `source`, encoding it if
    /// needed, and return its path.
    pub fn ensure(&self, source: &str) -> Result<PathBuf> {
        let cache = self.cache_path(source);
        let state = self.state(source)?;
        if !state.needs_encode() {
            debug!("cache for {source} is up to date");
            return Ok(cache);
        }

        let src = self.layout.source_path(source);
        debug!("cache for {source} is {state:?}, encoding");
        self.transcoder.transcode(&src, &cache)?;

        if self.sync_times {
            match fs::metadata(&src).and_then(|m| m.modified()) {
                Ok(t) => {
                    if let Err(e) = set_file_times(&cache, t) {
                        warn!("could not copy source time onto {}: {e}", cache.display());
                    }
                }
                Err(e) => warn!("could not read time of {}: {e}", src.display()),
            }
        }
        Ok(cache)
    }
}
