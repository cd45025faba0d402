//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use crate::cache::transcode::Transcoder;
use crate::config::{Layout, Settings};
use crate::error::{Error, Result};
use crate::probe::{AudioInspector, TechReport};
use crate::shim::{CreationTime, set_file_times};
use crate::store::{MetadataStore, TechInfo};

/// A temporary directory with the usual `wav/ json/ m4a/ dist/ static/` tree.
pub struct Sandbox {
    pub dir: TempDir,
    pub layout: Layout,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.publish_dir = dir.path().join("dist");
        settings.paths.static_dir = dir.path().join("static");
        let layout = settings.layout(Some(&dir.path().join("wav"))).unwrap();
        fs::create_dir_all(&layout.source_dir).unwrap();
        Self { dir, layout }
    }

    pub fn store(&self) -> MetadataStore<'_> {
        MetadataStore::new(&self.layout)
    }

    pub fn write_source(&self, rel: &str, body: &[u8]) -> PathBuf {
        write(&self.layout.source_dir.join(rel), body)
    }

    pub fn write_cache(&self, source_rel: &str, body: &[u8]) -> PathBuf {
        write(&self.layout.cache_path(source_rel), body)
    }
}

fn write(path: &Path, body: &[u8]) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
    path.to_path_buf()
}

/// Set the modification time of `path` to `secs` after the epoch.
pub fn touch_at(path: &Path, secs: u64) {
    set_file_times(path, SystemTime::UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
}

pub fn stereo_48k() -> TechReport {
    TechReport {
        duration_seconds: 61.5,
        tech: TechInfo {
            sample_rate: 48000,
            bit_depth: 24,
            channels: 2,
        },
    }
}

/// Inspector returning a canned report, or failing when none is set.
pub struct FakeInspector {
    pub report: Option<TechReport>,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl FakeInspector {
    pub fn ok(report: TechReport) -> Self {
        Self {
            report: Some(report),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            report: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl AudioInspector for FakeInspector {
    fn inspect(&self, path: &Path) -> Result<TechReport> {
        self.calls.borrow_mut().push(path.to_path_buf());
        self.report.ok_or_else(|| Error::Probe {
            path: path.to_path_buf(),
            reason: "no audio stream found".into(),
        })
    }
}

/// Transcoder that writes a marker file, failing for inputs whose file name
/// contains any of `fail_on`.
#[derive(Default)]
pub struct FakeTranscoder {
    pub fail_on: Vec<String>,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl FakeTranscoder {
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transcoder for FakeTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        self.calls.borrow_mut().push(input.to_path_buf());
        let name = input.file_name().unwrap().to_string_lossy().into_owned();
        if self.fail_on.iter().any(|f| name.contains(f.as_str())) {
            return Err(Error::Probe {
                path: input.to_path_buf(),
                reason: "encoder exploded".into(),
            });
        }
        write(output, format!("aac:{name}").as_bytes());
        Ok(())
    }
}

/// Creation-time source that always answers the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl CreationTime for FixedClock {
    fn best_creation_time(&self, _meta: &fs::Metadata) -> DateTime<Utc> {
        self.0
    }
}
