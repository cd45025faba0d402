use std::fs::{self, File, FileTimes};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

use crate::error::{IoContext, Result};

/// "When was this file made?" as well as the platform can answer it.
pub trait CreationTime {
    fn best_creation_time(&self, meta: &fs::Metadata) -> DateTime<Utc>;
}

/// Birth time where the platform records one, modification time elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformClock;

#[cfg(any(target_os = "macos", windows))]
impl CreationTime for PlatformClock {
    fn best_creation_time(&self, meta: &fs::Metadata) -> DateTime<Utc> {
        let t = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(UNIX_EPOCH);
        to_datetime(t)
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
impl CreationTime for PlatformClock {
    fn best_creation_time(&self, meta: &fs::Metadata) -> DateTime<Utc> {
        to_datetime(meta.modified().unwrap_or(UNIX_EPOCH))
    }
}

pub fn to_datetime(t: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}

/// Stamp `path` with `t` as its modification time, and as its creation time
/// on platforms that allow setting one.
pub fn set_file_times(path: &Path, t: SystemTime) -> Result<()> {
    let file = File::options()
        .write(true)
        .open(path)
        .io_context("open for time update", path)?;

    let times = FileTimes::new().set_modified(t).set_accessed(t);
    #[cfg(target_os = "macos")]
    let times = {
        use std::os::macos::fs::FileTimesExt;
        times.set_created(t)
    };
    #[cfg(windows)]
    let times = {
        use std::os::windows::fs::FileTimesExt;
        times.set_created(t)
    };

    file.set_times(times).io_context("set times on", path)
}
