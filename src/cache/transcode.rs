use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use crate::config::ToolSettings;
use crate::error::{IoContext, Result};
use crate::shim::run_tool;

pub trait Transcoder {
    /// Encode `input` into `output`, replacing it if present. On error
    /// `output` is left as it was.
    fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Encodes with `ffmpeg -i IN -y -vn -c:a CODEC -vbr Q OUT`.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
    codec: String,
    vbr_quality: String,
    timeout: Option<Duration>,
}

impl FfmpegTranscoder {
    pub fn new(tools: &ToolSettings) -> Self {
        Self {
            program: tools.ffmpeg.clone(),
            codec: tools.audio_codec.clone(),
            vbr_quality: tools.vbr_quality.clone(),
            timeout: tools.timeout_secs.map(Duration::from_secs),
        }
    }

    fn args<'a>(&'a self, input: &'a Path, output: &'a Path) -> [&'a OsStr; 9] {
        [
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-y"),
            OsStr::new("-vn"),
            OsStr::new("-c:a"),
            OsStr::new(&self.codec),
            OsStr::new("-vbr"),
            OsStr::new(&self.vbr_quality),
            output.as_os_str(),
        ]
    }
}

/// Hidden sibling that ffmpeg writes into before it is moved over `output`.
/// The extension is kept so ffmpeg still picks the container from it.
pub(crate) fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "m4a".to_string());
    output.with_file_name(format!(".{stem}.part.{ext}"))
}

fn discard(partial: &Path) {
    if let Err(e) = fs::remove_file(partial) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("could not remove {}: {e}", partial.display());
        }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).io_context("create directory", parent)?;
        }
        let partial = partial_path(output);
        if let Err(e) = run_tool(&self.program, self.args(input, &partial), self.timeout) {
            discard(&partial);
            return Err(e);
        }
        if let Err(e) = fs::rename(&partial, output).io_context("move into place", output) {
            discard(&partial);
            return Err(e);
        }
        info!("transcoded {} -> {}", input.display(), output.display());
        Ok(())
    }
}
