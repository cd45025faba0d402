use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::ToolSettings;
use crate::error::{Error, Result};
use crate::shim::run_tool;
use crate::store::TechInfo;

use super::{AudioInspector, TechReport};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeStream {
    sample_rate: Option<String>,
    channels: u32,
    bits_per_sample: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeOutput {
    streams: Vec<ProbeStream>,
    format: ProbeFormat,
}

/// Runs `ffprobe` and reads its JSON report.
#[derive(Debug, Clone)]
pub struct FfprobeInspector {
    program: String,
    timeout: Option<Duration>,
}

impl FfprobeInspector {
    pub fn new(tools: &ToolSettings) -> Self {
        Self {
            program: tools.ffprobe.clone(),
            timeout: tools.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl AudioInspector for FfprobeInspector {
    fn inspect(&self, path: &Path) -> Result<TechReport> {
        let args: [&OsStr; 7] = [
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_format"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];
        let out = run_tool(&self.program, args, self.timeout)?;
        parse_probe_output(&out.stdout).map_err(|reason| Error::Probe {
            path: path.to_path_buf(),
            reason,
        })
    }
}

/// Interpret ffprobe's `-print_format json -show_format -show_streams` output.
///
/// The first stream with a non-empty sample rate wins. Unparsable numbers
/// read as zero.
pub fn parse_probe_output(stdout: &str) -> std::result::Result<TechReport, String> {
    let parsed: ProbeOutput =
        serde_json::from_str(stdout).map_err(|e| format!("unreadable ffprobe output: {e}"))?;

    let duration_seconds = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    parsed
        .streams
        .iter()
        .find_map(|s| {
            let rate = s.sample_rate.as_deref().filter(|r| !r.is_empty())?;
            Some(TechReport {
                duration_seconds,
                tech: TechInfo {
                    sample_rate: rate.trim().parse().unwrap_or(0),
                    bit_depth: s.bits_per_sample,
                    channels: s.channels,
                },
            })
        })
        .ok_or_else(|| "no audio stream found".to_string())
}
