use std::path::Path;

use lofty::prelude::AudioFile;

use crate::error::{Error, Result};
use crate::store::TechInfo;

use super::{AudioInspector, TechReport};

/// Reads stream properties in-process, for hosts without ffprobe.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyInspector;

impl AudioInspector for LoftyInspector {
    fn inspect(&self, path: &Path) -> Result<TechReport> {
        let tagged = lofty::read_from_path(path).map_err(|e| Error::Probe {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let props = tagged.properties();

        let sample_rate = props.sample_rate().unwrap_or(0);
        if sample_rate == 0 {
            return Err(Error::Probe {
                path: path.to_path_buf(),
                reason: "no audio stream found".to_string(),
            });
        }

        Ok(TechReport {
            duration_seconds: props.duration().as_secs_f64(),
            tech: TechInfo {
                sample_rate,
                bit_depth: props.bit_depth().map(u32::from).unwrap_or(0),
                channels: props.channels().map(u32::from).unwrap_or(0),
            },
        })
    }
}
