//! Audio inspection: duration and stream properties of a file.

mod builtin;
mod ffprobe;

use std::path::Path;

use crate::config::{InspectorKind, ToolSettings};
use crate::error::Result;
use crate::store::{AudioRecord, TechInfo};

pub use builtin::LoftyInspector;
pub use ffprobe::FfprobeInspector;

/// What an inspection yields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TechReport {
    pub duration_seconds: f64,
    pub tech: TechInfo,
}

impl TechReport {
    pub fn apply_to(&self, record: &mut AudioRecord) {
        record.duration_seconds = self.duration_seconds;
        record.tech = self.tech;
    }
}

pub trait AudioInspector {
    /// Inspect `path`. Fails when no usable audio stream is found.
    fn inspect(&self, path: &Path) -> Result<TechReport>;
}

/// Build the inspector selected in the settings.
pub fn from_settings(tools: &ToolSettings) -> Box<dyn AudioInspector> {
    match tools.inspector {
        InspectorKind::Ffprobe => Box::new(FfprobeInspector::new(tools)),
        InspectorKind::Builtin => Box::new(LoftyInspector),
    }
}
