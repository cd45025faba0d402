use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/audiofolio/config.toml` or `~/.config/audiofolio/config.toml`
///
/// Precedence (highest wins):
/// 1) Command line (`--wav`)
/// 2) Environment variables (prefix `AUDIOFOLIO__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub library: LibrarySettings,
    pub tools: ToolSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory holding the original recordings.
    pub source_dir: Option<PathBuf>,
    /// Metadata documents. Defaults to `json/` next to `source_dir`.
    pub metadata_dir: Option<PathBuf>,
    /// Compressed audio cache. Defaults to `m4a/` next to `source_dir`.
    pub cache_dir: Option<PathBuf>,
    /// Output directory of the generated site.
    pub publish_dir: PathBuf,
    /// Files copied verbatim into the published site.
    pub static_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source_dir: None,
            metadata_dir: None,
            cache_dir: None,
            publish_dir: PathBuf::from("dist"),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as source audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["wav".into()],
            follow_links: true,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InspectorKind {
    /// Shell out to `ffprobe`.
    Ffprobe,
    /// Read stream properties in-process.
    #[serde(alias = "lofty", alias = "internal")]
    Builtin,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolSettings {
    pub inspector: InspectorKind,
    /// Program used for audio inspection.
    pub ffprobe: String,
    /// Program used for transcoding.
    pub ffmpeg: String,
    /// Codec passed to `-c:a`.
    pub audio_codec: String,
    /// Value passed to `-vbr`.
    pub vbr_quality: String,
    /// Kill an external tool after this many seconds. Unset waits forever.
    pub timeout_secs: Option<u64>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            inspector: InspectorKind::Ffprobe,
            ffprobe: "ffprobe".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            audio_codec: "aac".to_string(),
            vbr_quality: "4".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Copy the source modification time onto freshly encoded cache files.
    pub sync_cache_times: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            sync_cache_times: true,
        }
    }
}
