use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::folder_of;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Stream properties reported by the audio inspector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechInfo {
    pub sample_rate: u32,
    pub bit_depth: u32,
    pub channels: u32,
}

/// Metadata for one recording.
///
/// Field names on disk match the documents written by earlier versions of
/// the tool, so existing collections load unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioRecord {
    /// Path of the source file relative to the source directory, `/`-separated.
    #[serde(rename = "source_filename")]
    pub source_path: String,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "record_date")]
    pub recorded_at: DateTime<Utc>,
    pub duration_seconds: f64,
    #[serde(rename = "source_file_size_mb")]
    pub source_size_mb: f64,
    #[serde(rename = "compressed_file_size_mb")]
    pub compressed_size_mb: f64,
    /// Publish-relative path of the compressed audio.
    #[serde(rename = "compressed_audio_path")]
    pub compressed_path: String,
    #[serde(rename = "tech_info")]
    pub tech: TechInfo,
}

impl AudioRecord {
    /// A fresh record for a newly discovered source file.
    pub fn new(source_path: &str, recorded_at: DateTime<Utc>, size_bytes: u64) -> Self {
        Self {
            source_path: source_path.to_string(),
            title: default_title(source_path),
            recorded_at,
            source_size_mb: bytes_to_mb(size_bytes),
            ..Self::default()
        }
    }

    /// Folder this record is grouped under (`/` for the root).
    pub fn folder(&self) -> String {
        folder_of(&self.source_path)
    }

    /// File name of the source, without directories.
    pub fn file_name(&self) -> &str {
        self.source_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.source_path)
    }

    pub fn has_tech_info(&self) -> bool {
        self.tech.sample_rate != 0
    }

    /// Remove `\r` from the free-text fields.
    pub fn normalize_text(&mut self) {
        strip_cr(&mut self.title);
        strip_cr(&mut self.description);
        strip_cr(&mut self.location);
    }
}

/// File name with its extension removed.
pub fn default_title(source_path: &str) -> String {
    let name = source_path.rsplit('/').next().unwrap_or(source_path);
    match name.rfind('.') {
        Some(i) if i > 0 => name[..i].to_string(),
        _ => name.to_string(),
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

pub fn strip_cr(s: &mut String) {
    if s.contains('\r') {
        s.retain(|c| c != '\r');
    }
}
