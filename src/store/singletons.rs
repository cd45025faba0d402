use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, IoContext, Result};

/// Site-wide settings stored in `settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public base URL of the published site, without a trailing slash.
    pub domain: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: "https://your-domain.com".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn base_url(&self) -> &str {
        self.domain.trim_end_matches('/')
    }
}

/// Text of the about page, stored in `about.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutContent {
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Email")]
    pub email: String,
}

impl Default for AboutContent {
    fn default() -> Self {
        Self {
            content: "Write a few words about yourself and these recordings here...".to_string(),
            email: "your-email@example.com".to_string(),
        }
    }
}

/// Read a JSON document, using `T::default()` when it does not exist.
pub(super) fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} not found, using defaults", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(e).io_context("read", path),
    };
    serde_json::from_slice(&raw).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn encode_json<T: Serialize>(path: &Path, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).io_context("create directory", parent)?;
    }
    let body = encode_json(path, value)?;
    fs::write(path, body).io_context("write", path)
}
