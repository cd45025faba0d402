use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::config::{DOCUMENT_EXT, Layout, is_special_document};
use crate::error::{Error, IoContext, Result};

use super::model::AudioRecord;
use super::singletons::{AboutContent, SiteConfig, encode_json, load_or_default, write_json};

/// A per-recording document found on disk.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    pub path: PathBuf,
    /// Path relative to the metadata directory.
    pub rel: PathBuf,
}

/// Reads and writes metadata documents under `Layout::metadata_dir`.
#[derive(Debug, Clone, Copy)]
pub struct MetadataStore<'a> {
    layout: &'a Layout,
}

impl<'a> MetadataStore<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    pub fn load(&self, path: &Path) -> Result<AudioRecord> {
        let raw = fs::read(path).io_context("read", path)?;
        serde_json::from_slice(&raw).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the record whose source is `source` (relative path).
    pub fn get_by_source(&self, source: &str) -> Result<AudioRecord> {
        let path = self.layout.document_path(source);
        self.load(&path).map_err(|e| {
            if e.is_not_found() {
                Error::RecordNotFound(source.to_string())
            } else {
                e
            }
        })
    }

    /// Write `record` to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path, record: &AudioRecord) -> Result<()> {
        write_json(path, record)
    }

    /// Raw bytes of a document, or `None` when it does not exist.
    pub fn read_raw(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).io_context("read", path),
        }
    }

    /// Write `record` unless the serialised form equals `previous`.
    /// Returns whether the file was written.
    pub fn save_if_changed(
        &self,
        path: &Path,
        record: &AudioRecord,
        previous: Option<&[u8]>,
    ) -> Result<bool> {
        let body = encode_json(path, record)?;
        if previous == Some(body.as_slice()) {
            return Ok(false);
        }
        fs::write(path, body).io_context("write", path)?;
        Ok(true)
    }

    /// Write `record` to the document derived from its source path.
    pub fn save_record(&self, record: &AudioRecord) -> Result<PathBuf> {
        let path = self.layout.document_path(&record.source_path);
        self.save(&path, record)?;
        Ok(path)
    }

    /// Delete a document. A document that is already gone is not an error.
    pub fn remove_if_exists(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).io_context("delete", path),
        }
    }

    /// Lazily walk every per-recording document, in file name order.
    ///
    /// Singleton documents are skipped. A missing metadata directory yields
    /// nothing.
    pub fn documents(&self) -> impl Iterator<Item = Result<DocumentEntry>> + 'a {
        let root = self.layout.metadata_dir.clone();
        let walker = root.is_dir().then(|| {
            WalkDir::new(&root)
                .sort_by_file_name()
                .into_iter()
        });

        walker.into_iter().flatten().filter_map(move |entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    return Some(Err(Error::Io {
                        op: "walk",
                        path,
                        source: e.into(),
                    }));
                }
            };
            if !entry.file_type().is_file() {
                return None;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXT) {
                return None;
            }
            let name = entry.file_name().to_string_lossy();
            if is_special_document(&name) {
                return None;
            }
            let rel = path.strip_prefix(&root).unwrap_or(path).to_path_buf();
            Some(Ok(DocumentEntry {
                path: path.to_path_buf(),
                rel,
            }))
        })
    }

    /// Every readable record with the path of the document it came from.
    /// Unreadable documents are logged and skipped.
    pub fn load_entries(&self) -> Result<Vec<(PathBuf, AudioRecord)>> {
        let mut records = Vec::new();
        for entry in self.documents() {
            let entry = entry?;
            match self.load(&entry.path) {
                Ok(r) => records.push((entry.path, r)),
                Err(e) => warn!("skipping {}: {e}", entry.path.display()),
            }
        }
        Ok(records)
    }

    pub fn load_all(&self) -> Result<Vec<AudioRecord>> {
        Ok(self.load_entries()?.into_iter().map(|(_, r)| r).collect())
    }

    /// Records grouped by folder, folders in name order.
    pub fn grouped(&self) -> Result<BTreeMap<String, Vec<AudioRecord>>> {
        let mut groups: BTreeMap<String, Vec<AudioRecord>> = BTreeMap::new();
        for record in self.load_all()? {
            groups.entry(record.folder()).or_default().push(record);
        }
        Ok(groups)
    }

    pub fn load_settings(&self) -> Result<SiteConfig> {
        load_or_default(&self.layout.settings_document())
    }

    pub fn save_settings(&self, settings: &SiteConfig) -> Result<()> {
        write_json(&self.layout.settings_document(), settings)
    }

    pub fn load_about(&self) -> Result<AboutContent> {
        load_or_default(&self.layout.about_document())
    }

    pub fn save_about(&self, about: &AboutContent) -> Result<()> {
        write_json(&self.layout.about_document(), about)
    }
}
