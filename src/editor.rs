//! User edits to records and to the singleton documents.

mod rename;

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};

use crate::config::{Layout, to_slash};
use crate::error::{Error, Result};
use crate::shim::set_file_times;
use crate::store::{AboutContent, AudioRecord, MetadataStore, SiteConfig, strip_cr};

/// Format accepted for edited recording times.
pub const EDIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Changes to one record. `None` leaves a field as it is.
#[derive(Debug, Default, Clone)]
pub struct RecordEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, read as UTC.
    pub recorded_at: Option<String>,
    pub rename_to: Option<String>,
}

pub fn parse_edit_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s.trim(), EDIT_TIME_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

fn cleaned(s: &str) -> String {
    let mut s = s.to_string();
    strip_cr(&mut s);
    s
}

pub struct Editor<'a> {
    layout: &'a Layout,
    store: MetadataStore<'a>,
}

impl<'a> Editor<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            store: MetadataStore::new(layout),
        }
    }

    /// Apply `edit` to the record of `source` and return the saved record.
    /// A rename, if requested, happens first.
    ///
    /// An unparsable time is logged and ignored. A new time is also stamped
    /// onto the source, document and cache files where they exist.
    pub fn edit_record(&self, source: &str, edit: &RecordEdit) -> Result<AudioRecord> {
        let mut record = match edit.rename_to.as_deref() {
            Some(target) if target != source => self.rename_record(source, target)?,
            _ => self.store.get_by_source(source)?,
        };

        if let Some(title) = &edit.title {
            record.title = cleaned(title);
        }
        if let Some(description) = &edit.description {
            record.description = cleaned(description);
        }
        if let Some(location) = &edit.location {
            record.location = cleaned(location);
        }

        let mut new_time = None;
        if let Some(raw) = edit.recorded_at.as_deref().filter(|s| !s.trim().is_empty()) {
            match parse_edit_time(raw) {
                Some(t) => {
                    record.recorded_at = t;
                    new_time = Some(t);
                }
                None => warn!("ignoring recording time {raw:?}, expected YYYY-MM-DD HH:MM:SS"),
            }
        }

        self.store.save_record(&record)?;
        debug!("saved edits to {}", record.source_path);

        if let Some(t) = new_time {
            self.stamp_siblings(&record.source_path, t);
        }
        Ok(record)
    }

    /// Push `t` onto the timestamps of every file belonging to `source`.
    fn stamp_siblings(&self, source: &str, t: DateTime<Utc>) {
        let t = SystemTime::from(t);
        let files = [
            self.layout.source_path(source),
            self.layout.document_path(source),
            self.layout.cache_path(source),
        ];
        for path in files.iter().filter(|p| p.is_file()) {
            if let Err(e) = set_file_times(path, t) {
                warn!("{e}");
            }
        }
    }

    /// Set the location of every record in `folder` (`/` for the root).
    /// Returns how many records were updated.
    pub fn set_folder_location(&self, folder: &str, location: &str) -> Result<usize> {
        let location = cleaned(location);
        let folder = normalize_folder(folder);
        let mut updated = 0;

        for entry in self.store.documents() {
            let entry = entry?;
            let mut record = match self.store.load(&entry.path) {
                Ok(r) => r,
                Err(e) => {
                    warn!("skipping {}: {e}", entry.path.display());
                    continue;
                }
            };
            if record.folder() != folder {
                continue;
            }
            record.location = location.clone();
            match self.store.save(&entry.path, &record) {
                Ok(()) => updated += 1,
                Err(e) => warn!("could not update {}: {e}", record.source_path),
            }
        }

        info!("set location of {updated} records in {folder}");
        Ok(updated)
    }

    /// Replace the about page text. `None` keeps the stored value.
    pub fn save_about(&self, content: Option<&str>, email: Option<&str>) -> Result<AboutContent> {
        let mut about = self.store.load_about()?;
        if let Some(content) = content {
            about.content = cleaned(content);
        }
        if let Some(email) = email {
            about.email = cleaned(email).trim().to_string();
        }
        self.store.save_about(&about)?;
        Ok(about)
    }

    pub fn save_domain(&self, domain: &str) -> Result<SiteConfig> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(Error::Config("domain must not be empty".into()));
        }
        let mut settings = self.store.load_settings()?;
        settings.domain = domain.to_string();
        self.store.save_settings(&settings)?;
        Ok(settings)
    }
}

/// Folder keys as used by `AudioRecord::folder`.
fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim().trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        "/".to_string()
    } else {
        to_slash(Path::new(trimmed))
    }
}
