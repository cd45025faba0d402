use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::cache::artifact_exists;
use crate::config::{Layout, to_slash};
use crate::error::{IoContext, Result};
use crate::probe::AudioInspector;
use crate::shim::CreationTime;
use crate::store::{AudioRecord, DocumentEntry, MetadataStore, bytes_to_mb};

use super::timestamp::resolve_recorded_at;
use super::walk::{SourceEntry, source_entries};

/// Counters from one reconciliation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub sources: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub probe_failures: usize,
    pub collisions: usize,
    pub orphans_removed: usize,
    pub backfilled: usize,
}

/// What the forward pass saw, consulted by the sweep.
#[derive(Default)]
struct Seen {
    sources: HashSet<String>,
    /// Document path (relative) -> source that claimed it.
    documents: HashMap<PathBuf, String>,
}

pub struct Reconciler<'a> {
    layout: &'a Layout,
    store: MetadataStore<'a>,
    inspector: &'a dyn AudioInspector,
}

impl<'a> Reconciler<'a> {
    pub fn new(layout: &'a Layout, inspector: &'a dyn AudioInspector) -> Self {
        Self {
            layout,
            store: MetadataStore::new(layout),
            inspector,
        }
    }

    /// Walk the source directory and reconcile every document.
    pub fn run(&self, clock: &dyn CreationTime) -> Result<ScanReport> {
        self.run_with(source_entries(self.layout, clock))
    }

    /// Reconcile against an explicit sequence of source entries.
    ///
    /// Failing to create a directory or write a document aborts the run.
    /// Inspection failures and orphan deletion failures are logged.
    pub fn run_with<I>(&self, entries: I) -> Result<ScanReport>
    where
        I: IntoIterator<Item = Result<SourceEntry>>,
    {
        let meta_dir = &self.layout.metadata_dir;
        fs::create_dir_all(meta_dir).io_context("create directory", meta_dir)?;

        let mut report = ScanReport::default();
        let mut seen = Seen::default();

        for entry in entries {
            let entry = entry?;
            self.forward(&entry, &mut seen, &mut report)?;
        }

        self.sweep(&seen, &mut report)?;

        info!(
            "scan finished: {} sources, {} new, {} updated, {} orphans removed",
            report.sources, report.created, report.updated, report.orphans_removed
        );
        Ok(report)
    }

    fn forward(&self, entry: &SourceEntry, seen: &mut Seen, report: &mut ScanReport) -> Result<()> {
        let doc_rel = self.layout.document_rel(&entry.rel);
        if let Some(owner) = seen.documents.get(&doc_rel) {
            warn!("{} maps to the same document as {owner}, skipping", entry.rel);
            report.collisions += 1;
            seen.sources.insert(entry.rel.clone());
            return Ok(());
        }
        seen.sources.insert(entry.rel.clone());
        seen.documents.insert(doc_rel, entry.rel.clone());
        report.sources += 1;

        let doc_path = self.layout.document_path(&entry.rel);
        if let Some(parent) = doc_path.parent() {
            fs::create_dir_all(parent).io_context("create directory", parent)?;
        }

        let recorded_at = resolve_recorded_at(&entry.file_name, entry.created);
        let previous = self.store.read_raw(&doc_path)?;

        let parsed = previous
            .as_deref()
            .map(|raw| serde_json::from_slice::<AudioRecord>(raw));
        let existing = match parsed {
            Some(Ok(r)) => Some(r),
            Some(Err(e)) => {
                warn!("{} is unreadable ({e}), recreating it", doc_path.display());
                None
            }
            None => None,
        };

        let is_new = existing.is_none();
        let mut record = match existing {
            Some(mut r) => {
                r.recorded_at = recorded_at;
                r.source_size_mb = bytes_to_mb(entry.size);
                r
            }
            None => AudioRecord::new(&entry.rel, recorded_at, entry.size),
        };

        if is_new || !record.has_tech_info() {
            match self.inspector.inspect(&entry.path) {
                Ok(tech) => tech.apply_to(&mut record),
                Err(e) => {
                    warn!("could not inspect {}: {e}", entry.rel);
                    report.probe_failures += 1;
                }
            }
        }

        record.source_path = entry.rel.clone();
        record.compressed_path = self.layout.compressed_path(&entry.rel);
        record.normalize_text();

        let written = self
            .store
            .save_if_changed(&doc_path, &record, previous.as_deref())?;
        match (is_new, written) {
            (true, _) => {
                debug!("created {}", doc_path.display());
                report.created += 1;
            }
            (false, true) => report.updated += 1,
            (false, false) => report.unchanged += 1,
        }
        Ok(())
    }

    fn has_source(&self, doc: &DocumentEntry, seen: &Seen) -> bool {
        seen.documents.contains_key(&doc.rel)
            || self
                .layout
                .source_candidates(&doc.rel)
                .iter()
                .any(|c| seen.sources.contains(c))
    }

    fn sweep(&self, seen: &Seen, report: &mut ScanReport) -> Result<()> {
        for doc in self.store.documents() {
            let doc = doc?;
            if self.has_source(&doc, seen) {
                continue;
            }
            if artifact_exists(self.layout, &doc.rel) {
                if self.backfill_from_cache(&doc) {
                    report.backfilled += 1;
                }
                continue;
            }

            info!("orphan document {}, deleting", doc.path.display());
            match self.store.remove_if_exists(&doc.path) {
                Ok(_) => report.orphans_removed += 1,
                Err(e) => warn!("could not delete orphan {}: {e}", doc.path.display()),
            }
        }
        Ok(())
    }

    /// Fill in technical info of a cache-only document from its cache artifact.
    fn backfill_from_cache(&self, doc: &DocumentEntry) -> bool {
        let mut record = match self.store.load(&doc.path) {
            Ok(r) => r,
            Err(e) => {
                warn!("cache-only document {} is unreadable: {e}", doc.path.display());
                return false;
            }
        };
        if record.has_tech_info() {
            return false;
        }

        let cache = self.layout.cache_path_for_document(&doc.rel);
        let tech = match self.inspector.inspect(&cache) {
            Ok(t) => t,
            Err(e) => {
                warn!("could not inspect cache {}: {e}", cache.display());
                return false;
            }
        };
        tech.apply_to(&mut record);
        if let Err(e) = self.store.save(&doc.path, &record) {
            warn!("could not update {}: {e}", doc.path.display());
            return false;
        }
        debug!("backfilled {} from {}", to_slash(&doc.rel), cache.display());
        true
    }
}
