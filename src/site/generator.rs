use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::cache::CacheManager;
use crate::config::Layout;
use crate::error::{IoContext, Result};
use crate::store::{AudioRecord, MetadataStore, bytes_to_mb};

use super::publish::{clear_except_assets, copy_static, prune_assets, stage};
use super::render::SiteRenderer;
use super::seo::{robots, sitemap};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub published: usize,
    /// Records with neither source nor cache; their documents were removed.
    pub dropped: usize,
    /// Records skipped because encoding or staging failed.
    pub failed: usize,
    pub pruned: usize,
}

/// Listing order: most recent first, equal times by source path.
pub fn listing_order(a: &AudioRecord, b: &AudioRecord) -> Ordering {
    b.recorded_at
        .cmp(&a.recorded_at)
        .then_with(|| a.source_path.cmp(&b.source_path))
}

/// Where a record's audio comes from for this run.
enum AudioSource {
    Cache(PathBuf),
    Lost,
}

pub struct Generator<'a> {
    layout: &'a Layout,
    store: MetadataStore<'a>,
    cache: CacheManager<'a>,
    renderer: &'a dyn SiteRenderer,
}

impl<'a> Generator<'a> {
    pub fn new(layout: &'a Layout, cache: CacheManager<'a>, renderer: &'a dyn SiteRenderer) -> Self {
        Self {
            layout,
            store: MetadataStore::new(layout),
            cache,
            renderer,
        }
    }

    /// Rebuild the publish tree. `today` is stamped into the sitemap.
    pub fn generate(&self, today: NaiveDate) -> Result<GenerationReport> {
        info!("generating site in {}", self.layout.publish_dir.display());
        let settings = self.store.load_settings()?;
        let about = self.store.load_about()?;

        clear_except_assets(self.layout)?;

        let mut report = GenerationReport::default();
        let published = self.publish_records(&mut report)?;
        let keep: HashSet<PathBuf> = published
            .iter()
            .map(|r| self.layout.publish_path(&r.compressed_path))
            .collect();
        report.pruned = prune_assets(&self.layout.assets_audio_dir(), &keep);
        report.published = published.len();

        let copied = copy_static(&self.layout.static_dir, &self.layout.publish_dir);
        debug!("copied {copied} static files");

        self.write_page("index.html", &self.renderer.index(&published)?)?;
        self.write_page("about.html", &self.renderer.about(&about)?)?;

        let base = settings.base_url();
        self.write_page("sitemap.xml", &sitemap(base, today))?;
        self.write_page("robots.txt", &robots(base))?;

        info!(
            "site generated: {} published, {} dropped, {} failed",
            report.published, report.dropped, report.failed
        );
        Ok(report)
    }

    /// Resolve, stage and collect every publishable record, in listing order.
    fn publish_records(&self, report: &mut GenerationReport) -> Result<Vec<AudioRecord>> {
        let mut entries = self.store.load_entries()?;
        entries.sort_by(|(_, a), (_, b)| listing_order(a, b));

        let mut published = Vec::with_capacity(entries.len());
        for (doc_path, mut record) in entries {
            let cache = match self.resolve(&record) {
                Ok(AudioSource::Cache(path)) => path,
                Ok(AudioSource::Lost) => {
                    self.drop_record(&doc_path, &record);
                    report.dropped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("skipping {}: {e}", record.source_path);
                    report.failed += 1;
                    continue;
                }
            };

            record.compressed_path = self.layout.compressed_path(&record.source_path);
            let dest = self.layout.publish_path(&record.compressed_path);
            match stage(&cache, &dest) {
                Ok(size) => {
                    record.compressed_size_mb = bytes_to_mb(size);
                    published.push(record);
                }
                Err(e) => {
                    warn!("could not publish {}: {e}", record.source_path);
                    report.failed += 1;
                }
            }
        }
        Ok(published)
    }

    fn resolve(&self, record: &AudioRecord) -> Result<AudioSource> {
        let source = &record.source_path;
        if self.layout.source_path(source).is_file() {
            return self.cache.ensure(source).map(AudioSource::Cache);
        }
        if self.cache.exists(source) {
            debug!("{source} has no source file, publishing its cache");
            return Ok(AudioSource::Cache(self.cache.cache_path(source)));
        }
        Ok(AudioSource::Lost)
    }

    fn drop_record(&self, doc_path: &Path, record: &AudioRecord) {
        info!("{} has neither source nor cache, removing its document", record.source_path);
        if let Err(e) = self.store.remove_if_exists(doc_path) {
            warn!("could not remove {}: {e}", doc_path.display());
        }
    }

    fn write_page(&self, name: &str, body: &str) -> Result<()> {
        let path = self.layout.publish_dir.join(name);
        fs::write(&path, body).io_context("write", &path)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}
