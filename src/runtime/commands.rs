use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::Local;

use crate::cache::{CacheManager, FfmpegTranscoder};
use crate::config::{Layout, Settings, resolve_config_path};
use crate::editor::{Editor, RecordEdit};
use crate::error::{Error, Result};
use crate::probe;
use crate::reconcile::{Reconciler, ScanReport};
use crate::shim::{PlatformClock, format_duration};
use crate::site::{Generator, HtmlRenderer, listing_order};
use crate::store::{AudioRecord, MetadataStore};

pub fn scan(settings: &Settings, layout: &Layout) -> Result<ScanReport> {
    let inspector = probe::from_settings(&settings.tools);
    let report = Reconciler::new(layout, inspector.as_ref()).run(&PlatformClock)?;
    println!(
        "{} recordings: {} new, {} updated, {} unchanged, {} orphaned documents removed",
        report.sources, report.created, report.updated, report.unchanged, report.orphans_removed
    );
    if report.probe_failures > 0 {
        println!("{} recordings could not be inspected", report.probe_failures);
    }
    Ok(report)
}

pub fn generate(settings: &Settings, layout: &Layout) -> Result<()> {
    scan(settings, layout)?;

    let transcoder = FfmpegTranscoder::new(&settings.tools);
    let cache = CacheManager::new(layout, &transcoder, settings.site.sync_cache_times);
    let report = Generator::new(layout, cache, &HtmlRenderer).generate(Local::now().date_naive())?;
    println!(
        "published {} recordings to {} ({} dropped, {} failed)",
        report.published,
        layout.publish_dir.display(),
        report.dropped,
        report.failed
    );
    Ok(())
}

/// The folder-grouped overview, newest first within each folder.
pub fn format_listing(groups: &BTreeMap<String, Vec<AudioRecord>>) -> String {
    let mut out = String::new();
    for (folder, records) in groups {
        let mut records: Vec<&AudioRecord> = records.iter().collect();
        records.sort_by(|a, b| listing_order(a, b));

        let _ = writeln!(out, "{folder} ({})", records.len());
        for rec in records {
            let _ = write!(
                out,
                "  {}  {:>8}  {}",
                rec.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                format_duration(rec.duration_seconds),
                rec.title
            );
            if !rec.location.is_empty() {
                let _ = write!(out, "  @ {}", rec.location);
            }
            let _ = writeln!(out, "  [{}]", rec.file_name());
        }
    }
    out
}

pub fn list(layout: &Layout) -> Result<()> {
    let groups = MetadataStore::new(layout).grouped()?;
    if groups.is_empty() {
        println!("no records in {}", layout.metadata_dir.display());
    } else {
        print!("{}", format_listing(&groups));
    }
    Ok(())
}

pub fn edit(layout: &Layout, source: &str, edit: &RecordEdit) -> Result<()> {
    let record = Editor::new(layout).edit_record(source, edit)?;
    println!("saved {}", record.source_path);
    Ok(())
}

pub fn folder_location(layout: &Layout, folder: &str, location: &str) -> Result<()> {
    let updated = Editor::new(layout).set_folder_location(folder, location)?;
    if updated == 0 {
        return Err(Error::RecordNotFound(format!("folder {folder}")));
    }
    println!("updated {updated} records");
    Ok(())
}

pub fn about(layout: &Layout, content: Option<&str>, email: Option<&str>) -> Result<()> {
    let about = Editor::new(layout).save_about(content, email)?;
    println!("{}\n\ncontact: {}", about.content, about.email);
    Ok(())
}

pub fn domain(layout: &Layout, url: &str) -> Result<()> {
    let settings = Editor::new(layout).save_domain(url)?;
    println!("domain set to {}", settings.domain);
    Ok(())
}

pub fn print_config(settings: &Settings) -> Result<()> {
    let body = toml::to_string_pretty(settings).map_err(|e| Error::Config(e.to_string()))?;
    match resolve_config_path() {
        Some(path) => println!("# config file: {}", path.display()),
        None => println!("# no config file location"),
    }
    print!("{body}");
    Ok(())
}
