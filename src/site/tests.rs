use super::publish::{clear_except_assets, copy_static, stage};
use super::render::{SiteRenderer, escape_html, url_path};
use super::seo::{robots, sitemap};
use super::*;
use crate::cache::CacheManager;
use crate::error::{Error, Result};
use crate::store::{AboutContent, AudioRecord, SiteConfig};
use crate::testutil::{FakeTranscoder, Sandbox, touch_at};
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashSet;
use std::fs;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn record(source: &str, year: i32) -> AudioRecord {
    let at = Utc.with_ymd_and_hms(year, 5, 1, 8, 0, 0).unwrap();
    let mut rec = AudioRecord::new(source, at, 4096);
    rec.compressed_path = format!("assets/audio/{}", source.replace(".wav", ".m4a"));
    rec
}

fn add(sb: &Sandbox, source: &str, year: i32) {
    sb.store().save_record(&record(source, year)).unwrap();
}

fn read(sb: &Sandbox, rel: &str) -> String {
    fs::read_to_string(sb.layout.publish_dir.join(rel)).unwrap()
}

struct BrokenRenderer;

impl SiteRenderer for BrokenRenderer {
    fn index(&self, _records: &[AudioRecord]) -> Result<String> {
        Err(Error::Render("listing template missing".into()))
    }

    fn about(&self, _about: &AboutContent) -> Result<String> {
        Ok(String::new())
    }
}

#[test]
fn sitemap_has_root_and_about_entries() {
    let xml = sitemap("https://rec.example", today());
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<loc>https://rec.example/</loc>"));
    assert!(xml.contains("<loc>https://rec.example/about.html</loc>"));
    assert_eq!(xml.matches("<lastmod>2024-06-01</lastmod>").count(), 2);
    assert!(xml.contains("<changefreq>daily</changefreq>\n    <priority>1.0</priority>"));
    assert!(xml.contains("<changefreq>weekly</changefreq>\n    <priority>0.8</priority>"));
}

#[test]
fn robots_points_at_the_sitemap() {
    assert_eq!(
        robots("https://rec.example"),
        "User-agent: *\nAllow: /\nSitemap: https://rec.example/sitemap.xml"
    );
}

#[test]
fn html_escaping() {
    assert_eq!(
        escape_html(r#"<b>"Tom & Jerry's"</b>"#),
        "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
    );
    assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn index_page_lists_records_escaped() {
    let mut rec = record("field/owl.wav", 2024);
    rec.title = "Owl <night>".into();
    rec.location = "Woods & river".into();
    rec.duration_seconds = 3725.0;
    let html = HtmlRenderer.index(&[rec]).unwrap();

    assert!(html.contains("<h2>Owl &lt;night&gt;</h2>"));
    assert!(html.contains("Woods &amp; river"));
    assert!(html.contains("src=\"assets/audio/field/owl.m4a\""));
    assert!(html.contains("01:02:05"));
    assert!(html.contains("<p>1 recordings</p>"));
    assert!(html.contains("href=\"about.html\""));
}

#[test]
fn audio_links_are_percent_encoded() {
    assert_eq!(
        url_path("assets/audio/trip 1/take #2?.m4a"),
        "assets/audio/trip%201/take%20%232%3F.m4a"
    );

    let mut rec = record("trip/take #2.wav", 2024);
    rec.compressed_path = "assets/audio/trip/take #2.m4a".into();
    let html = HtmlRenderer.index(&[rec]).unwrap();
    assert!(html.contains("src=\"assets/audio/trip/take%20%232.m4a\""));
    assert!(html.contains("href=\"assets/audio/trip/take%20%232.m4a\" download>take #2.wav</a>"));
}

#[test]
fn about_page_has_content_and_contact() {
    let about = AboutContent {
        content: "Line one\nLine <two>".into(),
        email: "me@example.com".into(),
    };
    let html = HtmlRenderer.about(&about).unwrap();
    assert!(html.contains("Line one<br>\nLine &lt;two&gt;"));
    assert!(html.contains("mailto:me@example.com"));
}

#[test]
fn listing_order_is_newest_first_with_path_tiebreak() {
    let mut recs = vec![
        record("b.wav", 2022),
        record("z.wav", 2024),
        record("a.wav", 2022),
    ];
    recs.sort_by(listing_order);
    let order: Vec<&str> = recs.iter().map(|r| r.source_path.as_str()).collect();
    assert_eq!(order, vec!["z.wav", "a.wav", "b.wav"]);
}

#[test]
fn generate_builds_the_publish_tree() {
    let sb = Sandbox::new();
    sb.write_source("older.wav", b"riff");
    sb.write_source("trip/newer.wav", b"riff");
    sb.write_cache("archived.wav", b"cached-aac");
    add(&sb, "older.wav", 2020);
    add(&sb, "trip/newer.wav", 2024);
    add(&sb, "archived.wav", 2022);
    add(&sb, "lost.wav", 2023);
    sb.store()
        .save_settings(&SiteConfig {
            domain: "https://rec.example/".into(),
        })
        .unwrap();

    let dist = &sb.layout.publish_dir;
    fs::create_dir_all(dist.join("assets/audio/gone")).unwrap();
    fs::write(dist.join("assets/audio/gone/old.m4a"), b"x").unwrap();
    fs::write(dist.join("stale.html"), b"x").unwrap();
    fs::create_dir_all(sb.layout.static_dir.join("css")).unwrap();
    fs::write(sb.layout.static_dir.join("css/site.css"), b"body{}").unwrap();

    let transcoder = FakeTranscoder::default();
    let cache = CacheManager::new(&sb.layout, &transcoder, true);
    let report = Generator::new(&sb.layout, cache, &HtmlRenderer)
        .generate(today())
        .unwrap();

    assert_eq!(report.published, 3);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.pruned, 1);
    assert_eq!(transcoder.call_count(), 2);

    assert!(!sb.layout.document_path("lost.wav").exists());
    assert!(!dist.join("stale.html").exists());
    assert!(!dist.join("assets/audio/gone").exists());
    assert_eq!(read(&sb, "css/site.css"), "body{}");
    assert_eq!(read(&sb, "assets/audio/trip/newer.m4a"), "aac:newer.wav");
    assert_eq!(read(&sb, "assets/audio/archived.m4a"), "cached-aac");

    let index = read(&sb, "index.html");
    let newer = index.find("<h2>newer</h2>").unwrap();
    let archived = index.find("<h2>archived</h2>").unwrap();
    let older = index.find("<h2>older</h2>").unwrap();
    assert!(newer < archived && archived < older);
    assert!(!index.contains("<h2>lost</h2>"));

    assert!(read(&sb, "about.html").contains("your-email@example.com"));
    assert!(read(&sb, "sitemap.xml").contains("<loc>https://rec.example/about.html</loc>"));
    assert!(read(&sb, "robots.txt").ends_with("Sitemap: https://rec.example/sitemap.xml"));
}

#[test]
fn second_generation_reuses_cache_and_published_audio() {
    let sb = Sandbox::new();
    sb.write_source("a.wav", b"riff");
    add(&sb, "a.wav", 2024);
    let transcoder = FakeTranscoder::default();

    for _ in 0..2 {
        let cache = CacheManager::new(&sb.layout, &transcoder, true);
        let report = Generator::new(&sb.layout, cache, &HtmlRenderer)
            .generate(today())
            .unwrap();
        assert_eq!(report.published, 1);
    }
    assert_eq!(transcoder.call_count(), 1);
    assert_eq!(read(&sb, "assets/audio/a.m4a"), "aac:a.wav");
}

#[test]
fn encoding_failure_skips_only_that_record() {
    let sb = Sandbox::new();
    sb.write_source("good.wav", b"riff");
    sb.write_source("bad.wav", b"riff");
    add(&sb, "good.wav", 2024);
    add(&sb, "bad.wav", 2023);
    let transcoder = FakeTranscoder {
        fail_on: vec!["bad".into()],
        ..Default::default()
    };

    let cache = CacheManager::new(&sb.layout, &transcoder, false);
    let report = Generator::new(&sb.layout, cache, &HtmlRenderer)
        .generate(today())
        .unwrap();

    assert_eq!(report.published, 1);
    assert_eq!(report.failed, 1);
    assert!(sb.layout.document_path("bad.wav").exists());
    assert!(!read(&sb, "index.html").contains("<h2>bad</h2>"));
}

#[test]
fn listing_render_failure_is_fatal() {
    let sb = Sandbox::new();
    let transcoder = FakeTranscoder::default();
    let cache = CacheManager::new(&sb.layout, &transcoder, false);

    let err = Generator::new(&sb.layout, cache, &BrokenRenderer)
        .generate(today())
        .unwrap_err();
    assert!(matches!(err, Error::Render(_)));
}

#[test]
fn unreadable_settings_abort_before_touching_the_tree() {
    let sb = Sandbox::new();
    fs::create_dir_all(&sb.layout.metadata_dir).unwrap();
    fs::write(sb.layout.settings_document(), b"not json").unwrap();
    fs::create_dir_all(&sb.layout.publish_dir).unwrap();
    fs::write(sb.layout.publish_dir.join("keep.html"), b"x").unwrap();
    let transcoder = FakeTranscoder::default();
    let cache = CacheManager::new(&sb.layout, &transcoder, false);

    let err = Generator::new(&sb.layout, cache, &HtmlRenderer)
        .generate(today())
        .unwrap_err();
    assert!(matches!(err, Error::Json { .. }));
    assert!(sb.layout.publish_dir.join("keep.html").exists());
}

#[test]
fn stage_skips_an_identical_newer_copy() {
    let sb = Sandbox::new();
    let cache = sb.write_cache("a.wav", b"aac");
    let dest = sb.layout.publish_dir.join("assets/audio/a.m4a");

    assert_eq!(stage(&cache, &dest).unwrap(), 3);
    fs::write(&dest, b"old").unwrap();
    touch_at(&cache, 1_000);
    touch_at(&dest, 2_000);
    stage(&cache, &dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"old");

    touch_at(&cache, 3_000);
    stage(&cache, &dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"aac");
}

#[test]
fn clearing_keeps_only_assets() {
    let sb = Sandbox::new();
    let dist = &sb.layout.publish_dir;
    fs::create_dir_all(dist.join("assets/audio")).unwrap();
    fs::write(dist.join("assets/audio/a.m4a"), b"x").unwrap();
    fs::create_dir_all(dist.join("css")).unwrap();
    fs::write(dist.join("index.html"), b"x").unwrap();

    clear_except_assets(&sb.layout).unwrap();
    let names: HashSet<String> = fs::read_dir(dist)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, HashSet::from(["assets".to_string()]));
    assert!(dist.join("assets/audio/a.m4a").exists());
}

#[test]
fn copy_static_without_directory_is_a_no_op() {
    let sb = Sandbox::new();
    assert_eq!(copy_static(&sb.layout.static_dir, &sb.layout.publish_dir), 0);
}
